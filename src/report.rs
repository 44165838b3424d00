use log::debug;
use serde::{Deserialize, Serialize};

use crate::categories::{CategoryMatches, extract_categories};
use crate::frequency::{Segment, WordFrequencyEntry, segment_frequencies};
use crate::metrics::{TextMetrics, compute_metrics};
use crate::phrases::{PhraseOccurrence, find_repeated_phrases};

/// Knobs for a single analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Shortest phrase length, in words.
    pub min_phrase_words: usize,
    /// Longest phrase length, in words.
    pub max_phrase_words: usize,
    /// Minimum number of occurrences for a phrase to be reported.
    pub min_phrase_count: u32,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            min_phrase_words: 3,
            max_phrase_words: 6,
            min_phrase_count: 2,
        }
    }
}

/// Headline sizes of each narrative ingredient, as plotted by the charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    pub dialogue_chars: usize,
    pub summary_chars: usize,
    pub action_count: usize,
    pub setting_count: usize,
    pub character_count: usize,
}

/// Word frequencies of one segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCloud {
    pub segment: Segment,
    pub words: Vec<WordFrequencyEntry>,
}

/// Everything computed for one excerpt. Built once per run and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metrics: TextMetrics,
    pub composition: Composition,
    pub categories: CategoryMatches,
    pub repeated_phrases: Vec<PhraseOccurrence>,
    pub word_clouds: Vec<WordCloud>,
}

impl AnalysisReport {
    pub fn cloud(&self, segment: Segment) -> &[WordFrequencyEntry] {
        self.word_clouds
            .iter()
            .find(|c| c.segment == segment)
            .map(|c| c.words.as_slice())
            .unwrap_or(&[])
    }
}

/// Packages the stage outputs into a report.
pub fn assemble(
    metrics: TextMetrics,
    categories: CategoryMatches,
    phrases: Vec<PhraseOccurrence>,
    frequencies: Vec<(Segment, Vec<WordFrequencyEntry>)>,
) -> AnalysisReport {
    let composition = Composition {
        dialogue_chars: categories.dialogue_chars(),
        summary_chars: categories.summary_chars(),
        action_count: categories.action_matches.len(),
        setting_count: categories.setting_matches.len(),
        character_count: categories.character_matches.len(),
    };
    AnalysisReport {
        metrics,
        composition,
        categories,
        repeated_phrases: phrases,
        word_clouds: frequencies
            .into_iter()
            .map(|(segment, words)| WordCloud { segment, words })
            .collect(),
    }
}

///Runs the whole pipeline over `text`.
/// # Example
/// ```
/// use manuscript_analysis::{AnalysisOptions, analyze_text};
/// let report = analyze_text("He ran. She ran. They ran into the forest at night.", &AnalysisOptions::default());
/// assert_eq!(report.metrics.sentence_count, 3);
/// assert_eq!(report.composition.action_count, 0);
/// assert_eq!(report.composition.setting_count, 2);
/// assert_eq!(report.composition.character_count, 3);
/// ```
pub fn analyze_text(text: &str, options: &AnalysisOptions) -> AnalysisReport {
    let metrics = compute_metrics(text);
    debug!(
        "metrics: {} words, {} unique, {} sentences",
        metrics.word_count, metrics.unique_word_count, metrics.sentence_count
    );
    let categories = extract_categories(text);
    debug!(
        "categories: {} dialogue spans, {} action, {} setting, {} character",
        categories.dialogue_spans.len(),
        categories.action_matches.len(),
        categories.setting_matches.len(),
        categories.character_matches.len()
    );
    let phrases = find_repeated_phrases(
        text,
        options.min_phrase_words,
        options.max_phrase_words,
        options.min_phrase_count,
    );
    debug!("repeated phrases: {}", phrases.len());
    let frequencies = segment_frequencies(text, &categories);
    assemble(metrics, categories, phrases, frequencies)
}

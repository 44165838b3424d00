use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

static SENTENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^.!?]+[.!?]+").unwrap());

/// Fixed syllables-per-word estimate fed into the grade formula.
pub const SYLLABLES_PER_WORD: f64 = 1.4;

/// Basic counts and the Flesch-Kincaid grade of one excerpt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub word_count: usize,
    pub unique_word_count: usize,
    pub sentence_count: usize,
    pub readability_grade: f64,
}

///Splits text into word tokens (maximal runs of letters, digits and `_`), keeping the original case.
/// # Example
/// ```
/// use manuscript_analysis::tokenize;
/// assert_eq!(tokenize("Don't stop, Anna!"), vec!["Don", "t", "stop", "Anna"]);
/// ```
pub fn tokenize(text: &str) -> Vec<&str> {
    WORD_RE.find_iter(text).map(|m| m.as_str()).collect()
}

///Counts runs of text terminated by one or more of `.`, `!` or `?`.
/// # Example
/// ```
/// use manuscript_analysis::count_sentences;
/// assert_eq!(count_sentences("Stop! Who goes there?! Nobody."), 3);
/// assert_eq!(count_sentences("no terminator"), 0);
/// ```
pub fn count_sentences(text: &str) -> usize {
    SENTENCE_RE.find_iter(text).count()
}

/// Flesch-Kincaid grade with the fixed syllable estimate.
///
/// Returns `0.0` when either count is zero, so the result is always finite.
pub fn readability_grade(word_count: usize, sentence_count: usize) -> f64 {
    if word_count == 0 || sentence_count == 0 {
        return 0.0;
    }
    let words = word_count as f64;
    let sentences = sentence_count as f64;
    let syllables = words * SYLLABLES_PER_WORD;
    0.39 * (words / sentences) + 11.8 * (syllables / words) - 15.59
}

/// Computes word, unique word and sentence counts plus the readability grade.
pub fn compute_metrics(text: &str) -> TextMetrics {
    let tokens = tokenize(text);
    let unique: HashSet<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
    let sentence_count = count_sentences(text);

    TextMetrics {
        word_count: tokens.len(),
        unique_word_count: unique.len(),
        sentence_count,
        readability_grade: readability_grade(tokens.len(), sentence_count),
    }
}

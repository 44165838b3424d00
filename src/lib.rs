//! # manuscript_analysis
//!
//! Narrative statistics for a manuscript excerpt: word and sentence counts,
//! a Flesch-Kincaid grade, dialogue/action/setting/character matches,
//! repeated phrases and per-segment word clouds, plus an optional genre
//! advisor backed by a chat-completion model.
//!
//! ## Example
//! ```
//! use manuscript_analysis::{AnalysisOptions, Segment, analyze_text};
//!
//! let report = analyze_text(
//!     "\"Hello there,\" she said. \"Hello there,\" she said again.",
//!     &AnalysisOptions::default(),
//! );
//! assert_eq!(report.metrics.word_count, 9);
//! assert_eq!(report.categories.dialogue_text, "\"Hello there,\" \"Hello there,\"");
//! assert_eq!(report.cloud(Segment::Dialogue)[0].word, "hello");
//! ```

pub mod advisor;
pub mod categories;
pub mod charts;
pub mod export;
pub mod frequency;
pub mod metrics;
pub mod office;
pub mod phrases;
pub mod report;

pub use advisor::{
    AdvisorConfig, AdvisorError, CompletionClient, GenreAdvisor, HttpCompletionClient,
    MAX_EXCERPT_CHARS, MIN_EXCERPT_CHARS,
};
pub use categories::{
    CategoryMatches, KeywordCategory, dialogue_spans, extract_categories, keyword_matches,
};
pub use charts::{ChartSet, DEFAULT_BAR_WIDTH, MAX_CHART_WIDTH, RenderedCharts, render_charts};
pub use export::{ExportError, ExportExtras, ExportFormat, csv_safe_cell, render};
pub use frequency::{
    Segment, WordFrequencyEntry, count_words, segment_frequencies, sort_map_to_vec,
    word_frequency,
};
pub use metrics::{TextMetrics, compute_metrics, count_sentences, readability_grade, tokenize};
pub use office::{ExtractionError, extract_text, extract_text_from_docx, extract_text_from_txt};
pub use phrases::{PhraseOccurrence, find_repeated_phrases};
pub use report::{AnalysisOptions, AnalysisReport, Composition, WordCloud, analyze_text, assemble};

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::categories::CategoryMatches;
use crate::metrics::tokenize;

/// Number of entries kept per word cloud.
pub const MAX_CLOUD_WORDS: usize = 50;

/// A word and how often it occurs in one segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordFrequencyEntry {
    pub word: String,
    pub count: u32,
}

/// The slices of an excerpt that get their own word cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Full,
    Dialogue,
    Action,
    Setting,
    Summary,
}

impl Segment {
    pub const ALL: [Segment; 5] = [
        Self::Full,
        Self::Dialogue,
        Self::Action,
        Self::Setting,
        Self::Summary,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Dialogue => "dialogue",
            Self::Action => "action",
            Self::Setting => "setting",
            Self::Summary => "summary",
        }
    }

    /// Text of this segment. Keyword segments are their matches joined by spaces.
    pub fn text<'a>(self, full: &'a str, categories: &'a CategoryMatches) -> Cow<'a, str> {
        match self {
            Self::Full => Cow::Borrowed(full),
            Self::Dialogue => Cow::Borrowed(&categories.dialogue_text),
            Self::Action => Cow::Owned(categories.action_matches.join(" ")),
            Self::Setting => Cow::Owned(categories.setting_matches.join(" ")),
            Self::Summary => Cow::Borrowed(&categories.summary_text),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

///Takes &[String] and counts the quantity of each word. Returns HashMap<String, u32>, with String being the word and u32 the quantity
/// # Example
/// ```
/// use manuscript_analysis::count_words;
/// let words = vec!["one".to_string(), "two".to_string(), "two".to_string()];
/// let counted = count_words(&words);
/// assert_eq!(counted["two"], 2);
/// assert_eq!(counted["one"], 1);
/// ```
pub fn count_words(words: &[String]) -> HashMap<String, u32> {
    let mut frequency: HashMap<String, u32> = HashMap::new();
    for word in words {
        *frequency.entry(word.to_owned()).or_insert(0) += 1;
    }
    frequency
}

///Sort words in HashMap<Word, Frequency> according to frequency into Vec<WordFrequencyEntry>. Equal counts are ordered alphabetically.
/// # Example
/// ```
/// use manuscript_analysis::sort_map_to_vec;
/// use std::collections::HashMap;
/// let mut words_map = HashMap::new();
/// words_map.insert("one".to_string(), 1_u32);
/// words_map.insert("three".to_string(), 3_u32);
/// words_map.insert("two".to_string(), 3_u32);
/// let sorted: Vec<(String, u32)> = sort_map_to_vec(words_map)
///     .into_iter()
///     .map(|e| (e.word, e.count))
///     .collect();
/// let expected = vec![("three".to_string(), 3), ("two".to_string(), 3), ("one".to_string(), 1)];
/// assert_eq!(sorted, expected);
/// ```
pub fn sort_map_to_vec(frequency: HashMap<String, u32>) -> Vec<WordFrequencyEntry> {
    let mut vec_sorted: Vec<(String, u32)> = frequency.into_iter().collect();
    vec_sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    vec_sorted
        .into_iter()
        .map(|(word, count)| WordFrequencyEntry { word, count })
        .collect()
}

/// Ranks the lowercase words longer than three characters, keeping the top [`MAX_CLOUD_WORDS`].
pub fn word_frequency(text: &str) -> Vec<WordFrequencyEntry> {
    let lower = text.to_lowercase();
    let words: Vec<String> = tokenize(&lower)
        .into_iter()
        .filter(|w| w.chars().count() > 3)
        .map(String::from)
        .collect();
    let mut ranked = sort_map_to_vec(count_words(&words));
    ranked.truncate(MAX_CLOUD_WORDS);
    ranked
}

/// One independent [`word_frequency`] run per [`Segment`], in [`Segment::ALL`] order.
pub fn segment_frequencies(
    text: &str,
    categories: &CategoryMatches,
) -> Vec<(Segment, Vec<WordFrequencyEntry>)> {
    Segment::ALL
        .into_iter()
        .map(|segment| (segment, word_frequency(&segment.text(text, categories))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::extract_categories;

    #[test]
    fn test_count() {
        let words = vec![
            "one".to_string(),
            "two".to_string(),
            "two".to_string(),
            "three".to_string(),
            "three".to_string(),
            "three".to_string(),
        ];
        let counted = count_words(&words);
        let mut words_map = HashMap::new();
        words_map.insert("one".to_string(), 1_u32);
        words_map.insert("two".to_string(), 2_u32);
        words_map.insert("three".to_string(), 3_u32);
        assert_eq!(counted, words_map);
    }

    #[test]
    fn test_short_words_dropped() {
        let ranked = word_frequency("The tall tree, the TALL tree and the sky.");
        let words: Vec<&str> = ranked.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, vec!["tall", "tree"]);
        assert!(ranked.iter().all(|e| e.count == 2));
    }

    #[test]
    fn test_top_fifty() {
        let text: String = (0..80).map(|i| format!("token{i:02} ")).collect();
        let ranked = word_frequency(&text);
        assert_eq!(ranked.len(), MAX_CLOUD_WORDS);
        assert!(ranked.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn test_segments() {
        let text = "\"Shout louder,\" said the father. He would walk through the forest at night.";
        let categories = extract_categories(text);
        let clouds = segment_frequencies(text, &categories);
        let names: Vec<&str> = clouds.iter().map(|(s, _)| s.name()).collect();
        assert_eq!(names, vec!["full", "dialogue", "action", "setting", "summary"]);

        let dialogue = &clouds[1].1;
        assert!(dialogue.iter().any(|e| e.word == "shout"));
        assert!(dialogue.iter().all(|e| e.word != "father"));

        let action: Vec<&str> = clouds[2].1.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(action, vec!["shout", "walk"]);

        let setting: Vec<&str> = clouds[3].1.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(setting, vec!["forest", "night"]);

        let summary = &clouds[4].1;
        assert!(summary.iter().all(|e| e.word != "louder"));
    }

    #[test]
    fn test_empty() {
        assert!(word_frequency("").is_empty());
        let categories = extract_categories("");
        assert!(segment_frequencies("", &categories).iter().all(|(_, v)| v.is_empty()));
    }
}

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Straight `"…"` or typographic `“…”` pairs, never crossing a line break.
static DIALOGUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""[^"\n]*"|“[^”\n]*”"#).unwrap());

/// Keyword-driven categories. Dialogue is quote-driven and handled separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordCategory {
    Action,
    Setting,
    Character,
}

impl KeywordCategory {
    pub const ALL: [KeywordCategory; 3] = [Self::Action, Self::Setting, Self::Character];

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Action => &["run", "walk", "grab", "hit", "throw", "jump", "shout"],
            Self::Setting => &["room", "forest", "city", "night", "day", "sun", "sky"],
            Self::Character => &[
                "he", "she", "they", "man", "woman", "boy", "girl", "child", "father", "mother",
                "friend",
            ],
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            Self::Action => &ACTION_RE,
            Self::Setting => &SETTING_RE,
            Self::Character => &CHARACTER_RE,
        }
    }
}

impl fmt::Display for KeywordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Action => "action",
            Self::Setting => "setting",
            Self::Character => "character",
        };
        f.write_str(name)
    }
}

fn keyword_regex(category: KeywordCategory) -> Regex {
    let alternation = category.keywords().join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).unwrap()
}

static ACTION_RE: Lazy<Regex> = Lazy::new(|| keyword_regex(KeywordCategory::Action));
static SETTING_RE: Lazy<Regex> = Lazy::new(|| keyword_regex(KeywordCategory::Setting));
static CHARACTER_RE: Lazy<Regex> = Lazy::new(|| keyword_regex(KeywordCategory::Character));

/// Everything the pattern extractors found in one excerpt.
///
/// Categories overlap freely: each list comes from its own scan of the full text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryMatches {
    /// Quoted spans including their quote marks, in text order.
    pub dialogue_spans: Vec<String>,
    /// `dialogue_spans` joined by a single space.
    pub dialogue_text: String,
    pub action_matches: Vec<String>,
    pub setting_matches: Vec<String>,
    pub character_matches: Vec<String>,
    /// The excerpt with every dialogue span cut out.
    pub summary_text: String,
}

impl CategoryMatches {
    pub fn matches(&self, category: KeywordCategory) -> &[String] {
        match category {
            KeywordCategory::Action => &self.action_matches,
            KeywordCategory::Setting => &self.setting_matches,
            KeywordCategory::Character => &self.character_matches,
        }
    }

    /// Length of the dialogue text in characters.
    pub fn dialogue_chars(&self) -> usize {
        self.dialogue_text.chars().count()
    }

    /// Length of the non-dialogue text in characters.
    pub fn summary_chars(&self) -> usize {
        self.summary_text.chars().count()
    }
}

///Collects every whole-word, case-insensitive keyword match of `category`, keeping the original case.
/// # Example
/// ```
/// use manuscript_analysis::{KeywordCategory, keyword_matches};
/// let found = keyword_matches("Night fell over the city. Runner, run!", KeywordCategory::Setting);
/// assert_eq!(found, vec!["Night", "city"]);
/// ```
pub fn keyword_matches(text: &str, category: KeywordCategory) -> Vec<String> {
    category
        .pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Returns every quoted span of `text` in order.
pub fn dialogue_spans(text: &str) -> Vec<String> {
    DIALOGUE_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Runs the dialogue scan and one keyword scan per category over `text`.
pub fn extract_categories(text: &str) -> CategoryMatches {
    let dialogue_spans = dialogue_spans(text);
    let dialogue_text = dialogue_spans.join(" ");
    let summary_text = DIALOGUE_RE.replace_all(text, "").into_owned();

    let mut matches = CategoryMatches {
        dialogue_spans,
        dialogue_text,
        summary_text,
        ..Default::default()
    };
    for category in KeywordCategory::ALL {
        let found = keyword_matches(text, category);
        match category {
            KeywordCategory::Action => matches.action_matches = found,
            KeywordCategory::Setting => matches.setting_matches = found,
            KeywordCategory::Character => matches.character_matches = found,
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inflected_forms_do_not_match() {
        let m = extract_categories("He ran. She ran. They ran into the forest at night.");
        assert!(m.action_matches.is_empty());
        assert_eq!(m.setting_matches, vec!["forest", "night"]);
        assert_eq!(m.character_matches, vec!["He", "She", "They"]);
    }

    #[test]
    fn test_dialogue_pairs() {
        let text = r#""Hello there," she said. "Hello there," she said again."#;
        let m = extract_categories(text);
        assert_eq!(m.dialogue_spans.len(), 2);
        assert_eq!(m.dialogue_text, r#""Hello there," "Hello there,""#);
        assert_eq!(m.dialogue_chars(), 29);
        assert_eq!(m.summary_text, " she said.  she said again.");
    }

    #[test]
    fn test_dialogue_does_not_span_lines() {
        let m = extract_categories("\"unfinished\nline\" and \"closed\"");
        // the first quote never closes on its line, so the next quote opens the pair
        assert_eq!(m.dialogue_spans, vec!["\" and \"".to_string()]);
    }

    #[test]
    fn test_typographic_quotes() {
        let m = extract_categories("“Run,” the boy whispered.");
        assert_eq!(m.dialogue_spans, vec!["“Run,”"]);
        assert_eq!(m.action_matches, vec!["Run"]);
        assert_eq!(m.character_matches, vec!["boy"]);
    }

    #[test]
    fn test_summary_length_round_trip() {
        let text = "He said \"go\" and she said \"stay\".\n\"Fine,\" they said.";
        let m = extract_categories(text);
        let removed: usize = m.dialogue_spans.iter().map(|s| s.chars().count()).sum();
        assert_eq!(m.summary_chars(), text.chars().count() - removed);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(extract_categories(""), CategoryMatches::default());
    }

    #[test]
    fn test_keyword_sets_are_disjoint() {
        for a in KeywordCategory::ALL {
            for b in KeywordCategory::ALL {
                if a != b {
                    assert!(a.keywords().iter().all(|k| !b.keywords().contains(k)));
                }
            }
        }
    }
}

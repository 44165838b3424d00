use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Upper bound on the number of phrases reported.
pub const MAX_PHRASES: usize = 20;

static EDGE_PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\W+|\W+$").unwrap());

/// A repeated n-gram and how often it occurs in the excerpt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseOccurrence {
    pub phrase: String,
    pub count: u32,
}

/// Lowercases, splits on whitespace, trims surrounding punctuation and drops tokens of two characters or fewer.
pub fn phrase_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|raw| EDGE_PUNCT_RE.replace_all(raw, "").into_owned())
        .filter(|token| token.chars().count() > 2)
        .collect()
}

///Finds word n-grams of `min_words..=max_words` tokens that occur at least `min_count` times.
///
///Every window size is counted into the same table; a phrase and the longer phrases containing it are reported independently.
///Results are sorted by count (descending); equal counts keep the order in which the phrases were first built
///(shorter windows first, then earlier positions). At most [`MAX_PHRASES`] entries are returned.
/// # Example
/// ```
/// use manuscript_analysis::find_repeated_phrases;
/// let text = "\"Hello there,\" she said. \"Hello there,\" she said again.";
/// let phrases = find_repeated_phrases(text, 3, 6, 2);
/// assert!(phrases.iter().any(|p| p.phrase == "hello there she said" && p.count >= 2));
/// ```
pub fn find_repeated_phrases(
    text: &str,
    min_words: usize,
    max_words: usize,
    min_count: u32,
) -> Vec<PhraseOccurrence> {
    let tokens = phrase_tokens(text);
    let min_words = min_words.max(1);
    // no window can be longer than the token stream
    let max_words = max_words.min(tokens.len());

    // phrase -> (count, first time built)
    let mut frequency: HashMap<String, (u32, usize)> = HashMap::new();
    let mut built = 0usize;
    for size in min_words..=max_words {
        for window in tokens.windows(size) {
            let entry = frequency.entry(window.join(" ")).or_insert((0, built));
            entry.0 += 1;
            built += 1;
        }
    }

    let mut repeated: Vec<(String, u32, usize)> = frequency
        .into_iter()
        .filter(|(_, (count, _))| *count >= min_count)
        .map(|(phrase, (count, first))| (phrase, count, first))
        .collect();
    repeated.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.2.cmp(&b.2)));
    repeated.truncate(MAX_PHRASES);

    repeated
        .into_iter()
        .map(|(phrase, count, _)| PhraseOccurrence { phrase, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_tokens_and_punctuation_dropped() {
        let tokens = phrase_tokens("\"Hello there,\" she said. It is so.");
        assert_eq!(tokens, vec!["hello", "there", "she", "said"]);
    }

    #[test]
    fn test_sub_and_super_phrases_both_counted() {
        let text = "the old mill wheel turned. the old mill wheel stopped.";
        let phrases = find_repeated_phrases(text, 3, 6, 2);
        let names: Vec<&str> = phrases.iter().map(|p| p.phrase.as_str()).collect();
        assert!(names.contains(&"the old mill"));
        assert!(names.contains(&"old mill wheel"));
        assert!(names.contains(&"the old mill wheel"));
        assert!(phrases.iter().all(|p| p.count == 2));
    }

    #[test]
    fn test_ties_follow_build_order() {
        let text = "red fox den. red fox den. blue owl nest blue owl nest blue owl nest";
        let phrases = find_repeated_phrases(text, 3, 3, 2);
        assert_eq!(phrases[0].phrase, "blue owl nest");
        assert_eq!(phrases[0].count, 3);
        assert_eq!(phrases[1].phrase, "red fox den");
        assert_eq!(phrases[1].count, 2);
    }

    #[test]
    fn test_min_count_and_cap() {
        let text = (0..60)
            .map(|i| format!("word{i} word{i} word{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        let doubled = format!("{text} {text}");
        let phrases = find_repeated_phrases(&doubled, 3, 6, 2);
        assert_eq!(phrases.len(), MAX_PHRASES);
        assert!(phrases.iter().all(|p| p.count >= 2));
        assert!(phrases.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(find_repeated_phrases("", 3, 6, 2).is_empty());
        assert!(find_repeated_phrases("one two", 3, 6, 2).is_empty());
        assert!(find_repeated_phrases("same same same same", 4, 3, 1).is_empty());
        // zero-length windows are treated as single words
        let singles = find_repeated_phrases("echo echo echo", 0, 1, 2);
        assert_eq!(
            singles,
            vec![PhraseOccurrence {
                phrase: "echo".to_string(),
                count: 3
            }]
        );
    }

    #[test]
    fn test_huge_max_words_matches_token_count() {
        let text = "the lighthouse keeper waited. the lighthouse keeper slept.";
        let token_count = phrase_tokens(text).len();
        assert_eq!(
            find_repeated_phrases(text, 3, usize::MAX, 2),
            find_repeated_phrases(text, 3, token_count, 2)
        );
        assert!(find_repeated_phrases("", 1, usize::MAX, 1).is_empty());
    }
}

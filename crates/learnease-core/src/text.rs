//! Word, sentence and paragraph statistics for a piece of text.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Average silent reading speed used for reading-time estimates.
pub const WORDS_PER_MINUTE: f64 = 200.0;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[\w'-]+\b").expect("word pattern is valid"));
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+(?:\s|$)").expect("sentence pattern is valid"));
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("paragraph pattern is valid"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStats {
    pub words: usize,
    pub unique_words: usize,
    pub sentences: usize,
    pub paragraphs: usize,
    pub chars: usize,
    pub chars_no_spaces: usize,
    pub avg_word_length: f64,
    pub avg_words_per_sentence: f64,
    pub reading_time_min: f64,
}

impl TextStats {
    pub fn compute(text: &str) -> Self {
        let words: Vec<&str> = WORD.find_iter(text).map(|m| m.as_str()).collect();
        let unique_words = words
            .iter()
            .map(|w| w.to_lowercase())
            .collect::<HashSet<_>>()
            .len();
        let sentences = count_nonblank(SENTENCE_END.split(text));
        let paragraphs = count_nonblank(PARAGRAPH_BREAK.split(text));
        let chars = text.chars().count();
        let chars_no_spaces = text.chars().filter(|c| !c.is_whitespace()).count();
        let word_chars: usize = words.iter().map(|w| w.chars().count()).sum();

        let avg_word_length = ratio(word_chars, words.len());
        let avg_words_per_sentence = ratio(words.len(), sentences);

        Self {
            words: words.len(),
            unique_words,
            sentences,
            paragraphs,
            chars,
            chars_no_spaces,
            avg_word_length,
            avg_words_per_sentence,
            reading_time_min: reading_time_min(words.len()),
        }
    }
}

/// Percentage of `goal` reached, capped at 100. A zero goal counts as met.
pub fn goal_progress(words: usize, goal: u32) -> f64 {
    if goal == 0 {
        return 100.0;
    }
    (words as f64 / f64::from(goal) * 100.0).min(100.0)
}

/// Minutes to read `words` at [`WORDS_PER_MINUTE`], rounded to 2 decimals.
pub fn reading_time_min(words: usize) -> f64 {
    (words as f64 * 100.0 / WORDS_PER_MINUTE).round() / 100.0
}

fn count_nonblank<'a>(pieces: impl Iterator<Item = &'a str>) -> usize {
    pieces.filter(|p| !p.trim().is_empty()).count()
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_text_is_all_zero() {
        let stats = TextStats::compute("   \n ");
        assert_eq!(stats.words, 0);
        assert_eq!(stats.sentences, 0);
        assert_eq!(stats.paragraphs, 0);
        assert_eq!(stats.avg_word_length, 0.0);
        assert_eq!(stats.avg_words_per_sentence, 0.0);
        assert_eq!(stats.reading_time_min, 0.0);
    }

    #[test]
    fn counts_words_sentences_and_paragraphs() {
        let text = "The cat sat. The dog didn't!\n\nWell-known facts? Yes.";
        let stats = TextStats::compute(text);
        assert_eq!(stats.words, 9);
        assert_eq!(stats.unique_words, 8);
        assert_eq!(stats.sentences, 4);
        assert_eq!(stats.paragraphs, 2);
        assert_eq!(stats.chars, text.chars().count());
        assert_eq!(stats.reading_time_min, 0.05);
    }

    #[test]
    fn decimal_points_do_not_split_sentences() {
        let stats = TextStats::compute("Version 1.5 shipped today");
        assert_eq!(stats.sentences, 1);
    }

    #[test]
    fn goal_progress_caps_at_100() {
        assert_eq!(goal_progress(250, 500), 50.0);
        assert_eq!(goal_progress(900, 500), 100.0);
        assert_eq!(goal_progress(3, 0), 100.0);
    }

    proptest! {
        #[test]
        fn char_counts_are_consistent(text in "\\PC{0,200}") {
            let stats = TextStats::compute(&text);
            prop_assert!(stats.chars_no_spaces <= stats.chars);
            prop_assert!(stats.unique_words <= stats.words);
            prop_assert!(stats.reading_time_min >= 0.0);
        }
    }
}

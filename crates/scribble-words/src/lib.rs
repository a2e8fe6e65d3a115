//! Vocabulary for Scribble rounds.
//!
//! A [`WordList`] is loaded once at startup (from a JSON array of strings,
//! or the compiled-in default) and shared read-only between rooms as an
//! `Arc<WordList>`. Words are stored lowercased so guess comparison only
//! has to normalize the guess.

mod builtin;
mod error;

pub use error::WordError;

use std::path::Path;

use rand::Rng;
use rand::seq::IndexedRandom;

/// An immutable, deduplicated list of lowercase words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    /// Builds a list from raw entries.
    ///
    /// Entries are trimmed and lowercased; blanks and repeats are dropped
    /// and first-seen order is kept.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list: Vec<String> = Vec::new();
        for raw in words {
            let word = raw.as_ref().trim().to_lowercase();
            if word.is_empty() || list.contains(&word) {
                continue;
            }
            list.push(word);
        }
        Self { words: list }
    }

    /// Parses a JSON array of strings, e.g. `["cat", "house"]`.
    ///
    /// # Errors
    /// [`WordError::Parse`] if `json` is not an array of strings.
    pub fn from_json(json: &str) -> Result<Self, WordError> {
        let raw: Vec<String> = serde_json::from_str(json)?;
        Ok(Self::from_words(raw))
    }

    /// Reads and parses a word-list file.
    ///
    /// An empty list is not an error here; it surfaces as
    /// [`WordError::EmptyWordList`] when a round tries to pick a word.
    ///
    /// # Errors
    /// [`WordError::Io`] if the file cannot be read, [`WordError::Parse`]
    /// if it is not a JSON array of strings.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WordError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let list = Self::from_json(&contents)?;
        tracing::info!(path = %path.display(), words = list.len(), "loaded word list");
        if list.is_empty() {
            tracing::warn!(path = %path.display(), "word list is empty; games cannot start");
        }
        Ok(list)
    }

    /// The compiled-in default vocabulary.
    pub fn builtin() -> Self {
        Self::from_words(builtin::WORDS)
    }

    /// Picks one word uniformly at random.
    ///
    /// # Errors
    /// [`WordError::EmptyWordList`] if there is nothing to pick.
    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&str, WordError> {
        self.words
            .choose(rng)
            .map(String::as_str)
            .ok_or(WordError::EmptyWordList)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        let word = word.trim().to_lowercase();
        self.words.iter().any(|w| *w == word)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_from_words_normalizes_and_dedups() {
        let list = WordList::from_words([" Cat", "dog", "", "CAT ", "  ", "house"]);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["cat", "dog", "house"]);
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        assert!(matches!(
            WordList::from_json(r#"{"words": ["cat"]}"#),
            Err(WordError::Parse(_))
        ));
    }

    #[test]
    fn test_pick_random_empty_list_errors() {
        let mut rng = StdRng::seed_from_u64(1);
        let list = WordList::from_words(Vec::<String>::new());
        assert!(matches!(
            list.pick_random(&mut rng),
            Err(WordError::EmptyWordList)
        ));
    }

    #[test]
    fn test_pick_random_single_word() {
        let mut rng = StdRng::seed_from_u64(1);
        let list = WordList::from_words(["cat"]);
        for _ in 0..10 {
            assert_eq!(list.pick_random(&mut rng).unwrap(), "cat");
        }
    }

    #[test]
    fn test_builtin_is_nonempty_and_normalized() {
        let list = WordList::builtin();
        assert!(list.len() >= 50);
        assert!(list.iter().all(|w| w == w.trim() && w == w.to_lowercase()));
    }

    #[test]
    fn test_contains_ignores_case() {
        let list = WordList::from_words(["pizza"]);
        assert!(list.contains(" PIZZA "));
        assert!(!list.contains("pizzas"));
    }
}

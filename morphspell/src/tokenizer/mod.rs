//! Splitting running text into checkable words.

use unic_segment::{WordBoundIndices, Words};

pub mod case_handling;

fn is_word(s: &str) -> bool {
    s.chars().any(|ch| ch.is_alphanumeric())
}

pub trait Tokenize {
    fn word_bound_indices(&self) -> WordBoundIndices;
    fn words(&self) -> Words;
    /// Byte offsets and text of the segments containing a letter or digit.
    fn word_indices(&self) -> WordIndices;
}

impl Tokenize for str {
    fn word_bound_indices(&self) -> WordBoundIndices {
        WordBoundIndices::new(self)
    }

    fn words(&self) -> Words {
        Words::new(self, |s| is_word(s))
    }

    fn word_indices(&self) -> WordIndices {
        WordIndices {
            inner: WordBoundIndices::new(self),
        }
    }
}

pub struct WordIndices<'a> {
    inner: WordBoundIndices<'a>,
}

impl<'a> Iterator for WordIndices<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find(|(_, s)| is_word(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_only() {
        let msg = "this is an ordinary sentence! \"This was quoted,\" and\t a tab.";
        let words: Vec<(usize, &str)> = msg.word_indices().collect();
        assert_eq!(
            words,
            vec![
                (0, "this"),
                (5, "is"),
                (8, "an"),
                (11, "ordinary"),
                (20, "sentence"),
                (31, "This"),
                (36, "was"),
                (40, "quoted"),
                (49, "and"),
                (54, "a"),
                (56, "tab")
            ]
        );
        assert_eq!(msg.words().count(), 11);
    }
}

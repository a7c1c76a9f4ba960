//! Suggestion for a spelling correction.
use crate::types::Weight;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::cmp::Ordering;
use std::cmp::Ordering::Equal;

#[derive(Clone, Debug, Serialize, Deserialize)]
/// Suggestion for a spelling correction
pub struct Suggestion {
    /// the suggested word-form
    pub value: SmolStr,
    /// total penalty weight of the word-form
    pub weight: Weight,
    /// insertion order of the dictionary entry the word-form was derived from
    #[serde(skip)]
    pub rank: usize,
}

impl Suggestion {
    /// creates a spelling correction suggestion
    pub fn new(value: SmolStr, weight: Weight, rank: usize) -> Suggestion {
        Suggestion {
            value,
            weight,
            rank,
        }
    }

    /// gets the suggested word-form
    pub fn value(&self) -> &str {
        &self.value
    }

    /// gets the penalty weight of the suggestion
    pub fn weight(&self) -> Weight {
        self.weight
    }
}

impl PartialOrd for Suggestion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Suggestion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .partial_cmp(&other.weight)
            .unwrap_or(Equal)
            .then(self.rank.cmp(&other.rank))
            .then_with(|| self.value.cmp(&other.value))
    }
}

impl PartialEq for Suggestion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Equal
    }
}

impl Eq for Suggestion {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        let mut s = vec![
            Suggestion::new("c".into(), 1.0, 0),
            Suggestion::new("b".into(), 0.5, 3),
            Suggestion::new("a".into(), 1.0, 0),
            Suggestion::new("d".into(), 0.5, 1),
        ];
        s.sort();
        let values: Vec<&str> = s.iter().map(|s| s.value()).collect();
        assert_eq!(values, vec!["d", "b", "a", "c"]);
    }
}

//! The compiled word list.

use hashbrown::HashMap;
use smol_str::SmolStr;

use crate::affix::AffixData;
use crate::archive::error::LoadError;
use crate::types::{Flag, FlagSet};

mod parse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub word: SmolStr,
    pub flags: FlagSet,
    pub morph: Vec<SmolStr>,
}

impl Entry {
    pub fn new(word: impl Into<SmolStr>) -> Entry {
        Entry {
            word: word.into(),
            flags: FlagSet::new(),
            morph: vec![],
        }
    }

    #[inline(always)]
    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(flag)
    }

    #[inline(always)]
    pub fn has_opt_flag(&self, flag: Option<Flag>) -> bool {
        self.flags.contains_opt(flag)
    }
}

/// A dictionary line that could not be used. Such lines are skipped rather
/// than failing the whole load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct Dictionary {
    entries: Vec<Entry>,
    index: HashMap<SmolStr, Vec<usize>>,
    warnings: Vec<ParseWarning>,
}

impl Dictionary {
    /// Parses a decoded word list against the flag conventions of `affix`.
    pub fn parse(text: &str, affix: &AffixData) -> Result<Dictionary, LoadError> {
        let (entries, warnings) = parse::parse_word_list(text, affix)?;

        let mut dictionary = Dictionary {
            entries: Vec::with_capacity(entries.len()),
            index: HashMap::with_capacity(entries.len()),
            warnings,
        };
        for entry in entries {
            dictionary.insert(entry);
        }

        log::debug!(
            "loaded {} entries ({} lines skipped)",
            dictionary.len(),
            dictionary.warnings.len()
        );

        Ok(dictionary)
    }

    /// Parses an extra word list, returning its entries without indexing them.
    pub(crate) fn parse_entries(text: &str, affix: &AffixData) -> Result<Vec<Entry>, LoadError> {
        let (entries, warnings) = parse::parse_word_list(text, affix)?;
        for warning in warnings {
            log::warn!("skipped line {}: {}", warning.line, warning.reason);
        }
        Ok(entries)
    }

    pub(crate) fn insert(&mut self, entry: Entry) -> usize {
        let id = self.entries.len();
        self.index
            .entry(entry.word.clone())
            .or_insert_with(Vec::new)
            .push(id);
        self.entries.push(entry);
        id
    }

    /// All entries spelled `word`, with their insertion ids, in insertion order.
    pub fn homonyms<'a>(&'a self, word: &str) -> impl Iterator<Item = (usize, &'a Entry)> + 'a {
        self.index
            .get(word)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |id| (*id, &self.entries[*id]))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every character used by a dictionary word, most frequent first.
    pub fn alphabet(&self) -> Vec<char> {
        let mut counts: HashMap<char, usize> = HashMap::new();
        for entry in &self.entries {
            for ch in entry.word.chars() {
                *counts.entry(ch).or_insert(0) += 1;
            }
        }

        let mut chars: Vec<(char, usize)> = counts.into_iter().collect();
        chars.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        chars.into_iter().map(|(ch, _)| ch).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn homographs_are_kept_apart() {
        let affix = AffixData::parse("SFX S Y 1\nSFX S 0 s .\n").unwrap();
        let dic = Dictionary::parse("3\nlead/S po:verb\nlead po:noun\nbox\n", &affix).unwrap();

        assert_eq!(dic.len(), 3);
        let found: Vec<usize> = dic.homonyms("lead").map(|(id, _)| id).collect();
        assert_eq!(found, vec![0, 1]);
        assert!(dic.homonyms("lead").next().unwrap().1.has_flag(Flag('S' as u32)));
        assert_eq!(dic.homonyms("nothing").count(), 0);
    }

    #[test]
    fn alphabet_by_frequency() {
        let affix = AffixData::default();
        let dic = Dictionary::parse("2\naab\nac\n", &affix).unwrap();
        assert_eq!(dic.alphabet(), vec!['a', 'b', 'c']);
    }
}

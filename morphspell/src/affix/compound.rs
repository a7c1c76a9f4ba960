//! Compounding configuration and `COMPOUNDRULE` patterns.

use super::flags::parse_flag;
use crate::types::{Flag, FlagSet, FlagType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quantifier {
    One,
    Optional,
    Many,
}

/// A `COMPOUNDRULE` pattern such as `ABC*D?`: a sequence of flags, each
/// optionally followed by `*` or `?`. Every compound part must carry the
/// flag at its position in the pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundRule {
    atoms: Vec<(Flag, Quantifier)>,
}

impl CompoundRule {
    pub fn parse(flag_type: FlagType, source: &str) -> Result<CompoundRule, String> {
        let mut atoms: Vec<(Flag, Quantifier)> = vec![];
        let mut chars = source.chars().peekable();

        while let Some(ch) = chars.next() {
            let flag = match ch {
                '(' => {
                    let inner: String = chars.by_ref().take_while(|c| *c != ')').collect();
                    parse_flag(flag_type, &inner)?
                }
                '*' | '?' => return Err(format!("dangling quantifier in `{}`", source)),
                c => parse_flag(flag_type, &c.to_string())?,
            };

            let quantifier = match chars.peek() {
                Some('*') => Quantifier::Many,
                Some('?') => Quantifier::Optional,
                _ => Quantifier::One,
            };
            if quantifier != Quantifier::One {
                chars.next();
            }

            atoms.push((flag, quantifier));
        }

        if atoms.is_empty() {
            return Err("empty compound rule".into());
        }

        Ok(CompoundRule { atoms })
    }

    fn close(&self, states: &mut Vec<usize>) {
        let mut i = 0;
        while i < states.len() {
            let p = states[i];
            if p < self.atoms.len() && self.atoms[p].1 != Quantifier::One && !states.contains(&(p + 1)) {
                states.push(p + 1);
            }
            i += 1;
        }
    }

    /// Pattern positions before any part has been consumed.
    pub fn start(&self) -> Vec<usize> {
        let mut states = vec![0];
        self.close(&mut states);
        states
    }

    /// Advances every position in `states` over a part carrying `flags`.
    pub fn step(&self, states: &[usize], flags: &FlagSet) -> Vec<usize> {
        let mut next = vec![];

        for &p in states {
            if p >= self.atoms.len() {
                continue;
            }
            let (flag, quantifier) = self.atoms[p];
            if !flags.contains(flag) {
                continue;
            }
            if quantifier == Quantifier::Many && !next.contains(&p) {
                next.push(p);
            }
            if !next.contains(&(p + 1)) {
                next.push(p + 1);
            }
        }

        self.close(&mut next);
        next
    }

    pub fn accepts(&self, states: &[usize]) -> bool {
        states.contains(&self.atoms.len())
    }

    /// Whether any flag of the pattern occurs in `flags`.
    pub fn mentions(&self, flags: &FlagSet) -> bool {
        self.atoms.iter().any(|(flag, _)| flags.contains(*flag))
    }
}

#[derive(Debug, Clone)]
pub struct CompoundConfig {
    pub flag: Option<Flag>,
    pub begin: Option<Flag>,
    pub middle: Option<Flag>,
    pub end: Option<Flag>,
    pub min_length: usize,
    pub max_words: Option<usize>,
    pub rules: Vec<CompoundRule>,
}

impl Default for CompoundConfig {
    fn default() -> Self {
        CompoundConfig {
            flag: None,
            begin: None,
            middle: None,
            end: None,
            min_length: 3,
            max_words: None,
            rules: vec![],
        }
    }
}

impl CompoundConfig {
    pub fn uses_flags(&self) -> bool {
        self.flag.is_some() || self.begin.is_some() || self.end.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.uses_flags() || !self.rules.is_empty()
    }
}

//! Affix rule tables compiled from an affix source.
//!
//! An [`AffixData`] is built once per session by [`AffixData::parse`] and is
//! never mutated afterwards. Rules are kept in declaration order; lookups go
//! through a per-character index so that only rules whose appended text can
//! possibly match a word are tried.

use hashbrown::HashMap;
use smol_str::SmolStr;

use crate::encoding::Encoding;
use crate::types::{Flag, FlagSet, FlagType};

pub mod compound;
pub mod condition;
pub(crate) mod flags;
mod parse;

pub use self::compound::{CompoundConfig, CompoundRule};
pub use self::condition::Condition;

pub(crate) const DEFAULT_KEYBOARD: &str = "qwertyuiop|asdfghjkl|zxcvbnm";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AffixKind {
    Prefix,
    Suffix,
}

#[derive(Debug, Clone)]
pub struct AffixRule {
    pub flag: Flag,
    pub kind: AffixKind,
    pub cross_product: bool,
    pub strip: SmolStr,
    pub append: SmolStr,
    /// Flags carried by the appended text, allowing a further affix on top.
    pub continuation: FlagSet,
    pub condition: Condition,
    pub morph: Vec<SmolStr>,
}

impl AffixRule {
    /// Undoes this rule on a surface `word`, returning the candidate stem.
    ///
    /// The part of the word left after removing the appended text must not
    /// be empty, and the reconstructed stem must satisfy the condition.
    pub fn strip_from(&self, word: &str) -> Option<String> {
        match self.kind {
            AffixKind::Suffix => {
                let rest = word.strip_suffix(self.append.as_str())?;
                if rest.is_empty() {
                    return None;
                }
                let stem = format!("{}{}", rest, self.strip);
                if self.condition.matches_end(&stem) {
                    Some(stem)
                } else {
                    None
                }
            }
            AffixKind::Prefix => {
                let rest = word.strip_prefix(self.append.as_str())?;
                if rest.is_empty() {
                    return None;
                }
                let stem = format!("{}{}", self.strip, rest);
                if self.condition.matches_start(&stem) {
                    Some(stem)
                } else {
                    None
                }
            }
        }
    }

    /// Applies this rule to `stem`, producing a surface form.
    pub fn apply_to(&self, stem: &str) -> Option<String> {
        match self.kind {
            AffixKind::Suffix => {
                if !self.condition.matches_end(stem) {
                    return None;
                }
                let rest = stem.strip_suffix(self.strip.as_str())?;
                if rest.is_empty() {
                    return None;
                }
                Some(format!("{}{}", rest, self.append))
            }
            AffixKind::Prefix => {
                if !self.condition.matches_start(stem) {
                    return None;
                }
                let rest = stem.strip_prefix(self.strip.as_str())?;
                if rest.is_empty() {
                    return None;
                }
                Some(format!("{}{}", self.append, rest))
            }
        }
    }
}

/// Rule ids keyed by the character an affix's appended text ends (suffixes)
/// or starts (prefixes) with. Rules appending nothing apply to every word.
#[derive(Debug, Default)]
pub(crate) struct AffixIndex {
    by_char: HashMap<char, Vec<usize>>,
    empty: Vec<usize>,
}

impl AffixIndex {
    fn build(rules: &[AffixRule]) -> AffixIndex {
        let mut index = AffixIndex::default();

        for (id, rule) in rules.iter().enumerate() {
            let key = match rule.kind {
                AffixKind::Suffix => rule.append.chars().next_back(),
                AffixKind::Prefix => rule.append.chars().next(),
            };

            match key {
                Some(ch) => index.by_char.entry(ch).or_insert_with(Vec::new).push(id),
                None => index.empty.push(id),
            }
        }

        index
    }

    /// Candidate rule ids in declaration order.
    fn candidates(&self, key: Option<char>) -> impl Iterator<Item = usize> + '_ {
        let keyed = key
            .and_then(|ch| self.by_char.get(&ch))
            .map(|ids| ids.as_slice())
            .unwrap_or(&[]);

        itertools::merge(keyed.iter(), self.empty.iter()).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub from: SmolStr,
    pub to: SmolStr,
    pub anchor_start: bool,
    pub anchor_end: bool,
}

#[derive(Debug)]
pub struct AffixData {
    pub(crate) encoding: Encoding,
    pub(crate) flag_type: FlagType,
    pub(crate) prefixes: Vec<AffixRule>,
    pub(crate) suffixes: Vec<AffixRule>,
    prefix_index: AffixIndex,
    suffix_index: AffixIndex,
    pub(crate) replacements: Vec<Replacement>,
    pub(crate) related: Vec<Vec<SmolStr>>,
    pub(crate) try_chars: Vec<char>,
    pub(crate) keyboard: Vec<Vec<char>>,
    pub(crate) flag_aliases: Vec<FlagSet>,
    pub(crate) morph_aliases: Vec<Vec<SmolStr>>,
    pub(crate) forbidden: Option<Flag>,
    pub(crate) need_affix: Option<Flag>,
    pub(crate) keep_case: Option<Flag>,
    pub(crate) no_suggest: Option<Flag>,
    pub(crate) only_in_compound: Option<Flag>,
    pub(crate) compound: CompoundConfig,
    pub(crate) ignore: Vec<char>,
    pub(crate) no_split_suggestions: bool,
}

impl Default for AffixData {
    fn default() -> Self {
        AffixData {
            encoding: Encoding::Utf8,
            flag_type: FlagType::Short,
            prefixes: vec![],
            suffixes: vec![],
            prefix_index: AffixIndex::default(),
            suffix_index: AffixIndex::default(),
            replacements: vec![],
            related: vec![],
            try_chars: vec![],
            keyboard: parse_keyboard(DEFAULT_KEYBOARD),
            flag_aliases: vec![],
            morph_aliases: vec![],
            forbidden: None,
            need_affix: None,
            keep_case: None,
            no_suggest: None,
            only_in_compound: None,
            compound: CompoundConfig::default(),
            ignore: vec![],
            no_split_suggestions: false,
        }
    }
}

pub(crate) fn parse_keyboard(rows: &str) -> Vec<Vec<char>> {
    rows.split('|')
        .filter(|row| !row.is_empty())
        .map(|row| row.chars().collect())
        .collect()
}

impl AffixData {
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn flag_type(&self) -> FlagType {
        self.flag_type
    }

    pub fn prefixes(&self) -> &[AffixRule] {
        &self.prefixes
    }

    pub fn suffixes(&self) -> &[AffixRule] {
        &self.suffixes
    }

    pub fn replacements(&self) -> &[Replacement] {
        &self.replacements
    }

    pub fn compound(&self) -> &CompoundConfig {
        &self.compound
    }

    pub(crate) fn index_rules(&mut self) {
        self.prefix_index = AffixIndex::build(&self.prefixes);
        self.suffix_index = AffixIndex::build(&self.suffixes);
    }

    /// Suffix rules whose appended text may end `word`.
    pub fn suffixes_for<'a>(&'a self, word: &str) -> impl Iterator<Item = &'a AffixRule> + 'a {
        let key = word.chars().next_back();
        self.suffix_index
            .candidates(key)
            .map(move |id| &self.suffixes[id])
    }

    /// Prefix rules whose appended text may start `word`.
    pub fn prefixes_for<'a>(&'a self, word: &str) -> impl Iterator<Item = &'a AffixRule> + 'a {
        let key = word.chars().next();
        self.prefix_index
            .candidates(key)
            .map(move |id| &self.prefixes[id])
    }

    pub fn rules(&self, kind: AffixKind) -> &[AffixRule] {
        match kind {
            AffixKind::Prefix => &self.prefixes,
            AffixKind::Suffix => &self.suffixes,
        }
    }

    pub fn display_flag(&self, flag: Flag) -> String {
        self.flag_type.display(flag)
    }

    /// Removes `IGNORE` characters from `word`.
    pub fn strip_ignored(&self, word: &str) -> String {
        if self.ignore.is_empty() {
            return word.to_string();
        }
        word.chars().filter(|c| !self.ignore.contains(c)).collect()
    }

    /// Decodes a flag field, resolving `AF` aliases when the source declares any.
    pub(crate) fn parse_flag_set(&self, s: &str) -> Result<FlagSet, String> {
        if !self.flag_aliases.is_empty() && !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
        {
            let index: usize = s
                .parse()
                .map_err(|_| format!("invalid flag alias `{}`", s))?;
            return index
                .checked_sub(1)
                .and_then(|i| self.flag_aliases.get(i))
                .cloned()
                .ok_or_else(|| format!("unknown flag alias `{}`", s));
        }

        flags::parse_flags(self.flag_type, s).map(|flags| flags.into_iter().collect())
    }

    /// Resolves morphological fields, expanding a lone numeric `AM` alias.
    pub(crate) fn resolve_morph(&self, tokens: &[&str]) -> Result<Vec<SmolStr>, String> {
        if let [single] = tokens {
            if !self.morph_aliases.is_empty() && single.chars().all(|c| c.is_ascii_digit()) {
                let index: usize = single
                    .parse()
                    .map_err(|_| format!("invalid morphology alias `{}`", single))?;
                return index
                    .checked_sub(1)
                    .and_then(|i| self.morph_aliases.get(i))
                    .cloned()
                    .ok_or_else(|| format!("unknown morphology alias `{}`", single));
            }
        }

        Ok(tokens.iter().map(|t| SmolStr::from(*t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(kind: AffixKind, strip: &str, append: &str, cond: &str) -> AffixRule {
        AffixRule {
            flag: Flag('A' as u32),
            kind,
            cross_product: true,
            strip: strip.into(),
            append: append.into(),
            continuation: FlagSet::new(),
            condition: Condition::parse(cond).unwrap(),
            morph: vec![],
        }
    }

    #[test]
    fn suffix_strip_and_apply() {
        let ies = rule(AffixKind::Suffix, "y", "ies", "[^aeiou]y");
        assert_eq!(ies.strip_from("flies").as_deref(), Some("fly"));
        assert_eq!(ies.strip_from("days"), None);
        assert_eq!(ies.strip_from("ies"), None);
        assert_eq!(ies.apply_to("fly").as_deref(), Some("flies"));
        assert_eq!(ies.apply_to("day"), None);
    }

    #[test]
    fn prefix_strip_and_apply() {
        let re = rule(AffixKind::Prefix, "", "re", ".");
        assert_eq!(re.strip_from("redo").as_deref(), Some("do"));
        assert_eq!(re.strip_from("re"), None);
        assert_eq!(re.apply_to("do").as_deref(), Some("redo"));
    }

    #[test]
    fn index_keeps_declaration_order() {
        let mut data = AffixData::default();
        data.suffixes = vec![
            rule(AffixKind::Suffix, "", "s", "."),
            rule(AffixKind::Suffix, "", "", "."),
            rule(AffixKind::Suffix, "", "es", "."),
            rule(AffixKind::Suffix, "", "ed", "."),
        ];
        data.index_rules();

        let appends: Vec<&str> = data.suffixes_for("boxes").map(|r| r.append.as_str()).collect();
        assert_eq!(appends, vec!["s", "", "es"]);
    }

    #[test]
    fn ignored_characters() {
        let mut data = AffixData::default();
        data.ignore = vec!['\u{AD}'];
        assert_eq!(data.strip_ignored("hy\u{AD}phen"), "hyphen");
    }
}

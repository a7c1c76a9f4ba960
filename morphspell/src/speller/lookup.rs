//! Candidate lookup: deciding whether a surface form is derivable from the
//! dictionary, and how.
//!
//! A word is tried as a direct entry first, then by undoing a suffix, a
//! suffix on top of a suffix, a prefix, and a prefix together with a suffix,
//! and finally as a compound. Every way a word is found is reported as a
//! [`Match`] so that the analyzer can describe it.

use std::ops::ControlFlow;

use itertools::Either;

use crate::affix::{AffixData, AffixRule};
use crate::dictionary::{Dictionary, Entry};
use crate::overlay::Overlay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LookupMode {
    /// Plain spell checking.
    Check,
    /// Validating a suggestion candidate: `NOSUGGEST` entries don't count.
    Suggest,
}

/// One derivation of a surface form.
#[derive(Debug, Clone)]
pub(crate) struct Match<'a> {
    pub entry: &'a Entry,
    /// Insertion order of `entry`; runtime additions rank after the whole
    /// compiled dictionary.
    pub rank: usize,
    pub prefix: Option<&'a AffixRule>,
    pub suffix: Option<&'a AffixRule>,
    pub outer_suffix: Option<&'a AffixRule>,
    /// Parts of a compound, in order. Empty for simple words.
    pub compound: Vec<&'a Entry>,
}

impl<'a> Match<'a> {
    fn direct(rank: usize, entry: &'a Entry) -> Match<'a> {
        Match {
            entry,
            rank,
            prefix: None,
            suffix: None,
            outer_suffix: None,
            compound: vec![],
        }
    }
}

type Visitor<'v, 'a> = dyn FnMut(Match<'a>) -> ControlFlow<()> + 'v;

/// The compiled tables and the runtime overlay, seen together.
pub(crate) struct Lexicon<'a> {
    pub affix: &'a AffixData,
    pub dictionary: &'a Dictionary,
    pub overlay: &'a Overlay,
}

impl<'a> Lexicon<'a> {
    /// Base entries followed by overlay entries spelled `word`. A removed
    /// word has no entries at all.
    pub fn homonyms(&self, word: &str) -> impl Iterator<Item = (usize, &'a Entry)> + 'a {
        if self.overlay.is_removed(word) {
            return Either::Left(std::iter::empty::<(usize, &'a Entry)>());
        }

        let base_len = self.dictionary.len();
        Either::Right(
            self.dictionary
                .homonyms(word)
                .chain(self.overlay.homonyms(word).map(move |e| (base_len, e))),
        )
    }

    fn usable(&self, entry: &Entry, mode: LookupMode, affixed: bool) -> bool {
        let affix = self.affix;

        if entry.has_opt_flag(affix.forbidden) || entry.has_opt_flag(affix.only_in_compound) {
            return false;
        }
        if !affixed && entry.has_opt_flag(affix.need_affix) {
            return false;
        }
        if mode == LookupMode::Suggest && entry.has_opt_flag(affix.no_suggest) {
            return false;
        }
        true
    }

    fn usable_in_compound(&self, entry: &Entry, mode: LookupMode) -> bool {
        let affix = self.affix;

        !(entry.has_opt_flag(affix.forbidden)
            || entry.has_opt_flag(affix.need_affix)
            || (mode == LookupMode::Suggest && entry.has_opt_flag(affix.no_suggest)))
    }

    /// Whether `rule` may stand as the last affix of a word.
    fn completes(&self, rule: &AffixRule) -> bool {
        !rule.continuation.contains_opt(self.affix.need_affix)
    }

    pub fn first_match(
        &self,
        word: &str,
        mode: LookupMode,
        mut accept: impl FnMut(&Match<'a>) -> bool,
    ) -> Option<Match<'a>> {
        let mut found = None;
        let _ = self.find_matches(word, mode, &mut |m| {
            if accept(&m) {
                found = Some(m);
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        found
    }

    pub fn is_valid(&self, word: &str, mode: LookupMode) -> bool {
        self.first_match(word, mode, |_| true).is_some()
    }

    pub fn all_matches(&self, word: &str) -> Vec<Match<'a>> {
        let mut out = vec![];
        let _ = self.find_matches(word, LookupMode::Check, &mut |m| {
            out.push(m);
            ControlFlow::Continue(())
        });
        out
    }

    fn find_matches(&self, word: &str, mode: LookupMode, f: &mut Visitor<'_, 'a>) -> ControlFlow<()> {
        if word.is_empty() || self.overlay.is_removed(word) {
            return ControlFlow::Continue(());
        }

        for entry in self.overlay.homonyms(word) {
            if self.usable(entry, mode, false) {
                f(Match::direct(self.dictionary.len(), entry))?;
            }
        }

        let forbidden = self.affix.forbidden;
        if self
            .dictionary
            .homonyms(word)
            .any(|(_, e)| e.has_opt_flag(forbidden))
        {
            return ControlFlow::Continue(());
        }

        for (rank, entry) in self.dictionary.homonyms(word) {
            if self.usable(entry, mode, false) {
                f(Match::direct(rank, entry))?;
            }
        }

        self.suffixed(word, mode, f)?;
        self.prefixed(word, mode, f)?;
        self.prefixed_and_suffixed(word, mode, f)?;

        if self.affix.compound.is_enabled() {
            let mut parts = vec![];
            if self.affix.compound.uses_flags() {
                self.compound_by_flags(word, &mut parts, mode, f)?;
            }
            for rule in &self.affix.compound.rules {
                let states = rule.start();
                self.compound_by_rule(rule, &states, word, &mut parts, mode, f)?;
            }
        }

        ControlFlow::Continue(())
    }

    fn suffixed(&self, word: &str, mode: LookupMode, f: &mut Visitor<'_, 'a>) -> ControlFlow<()> {
        let affix = self.affix;

        for sfx in affix.suffixes_for(word) {
            let stem = match sfx.strip_from(word) {
                Some(stem) => stem,
                None => continue,
            };

            if self.completes(sfx) {
                for (rank, entry) in self.homonyms(&stem) {
                    if entry.has_flag(sfx.flag) && self.usable(entry, mode, true) {
                        f(Match {
                            suffix: Some(sfx),
                            ..Match::direct(rank, entry)
                        })?;
                    }
                }
            }

            // `sfx` as the outer of two suffixes
            for inner in affix.suffixes_for(&stem) {
                if !inner.continuation.contains(sfx.flag) {
                    continue;
                }
                let root = match inner.strip_from(&stem) {
                    Some(root) => root,
                    None => continue,
                };

                for (rank, entry) in self.homonyms(&root) {
                    if entry.has_flag(inner.flag) && self.usable(entry, mode, true) {
                        f(Match {
                            suffix: Some(inner),
                            outer_suffix: Some(sfx),
                            ..Match::direct(rank, entry)
                        })?;
                    }
                }
            }
        }

        ControlFlow::Continue(())
    }

    fn prefixed(&self, word: &str, mode: LookupMode, f: &mut Visitor<'_, 'a>) -> ControlFlow<()> {
        for pfx in self.affix.prefixes_for(word) {
            if !self.completes(pfx) {
                continue;
            }
            let stem = match pfx.strip_from(word) {
                Some(stem) => stem,
                None => continue,
            };

            for (rank, entry) in self.homonyms(&stem) {
                if entry.has_flag(pfx.flag) && self.usable(entry, mode, true) {
                    f(Match {
                        prefix: Some(pfx),
                        ..Match::direct(rank, entry)
                    })?;
                }
            }
        }

        ControlFlow::Continue(())
    }

    fn prefixed_and_suffixed(
        &self,
        word: &str,
        mode: LookupMode,
        f: &mut Visitor<'_, 'a>,
    ) -> ControlFlow<()> {
        let affix = self.affix;

        for pfx in affix.prefixes_for(word) {
            let stem = match pfx.strip_from(word) {
                Some(stem) => stem,
                None => continue,
            };

            for sfx in affix.suffixes_for(&stem) {
                let root = match sfx.strip_from(&stem) {
                    Some(root) => root,
                    None => continue,
                };

                let crossed = pfx.cross_product && sfx.cross_product;
                let continued = sfx.continuation.contains(pfx.flag);
                if !crossed && !continued {
                    continue;
                }

                for (rank, entry) in self.homonyms(&root) {
                    if !entry.has_flag(sfx.flag) || !self.usable(entry, mode, true) {
                        continue;
                    }
                    if (crossed && entry.has_flag(pfx.flag)) || continued {
                        f(Match {
                            prefix: Some(pfx),
                            suffix: Some(sfx),
                            ..Match::direct(rank, entry)
                        })?;
                    }
                }
            }
        }

        ControlFlow::Continue(())
    }

    /// Byte offsets splitting `word` into two parts of at least `min` characters.
    fn splits(word: &str, min: usize) -> Vec<usize> {
        let total = word.chars().count();
        word.char_indices()
            .enumerate()
            .filter(|(n, _)| *n >= min && total - n >= min)
            .map(|(_, (i, _))| i)
            .collect()
    }

    fn may_add_part(&self, parts: &[&'a Entry]) -> bool {
        match self.affix.compound.max_words {
            Some(max) => parts.len() + 2 <= max,
            None => true,
        }
    }

    fn emit_compound(&self, parts: &[&'a Entry], f: &mut Visitor<'_, 'a>) -> ControlFlow<()> {
        let first = parts[0];
        let rank = self
            .dictionary
            .homonyms(&first.word)
            .find(|(_, e)| std::ptr::eq(*e, first))
            .map(|(rank, _)| rank)
            .unwrap_or_else(|| self.dictionary.len());

        f(Match {
            compound: parts.to_vec(),
            ..Match::direct(rank, first)
        })
    }

    fn compound_by_flags(
        &self,
        rest: &str,
        parts: &mut Vec<&'a Entry>,
        mode: LookupMode,
        f: &mut Visitor<'_, 'a>,
    ) -> ControlFlow<()> {
        let config = &self.affix.compound;
        let min = config.min_length;

        if !parts.is_empty() && rest.chars().count() >= min {
            for (_, entry) in self.homonyms(rest) {
                if self.usable_in_compound(entry, mode)
                    && (entry.has_opt_flag(config.flag) || entry.has_opt_flag(config.end))
                {
                    parts.push(entry);
                    let flow = self.emit_compound(parts, f);
                    parts.pop();
                    flow?;
                }
            }
        }

        if !self.may_add_part(parts) {
            return ControlFlow::Continue(());
        }

        let role = if parts.is_empty() {
            config.begin
        } else {
            config.middle
        };

        for split in Self::splits(rest, min) {
            let (left, right) = rest.split_at(split);

            for (_, entry) in self.homonyms(left) {
                if self.usable_in_compound(entry, mode)
                    && (entry.has_opt_flag(config.flag) || entry.has_opt_flag(role))
                {
                    parts.push(entry);
                    let flow = self.compound_by_flags(right, parts, mode, f);
                    parts.pop();
                    flow?;
                }
            }
        }

        ControlFlow::Continue(())
    }

    fn compound_by_rule(
        &self,
        rule: &crate::affix::CompoundRule,
        states: &[usize],
        rest: &str,
        parts: &mut Vec<&'a Entry>,
        mode: LookupMode,
        f: &mut Visitor<'_, 'a>,
    ) -> ControlFlow<()> {
        let min = self.affix.compound.min_length;

        if !parts.is_empty() && rest.chars().count() >= min {
            for (_, entry) in self.homonyms(rest) {
                if !self.usable_in_compound(entry, mode) {
                    continue;
                }
                let next = rule.step(states, &entry.flags);
                if rule.accepts(&next) {
                    parts.push(entry);
                    let flow = self.emit_compound(parts, f);
                    parts.pop();
                    flow?;
                }
            }
        }

        if !self.may_add_part(parts) {
            return ControlFlow::Continue(());
        }

        for split in Self::splits(rest, min) {
            let (left, right) = rest.split_at(split);

            for (_, entry) in self.homonyms(left) {
                if !self.usable_in_compound(entry, mode) || !rule.mentions(&entry.flags) {
                    continue;
                }
                let next = rule.step(states, &entry.flags);
                if next.is_empty() {
                    continue;
                }
                parts.push(entry);
                let flow = self.compound_by_rule(rule, &next, right, parts, mode, f);
                parts.pop();
                flow?;
            }
        }

        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AFF: &str = "\
FORBIDDENWORD *
NEEDAFFIX ~
NOSUGGEST !
ONLYINCOMPOUND _
COMPOUNDFLAG C
COMPOUNDMIN 3

PFX U Y 1
PFX U 0 un .

SFX S Y 1
SFX S 0 s .

SFX D Y 1
SFX D 0 ed/L .

SFX L Y 1
SFX L 0 ly .

SFX P N 1
SFX P 0 ness/~ .
";

    const DIC: &str = "\
8
do/US
kind/UP
want/D
foo/S*
foos
crap/!
bird/C
dog/C_
";

    fn lexicon_fixture() -> (AffixData, Dictionary, Overlay) {
        let affix = AffixData::parse(AFF).unwrap();
        let dictionary = Dictionary::parse(DIC, &affix).unwrap();
        (affix, dictionary, Overlay::default())
    }

    #[test]
    fn affix_stripping() {
        let (affix, dictionary, overlay) = lexicon_fixture();
        let lex = Lexicon {
            affix: &affix,
            dictionary: &dictionary,
            overlay: &overlay,
        };

        assert!(lex.is_valid("do", LookupMode::Check));
        assert!(lex.is_valid("dos", LookupMode::Check));
        assert!(lex.is_valid("undo", LookupMode::Check));
        assert!(lex.is_valid("undos", LookupMode::Check));
        assert!(lex.is_valid("wanted", LookupMode::Check));
        assert!(lex.is_valid("wantedly", LookupMode::Check));
        assert!(!lex.is_valid("wantly", LookupMode::Check));
        assert!(!lex.is_valid("s", LookupMode::Check));
    }

    #[test]
    fn need_affix_on_continuation() {
        let (affix, dictionary, overlay) = lexicon_fixture();
        let lex = Lexicon {
            affix: &affix,
            dictionary: &dictionary,
            overlay: &overlay,
        };

        // `ness` carries NEEDAFFIX, so it can't end a word on its own
        assert!(!lex.is_valid("kindness", LookupMode::Check));
        assert!(!lex.is_valid("unkindness", LookupMode::Check));
        assert!(lex.is_valid("unkind", LookupMode::Check));
    }

    #[test]
    fn forbidden_and_nosuggest() {
        let (affix, dictionary, overlay) = lexicon_fixture();
        let lex = Lexicon {
            affix: &affix,
            dictionary: &dictionary,
            overlay: &overlay,
        };

        assert!(!lex.is_valid("foo", LookupMode::Check));
        // only the separate `foos` entry, not `foo` + `s`
        assert_eq!(lex.all_matches("foos").len(), 1);
        assert!(lex.is_valid("crap", LookupMode::Check));
        assert!(!lex.is_valid("crap", LookupMode::Suggest));
    }

    #[test]
    fn compounds() {
        let (affix, dictionary, overlay) = lexicon_fixture();
        let lex = Lexicon {
            affix: &affix,
            dictionary: &dictionary,
            overlay: &overlay,
        };

        assert!(lex.is_valid("birddog", LookupMode::Check));
        assert!(lex.is_valid("dogbird", LookupMode::Check));
        assert!(lex.is_valid("birdbirdbird", LookupMode::Check));
        assert!(!lex.is_valid("dog", LookupMode::Check));
        assert!(!lex.is_valid("birdcat", LookupMode::Check));

        let m = lex.first_match("birddog", LookupMode::Check, |_| true).unwrap();
        let parts: Vec<&str> = m.compound.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(parts, vec!["bird", "dog"]);
    }

    #[test]
    fn removal_hides_derived_forms() {
        let (affix, dictionary, mut overlay) = lexicon_fixture();
        overlay.remove("do");
        let lex = Lexicon {
            affix: &affix,
            dictionary: &dictionary,
            overlay: &overlay,
        };

        assert!(!lex.is_valid("do", LookupMode::Check));
        assert!(!lex.is_valid("dos", LookupMode::Check));
        assert!(!lex.is_valid("undo", LookupMode::Check));
        assert!(lex.is_valid("kind", LookupMode::Check));
    }

    #[test]
    fn overlay_entries_rank_last() {
        let (affix, dictionary, mut overlay) = lexicon_fixture();
        overlay.add(Entry::new("zork")).unwrap();
        let lex = Lexicon {
            affix: &affix,
            dictionary: &dictionary,
            overlay: &overlay,
        };

        let m = lex.first_match("zork", LookupMode::Check, |_| true).unwrap();
        assert_eq!(m.rank, dictionary.len());
    }
}

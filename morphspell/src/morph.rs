//! Morphological analysis, stemming and generation.
//!
//! Analyses use the conventional field notation: each field is preceded by a
//! single space, the stem is `st:<stem>`, compound parts are introduced by
//! `pa:<part>`, and an affix without morphological fields is described by
//! its flag as `fl:<flag>`.

use hashbrown::HashSet;
use itertools::Itertools;
use smol_str::SmolStr;

use crate::affix::{AffixData, AffixRule};
use crate::dictionary::Entry;
use crate::speller::lookup::{Lexicon, Match};

const STEM: &str = "st:";
const PART: &str = "pa:";
const FLAG: &str = "fl:";

fn rule_descriptors(affix: &AffixData, rule: &AffixRule) -> Vec<SmolStr> {
    if rule.morph.is_empty() {
        vec![SmolStr::from(format!("{}{}", FLAG, affix.display_flag(rule.flag)))]
    } else {
        rule.morph.clone()
    }
}

fn push_fields(out: &mut String, fields: &[SmolStr]) {
    for field in fields {
        out.push(' ');
        out.push_str(field);
    }
}

/// The stem an entry reports: its own `st:` field if it has one, otherwise
/// the word itself.
fn entry_stem(entry: &Entry) -> &str {
    entry
        .morph
        .iter()
        .find_map(|field| field.strip_prefix(STEM))
        .unwrap_or(entry.word.as_str())
}

pub(crate) fn describe(affix: &AffixData, m: &Match<'_>) -> String {
    let mut out = String::new();

    if !m.compound.is_empty() {
        for part in &m.compound {
            out.push_str(&format!(" {}{} {}{}", PART, part.word, STEM, entry_stem(part)));
        }
        return out;
    }

    if let Some(prefix) = m.prefix {
        push_fields(&mut out, &rule_descriptors(affix, prefix));
    }
    out.push_str(&format!(" {}{}", STEM, entry_stem(m.entry)));
    for field in m.entry.morph.iter().filter(|f| !f.starts_with(STEM)) {
        out.push(' ');
        out.push_str(field);
    }
    if let Some(suffix) = m.suffix {
        push_fields(&mut out, &rule_descriptors(affix, suffix));
    }
    if let Some(outer) = m.outer_suffix {
        push_fields(&mut out, &rule_descriptors(affix, outer));
    }

    out
}

pub(crate) fn stem_of(m: &Match<'_>) -> String {
    match m.compound.split_last() {
        Some((last, init)) => {
            let mut out: String = init.iter().map(|e| e.word.as_str()).collect();
            out.push_str(entry_stem(last));
            out
        }
        None => entry_stem(m.entry).to_string(),
    }
}

pub(crate) fn analyze(lexicon: &Lexicon<'_>, matches: &[Match<'_>]) -> Vec<String> {
    matches
        .iter()
        .map(|m| describe(lexicon.affix, m))
        .unique()
        .collect()
}

pub(crate) fn stems(matches: &[Match<'_>]) -> Vec<String> {
    matches.iter().map(stem_of).unique().collect()
}

/// Recovers stems from analysis strings: compound parts are joined, with the
/// last part replaced by its stem.
pub fn stems_from_analysis<S: AsRef<str>>(analyses: &[S]) -> Vec<String> {
    analyses
        .iter()
        .filter_map(|analysis| {
            let mut parts: Vec<&str> = vec![];
            let mut stem = None;

            for field in analysis.as_ref().split_whitespace() {
                if let Some(part) = field.strip_prefix(PART) {
                    parts.push(part);
                } else if let Some(st) = field.strip_prefix(STEM) {
                    stem = Some(st);
                }
            }

            let stem = stem?;
            match parts.split_last() {
                Some((_, init)) => Some(format!("{}{}", init.concat(), stem)),
                None => Some(stem.to_string()),
            }
        })
        .unique()
        .collect()
}

/// Every descriptor any affix rule can contribute to an analysis.
fn affix_descriptors(affix: &AffixData) -> HashSet<SmolStr> {
    affix
        .prefixes
        .iter()
        .chain(affix.suffixes.iter())
        .flat_map(|rule| rule_descriptors(affix, rule))
        .collect()
}

fn descriptor_set(affix: &AffixData, rules: &[&AffixRule]) -> HashSet<SmolStr> {
    rules
        .iter()
        .flat_map(|rule| rule_descriptors(affix, rule))
        .collect()
}

/// Surface forms of `entry` whose affixes carry exactly `wanted`.
fn forms_with(affix: &AffixData, entry: &Entry, wanted: &HashSet<SmolStr>) -> Vec<String> {
    let mut out = vec![];
    let carries = |rules: &[&AffixRule]| &descriptor_set(affix, rules) == wanted;

    for sfx in affix.suffixes.iter().filter(|r| entry.has_flag(r.flag)) {
        let inner = match sfx.apply_to(&entry.word) {
            Some(form) => form,
            None => continue,
        };

        if carries(&[sfx]) {
            out.push(inner.clone());
        }

        for outer in affix.suffixes.iter().filter(|r| sfx.continuation.contains(r.flag)) {
            if carries(&[sfx, outer]) {
                if let Some(form) = outer.apply_to(&inner) {
                    out.push(form);
                }
            }
        }

        for pfx in &affix.prefixes {
            let crossed = pfx.cross_product && sfx.cross_product && entry.has_flag(pfx.flag);
            if !crossed && !sfx.continuation.contains(pfx.flag) {
                continue;
            }
            if carries(&[pfx, sfx]) {
                if let Some(form) = pfx.apply_to(&inner) {
                    out.push(form);
                }
            }
        }
    }

    for pfx in affix.prefixes.iter().filter(|r| entry.has_flag(r.flag)) {
        if carries(&[pfx]) {
            if let Some(form) = pfx.apply_to(&entry.word) {
                out.push(form);
            }
        }
    }

    out
}

/// Re-applies the affixes described by `analyses` to the stems in `matches`.
///
/// An analysis carrying no affix descriptors yields the stems themselves.
pub(crate) fn generate<S: AsRef<str>>(
    lexicon: &Lexicon<'_>,
    matches: &[Match<'_>],
    analyses: &[S],
) -> Vec<String> {
    let affix = lexicon.affix;
    let known = affix_descriptors(affix);
    let entries: Vec<&Entry> = matches
        .iter()
        .filter(|m| m.compound.is_empty())
        .map(|m| m.entry)
        .collect();

    let mut out = vec![];

    for analysis in analyses {
        let wanted: HashSet<SmolStr> = analysis
            .as_ref()
            .split_whitespace()
            .filter(|field| known.contains(*field))
            .map(SmolStr::from)
            .collect();

        if wanted.is_empty() {
            out.extend(stems(matches));
            continue;
        }

        for entry in &entries {
            out.extend(forms_with(affix, entry, &wanted));
        }
    }

    out.into_iter().unique().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use crate::overlay::Overlay;

    const AFF: &str = "\
PFX U Y 1
PFX U 0 un . ds:un

SFX S Y 1
SFX S 0 s . is:plural

SFX D Y 1
SFX D 0 ed/L . is:past

SFX L Y 1
SFX L 0 ly .

COMPOUNDFLAG C
";

    const DIC: &str = "5\ncat/S po:noun\ndo/US\nwant/D\nbird/C\nhouse/C\n";

    struct Fixture {
        affix: AffixData,
        dictionary: Dictionary,
        overlay: Overlay,
    }

    impl Fixture {
        fn new() -> Fixture {
            let affix = AffixData::parse(AFF).unwrap();
            let dictionary = Dictionary::parse(DIC, &affix).unwrap();
            Fixture {
                affix,
                dictionary,
                overlay: Overlay::default(),
            }
        }

        fn lexicon(&self) -> Lexicon<'_> {
            Lexicon {
                affix: &self.affix,
                dictionary: &self.dictionary,
                overlay: &self.overlay,
            }
        }
    }

    #[test]
    fn analysis_strings() {
        let f = Fixture::new();
        let lex = f.lexicon();

        assert_eq!(analyze(&lex, &lex.all_matches("cats")), vec![" st:cat po:noun is:plural"]);
        assert_eq!(analyze(&lex, &lex.all_matches("undos")), vec![" ds:un st:do is:plural"]);
        assert_eq!(analyze(&lex, &lex.all_matches("wantedly")), vec![" st:want is:past fl:L"]);
        assert_eq!(
            analyze(&lex, &lex.all_matches("birdhouse")),
            vec![" pa:bird st:bird pa:house st:house"]
        );
    }

    #[test]
    fn stems_agree_with_analyses() {
        let f = Fixture::new();
        let lex = f.lexicon();

        for word in &["cats", "undos", "wantedly", "birdhouse", "do"] {
            let matches = lex.all_matches(word);
            let analyses = analyze(&lex, &matches);
            assert_eq!(stems_from_analysis(&analyses), stems(&matches), "{}", word);
        }
        assert_eq!(stems(&lex.all_matches("birdhouse")), vec!["birdhouse"]);
    }

    #[test]
    fn stem_fields_replace_the_word() {
        let affix = AffixData::parse(AFF).unwrap();
        let dictionary =
            Dictionary::parse("2\ndrank po:verb st:drink is:past\ncat/S\n", &affix).unwrap();
        let overlay = Overlay::default();
        let lex = Lexicon {
            affix: &affix,
            dictionary: &dictionary,
            overlay: &overlay,
        };

        let matches = lex.all_matches("drank");
        let analyses = analyze(&lex, &matches);
        assert_eq!(analyses, vec![" st:drink po:verb is:past"]);
        assert_eq!(stems(&matches), vec!["drink"]);
        assert_eq!(stems_from_analysis(&analyses), stems(&matches));
    }

    #[test]
    fn generation() {
        let f = Fixture::new();
        let lex = f.lexicon();

        let exemplar = analyze(&lex, &lex.all_matches("cats"));
        assert_eq!(generate(&lex, &lex.all_matches("do"), &exemplar), vec!["dos"]);

        let exemplar = analyze(&lex, &lex.all_matches("undos"));
        assert_eq!(generate(&lex, &lex.all_matches("do"), &exemplar), vec!["undos"]);

        // `want` has no rule described by `is:plural`
        let exemplar = analyze(&lex, &lex.all_matches("cats"));
        assert!(generate(&lex, &lex.all_matches("want"), &exemplar).is_empty());

        let exemplar = analyze(&lex, &lex.all_matches("wantedly"));
        assert_eq!(generate(&lex, &lex.all_matches("want"), &exemplar), vec!["wantedly"]);

        // no affixes in the exemplar: the stems come back
        let exemplar = analyze(&lex, &lex.all_matches("cat"));
        assert_eq!(generate(&lex, &lex.all_matches("dos"), &exemplar), vec!["do"]);
    }
}

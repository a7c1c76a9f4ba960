//! Case variants of input words.
//!
//! Dictionaries list words in their canonical case. Input in title case or
//! capitals is checked through lower-cased variants, and suggestions found
//! for a variant are re-cased to match the input.

use itertools::Itertools;
use smol_str::SmolStr;

#[inline(always)]
pub fn lower_case(s: &str) -> SmolStr {
    s.chars()
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .into()
}

#[inline(always)]
pub fn upper_case(s: &str) -> SmolStr {
    s.chars()
        .flat_map(char::to_uppercase)
        .collect::<String>()
        .into()
}

#[inline(always)]
pub fn upper_first(s: &str) -> SmolStr {
    let mut c = s.chars();
    match c.next() {
        None => SmolStr::new(""),
        Some(f) => SmolStr::from(f.to_uppercase().collect::<String>() + c.as_str()),
    }
}

#[inline(always)]
pub fn lower_first(s: &str) -> SmolStr {
    let mut c = s.chars();
    match c.next() {
        None => SmolStr::new(""),
        Some(f) => SmolStr::from(f.to_lowercase().collect::<String>() + c.as_str()),
    }
}

/// The capitalisation pattern of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Casing {
    /// No upper case letters.
    Lower,
    /// Only the first letter is upper case.
    Title,
    /// Every letter is upper case.
    Upper,
    /// Upper case letters after the first, but not all of them (`McDonald`).
    Mixed,
}

pub fn casing(word: &str) -> Casing {
    let mut letters = word.chars().filter(|c| c.is_alphabetic());
    let first_upper = match letters.next() {
        Some(c) => c.is_uppercase(),
        None => return Casing::Lower,
    };

    let (mut upper, mut lower) = (0usize, 0usize);
    for c in letters {
        if c.is_uppercase() {
            upper += 1;
        } else if c.is_lowercase() {
            lower += 1;
        }
    }

    match (first_upper, upper, lower) {
        (true, _, 0) => Casing::Upper,
        (true, 0, _) => Casing::Title,
        (false, 0, _) => Casing::Lower,
        _ => Casing::Mixed,
    }
}

pub fn is_mixed_case(word: &str) -> bool {
    casing(word) == Casing::Mixed
}

pub fn is_all_caps(word: &str) -> bool {
    upper_case(word) == word
}

pub fn is_first_caps(word: &str) -> bool {
    upper_first(word) == word
}

/// How suggestions found through a variant are re-cased for the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMutation {
    FirstCaps,
    AllCaps,
    None,
}

impl CaseMutation {
    pub fn apply(self, s: &str) -> SmolStr {
        match self {
            CaseMutation::FirstCaps => upper_first(s),
            CaseMutation::AllCaps => upper_case(s),
            CaseMutation::None => SmolStr::from(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    /// Stop at the first variant producing any suggestion.
    FirstResults,
    /// Merge suggestions of all variants, penalising the case changes.
    MergeAll,
}

#[derive(Debug, Clone)]
pub struct CaseHandler {
    pub original_input: SmolStr,
    pub mutation: CaseMutation,
    pub mode: CaseMode,
    /// Variants to try after the input itself, most specific first.
    pub words: Vec<SmolStr>,
}

/// Variants of a mixed-case word only toggle the first letter: `mcDonald`
/// may be `McDonald`, but must not match a lower-cased `mcdonald`.
fn mixed_case_word_variants(word: &str) -> CaseHandler {
    let mut words = vec![];
    let first_caps = word.chars().next().map(char::is_uppercase).unwrap_or(false);

    if first_caps {
        words.push(lower_first(word));
    } else {
        let upper = upper_first(word);
        if !is_all_caps(&upper) {
            words.push(upper);
        }
    }

    CaseHandler {
        original_input: word.into(),
        mutation: if first_caps {
            CaseMutation::FirstCaps
        } else {
            CaseMutation::None
        },
        mode: CaseMode::FirstResults,
        words,
    }
}

pub fn word_variants(word: &str) -> CaseHandler {
    let case = casing(word);
    if case == Casing::Mixed {
        return mixed_case_word_variants(word);
    }

    let (words, mutation): (Vec<SmolStr>, _) = match case {
        Casing::Upper => (
            vec![upper_first(&lower_case(word)), lower_case(word)],
            CaseMutation::AllCaps,
        ),
        Casing::Title => (vec![lower_case(word)], CaseMutation::FirstCaps),
        _ => (vec![], CaseMutation::None),
    };

    CaseHandler {
        original_input: word.into(),
        mutation,
        mode: CaseMode::MergeAll,
        words: words.into_iter().filter(|w| w != word).unique().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn casing_patterns() {
        assert_eq!(casing("word"), Casing::Lower);
        assert_eq!(casing("Word"), Casing::Title);
        assert_eq!(casing("WORD"), Casing::Upper);
        assert_eq!(casing("McDonald"), Casing::Mixed);
        assert_eq!(casing("mcDonald"), Casing::Mixed);
        assert_eq!(casing("A"), Casing::Upper);
        assert_eq!(casing("123"), Casing::Lower);
    }

    #[test]
    fn variants() {
        let v = word_variants("IDENTITETE");
        assert_eq!(v.mutation, CaseMutation::AllCaps);
        assert_eq!(v.words, vec![SmolStr::from("Identitete"), SmolStr::from("identitete")]);

        let v = word_variants("Identitete");
        assert_eq!(v.mutation, CaseMutation::FirstCaps);
        assert_eq!(v.words, vec![SmolStr::from("identitete")]);

        let v = word_variants("identitete");
        assert_eq!(v.mutation, CaseMutation::None);
        assert!(v.words.is_empty());
    }

    #[test]
    fn mixed_case_toggles_first_letter_only() {
        let v = word_variants("McDonald");
        assert_eq!(v.mode, CaseMode::FirstResults);
        assert_eq!(v.words, vec![SmolStr::from("mcDonald")]);

        let v = word_variants("mcDonald");
        assert_eq!(v.words, vec![SmolStr::from("McDonald")]);
    }

    #[test]
    fn mixed_case() {
        assert_eq!(is_mixed_case("McDonald"), true);
        assert_eq!(is_mixed_case("Mcdonald"), false);
        assert_eq!(is_mixed_case("McDoNaLd"), true);
        assert_eq!(is_mixed_case("MCDONALD"), false);
        assert_eq!(is_mixed_case("mcdonald"), false);
        assert_eq!(is_mixed_case("DavveVássján"), true);
        assert_eq!(is_mixed_case("Davvevássján"), false);
        assert_eq!(is_mixed_case("SgPaI"), true);
    }

    #[test]
    fn recasing() {
        assert_eq!(CaseMutation::AllCaps.apply("words"), "WORDS");
        assert_eq!(CaseMutation::FirstCaps.apply("words"), "Words");
        assert_eq!(CaseMutation::None.apply("words"), "words");
    }
}

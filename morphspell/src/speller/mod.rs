use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use unic_ucd_category::GeneralCategory;

use self::error::SpellerError;
use self::lookup::{Lexicon, LookupMode, Match};
use self::worker::SpellerWorker;
use crate::affix::AffixData;
use crate::archive::error::LoadError;
use crate::constants::{DEFAULT_MAX_CANDIDATES, DEFAULT_N_BEST};
use crate::dictionary::{Dictionary, Entry};
use crate::encoding::Encoding;
use crate::morph;
use crate::overlay::Overlay;
use crate::speller::suggestion::Suggestion;
use crate::tokenizer::case_handling::CaseHandler;
use crate::types::Weight;

mod distance;
pub mod error;
pub(crate) mod lookup;
pub mod suggestion;
mod worker;

/// Extra weight for suggestions found through a case variant of the input.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaseHandlingConfig {
    pub start_penalty: f32,
    pub end_penalty: f32,
    pub mid_penalty: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpellerConfig {
    /// Most suggestions returned.
    pub n_best: Option<usize>,
    /// Suggestions weighing more are dropped.
    pub max_weight: Option<Weight>,
    pub case_handling: Option<CaseHandlingConfig>,
    /// Lookups spent on two-edit candidates before giving up.
    pub max_candidates: usize,
    /// Capacity of the runtime dictionary; unbounded when `None`.
    pub max_overlay_words: Option<usize>,
}

impl SpellerConfig {
    pub const fn default() -> SpellerConfig {
        SpellerConfig {
            n_best: Some(DEFAULT_N_BEST),
            max_weight: None,
            case_handling: Some(CaseHandlingConfig::default()),
            max_candidates: DEFAULT_MAX_CANDIDATES,
            max_overlay_words: None,
        }
    }
}

impl CaseHandlingConfig {
    pub const fn default() -> CaseHandlingConfig {
        CaseHandlingConfig {
            start_penalty: 0.0,
            end_penalty: 0.0,
            mid_penalty: 0.25,
        }
    }
}

pub trait Speller {
    fn is_correct(self: Arc<Self>, word: &str) -> bool;
    fn is_correct_with_config(self: Arc<Self>, word: &str, config: &SpellerConfig) -> bool;
    fn suggest(self: Arc<Self>, word: &str) -> Vec<Suggestion>;
    fn suggest_with_config(self: Arc<Self>, word: &str, config: &SpellerConfig) -> Vec<Suggestion>;
    fn analyze(self: Arc<Self>, word: &str) -> Vec<String>;
    fn stem(self: Arc<Self>, word: &str) -> Vec<String>;
    fn generate(self: Arc<Self>, word: &str, exemplar: &str) -> Vec<String>;
    fn generate_from_analysis(self: Arc<Self>, word: &str, analyses: &[String]) -> Vec<String>;
}

/// A speller over a compiled affix table and dictionary, with a runtime
/// overlay of added and removed words.
#[derive(Debug)]
pub struct AffixSpeller {
    affix: AffixData,
    dictionary: Dictionary,
    overlay: RwLock<Overlay>,
    alphabet: Vec<char>,
}

impl Speller for AffixSpeller {
    #[allow(clippy::wrong_self_convention)]
    fn is_correct_with_config(self: Arc<Self>, word: &str, config: &SpellerConfig) -> bool {
        use crate::tokenizer::case_handling::*;

        let word = self.affix.strip_ignored(word);

        if word.is_empty() {
            return true;
        }

        // Check if there are zero letters in the word according to
        // Unicode letter category
        if word.chars().all(|c| !GeneralCategory::of(c).is_letter()) {
            return true;
        }

        let keep_case = self.affix.keep_case;

        self.with_lexicon(|lexicon| {
            if lexicon.is_valid(&word, LookupMode::Check) {
                return true;
            }

            if config.case_handling.is_none() {
                return false;
            }

            word_variants(&word).words.iter().any(|variant| {
                lexicon
                    .first_match(variant, LookupMode::Check, |m| {
                        !m.entry.has_opt_flag(keep_case)
                    })
                    .is_some()
            })
        })
    }

    #[inline]
    fn is_correct(self: Arc<Self>, word: &str) -> bool {
        self.is_correct_with_config(word, &SpellerConfig::default())
    }

    #[inline]
    fn suggest(self: Arc<Self>, word: &str) -> Vec<Suggestion> {
        self.suggest_with_config(word, &SpellerConfig::default())
    }

    fn suggest_with_config(self: Arc<Self>, word: &str, config: &SpellerConfig) -> Vec<Suggestion> {
        use crate::tokenizer::case_handling::*;

        let word = self.affix.strip_ignored(word);

        if word.is_empty() {
            return vec![];
        }

        let mut suggestions = if let Some(case_handling) = config.case_handling.as_ref() {
            let case_handler = word_variants(&word);

            self.clone().suggest_case(case_handler, config, case_handling)
        } else {
            self.clone().suggest_single(&word, config)
        };

        if suggestions.iter().any(|s| s.value == word.as_str())
            && !self.is_correct_with_config(&word, config)
        {
            suggestions.retain(|s| s.value != word.as_str());
        }

        suggestions
    }

    fn analyze(self: Arc<Self>, word: &str) -> Vec<String> {
        let word = self.affix.strip_ignored(word);
        self.with_lexicon(|lexicon| {
            let matches = self.matches_for(&lexicon, &word);
            morph::analyze(&lexicon, &matches)
        })
    }

    fn stem(self: Arc<Self>, word: &str) -> Vec<String> {
        let word = self.affix.strip_ignored(word);
        self.with_lexicon(|lexicon| morph::stems(&self.matches_for(&lexicon, &word)))
    }

    fn generate(self: Arc<Self>, word: &str, exemplar: &str) -> Vec<String> {
        let analyses = self.clone().analyze(exemplar);
        if analyses.is_empty() {
            return vec![];
        }
        self.generate_from_analysis(word, &analyses)
    }

    fn generate_from_analysis(self: Arc<Self>, word: &str, analyses: &[String]) -> Vec<String> {
        let word = self.affix.strip_ignored(word);
        self.with_lexicon(|lexicon| {
            let matches = self.matches_for(&lexicon, &word);
            morph::generate(&lexicon, &matches, analyses)
        })
    }
}

impl AffixSpeller {
    pub fn new(
        affix: AffixData,
        dictionary: Dictionary,
        max_overlay_words: Option<usize>,
    ) -> Arc<AffixSpeller> {
        let mut alphabet = dictionary.alphabet();
        alphabet.retain(|c| !affix.ignore.contains(c));

        Arc::new(AffixSpeller {
            affix,
            dictionary,
            overlay: RwLock::new(Overlay::new(max_overlay_words)),
            alphabet,
        })
    }

    /// Compiles decoded affix and dictionary sources.
    pub fn compile(
        aff: &str,
        dic: &str,
        config: &SpellerConfig,
    ) -> Result<Arc<AffixSpeller>, LoadError> {
        let affix = AffixData::parse(aff)?;
        let dictionary = Dictionary::parse(dic, &affix)?;
        Ok(AffixSpeller::new(affix, dictionary, config.max_overlay_words))
    }

    pub fn affix(&self) -> &AffixData {
        &self.affix
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn encoding(&self) -> Encoding {
        self.affix.encoding
    }

    /// Runs `f` against the tables with the overlay read-locked.
    fn with_lexicon<R>(&self, f: impl FnOnce(Lexicon<'_>) -> R) -> R {
        let overlay = self.overlay.read();
        f(Lexicon {
            affix: &self.affix,
            dictionary: &self.dictionary,
            overlay: &overlay,
        })
    }

    /// Matches for `word`, falling back to its case variants.
    fn matches_for<'a>(&self, lexicon: &Lexicon<'a>, word: &str) -> Vec<Match<'a>> {
        use crate::tokenizer::case_handling::word_variants;

        let matches = lexicon.all_matches(word);
        if !matches.is_empty() {
            return matches;
        }

        let keep_case = self.affix.keep_case;
        for variant in word_variants(word).words {
            let matches: Vec<Match<'a>> = lexicon
                .all_matches(&variant)
                .into_iter()
                .filter(|m| !m.entry.has_opt_flag(keep_case))
                .collect();
            if !matches.is_empty() {
                return matches;
            }
        }

        vec![]
    }

    pub fn add(&self, word: &str) -> Result<(), SpellerError> {
        let word = self.affix.strip_ignored(word);
        self.overlay.write().add(Entry::new(word))
    }

    /// Adds `word` inflecting like `exemplar`, whose first entry (compiled
    /// dictionary first, then runtime additions) lends its flags and fields.
    pub fn add_with_affix(&self, word: &str, exemplar: &str) -> Result<(), SpellerError> {
        let word = self.affix.strip_ignored(word);
        let exemplar = self.affix.strip_ignored(exemplar);

        let template = self.with_lexicon(|lexicon| {
            lexicon
                .homonyms(&exemplar)
                .next()
                .map(|(_, e)| (e.flags.clone(), e.morph.clone()))
        });

        let entry = match template {
            Some((flags, morph)) => Entry {
                word: word.into(),
                flags,
                morph,
            },
            None => {
                log::debug!("exemplar {} not found, adding {} without flags", exemplar, word);
                Entry::new(word)
            }
        };

        self.overlay.write().add(entry)
    }

    pub fn remove(&self, word: &str) {
        let word = self.affix.strip_ignored(word);
        self.overlay.write().remove(&word);
    }

    pub(crate) fn add_entries(&self, entries: Vec<Entry>) -> Result<usize, SpellerError> {
        self.overlay.write().add_all(entries)
    }

    fn suggest_single(self: Arc<Self>, word: &str, config: &SpellerConfig) -> Vec<Suggestion> {
        self.with_lexicon(|lexicon| {
            let worker = SpellerWorker::new(lexicon, &self.alphabet, word, config);

            worker.suggest()
        })
    }

    fn suggest_case(
        self: Arc<Self>,
        case: CaseHandler,
        config: &SpellerConfig,
        case_handling: &CaseHandlingConfig,
    ) -> Vec<Suggestion> {
        use crate::tokenizer::case_handling::*;

        let CaseHandler {
            original_input,
            mutation,
            mode,
            words,
        } = case;
        let mut best: HashMap<SmolStr, (f32, usize)> = HashMap::new();

        for word in std::iter::once(&original_input).chain(words.iter()) {
            let mut suggestions = self.clone().suggest_single(word, config);

            suggestions
                .iter_mut()
                .for_each(|x| x.value = mutation.apply(x.value()));

            match mode {
                CaseMode::MergeAll => {
                    for sugg in suggestions.into_iter() {
                        let penalty_start = match original_input.chars().next() {
                            Some(c) if !sugg.value().starts_with(c) => case_handling.start_penalty,
                            _ => 0.0,
                        };
                        let penalty_end = match original_input.chars().next_back() {
                            Some(c) if !sugg.value().ends_with(c) => case_handling.end_penalty,
                            _ => 0.0,
                        };

                        let distance = strsim::damerau_levenshtein(&original_input, word);
                        let penalty_middle = case_handling.mid_penalty * distance as f32;
                        let additional_weight = penalty_start + penalty_end + penalty_middle;
                        let weight = sugg.weight + additional_weight;

                        best.entry(sugg.value.clone())
                            .and_modify(|entry| {
                                if entry.0 > weight {
                                    *entry = (weight, sugg.rank)
                                }
                            })
                            .or_insert((weight, sugg.rank));
                    }
                }
                CaseMode::FirstResults => {
                    if !suggestions.is_empty() {
                        return suggestions;
                    }
                }
            }
        }

        if best.is_empty() {
            return vec![];
        }

        let mut out = best
            .into_iter()
            .map(|(value, (weight, rank))| Suggestion {
                value,
                weight,
                rank,
            })
            .collect::<Vec<_>>();
        if let Some(max_weight) = config.max_weight {
            out.retain(|s| s.weight <= max_weight);
        }
        out.sort();
        if let Some(n_best) = config.n_best {
            out.truncate(n_best);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AFF: &str = "\
KEEPCASE K
SFX S Y 1
SFX S 0 s .
";

    const DIC: &str = "4\nword/S\nParis\nmacOS/K\nhello\n";

    fn speller() -> Arc<AffixSpeller> {
        AffixSpeller::compile(AFF, DIC, &SpellerConfig::default()).unwrap()
    }

    #[test]
    fn case_variants() {
        let s = speller();
        assert!(s.clone().is_correct("Word"));
        assert!(s.clone().is_correct("WORDS"));
        assert!(s.clone().is_correct("PARIS"));
        assert!(!s.clone().is_correct("paris"));
        assert!(s.clone().is_correct("macOS"));
        assert!(!s.clone().is_correct("MACOS"));
        assert!(!s.clone().is_correct("MacOS"));
    }

    #[test]
    fn no_letters_or_empty() {
        let s = speller();
        assert!(s.clone().is_correct(""));
        assert!(s.clone().is_correct("1234"));
        assert!(s.clone().is_correct("--"));
        assert!(s.suggest("").is_empty());
    }

    #[test]
    fn suggestions_keep_input_case() {
        let s = speller();
        let found: Vec<String> = s
            .clone()
            .suggest("Wrods")
            .into_iter()
            .map(|s| s.value.to_string())
            .collect();
        assert_eq!(found.first().map(String::as_str), Some("Words"));

        let found = s.suggest("HELO");
        assert_eq!(found.first().map(|s| s.value()), Some("HELLO"));
    }

    #[test]
    fn case_penalties_respect_max_weight() {
        let s = speller();
        let mut config = SpellerConfig {
            max_weight: Some(3.0),
            ..SpellerConfig::default()
        };
        let found = s.clone().suggest_with_config("Wrods", &config);
        assert_eq!(found.first().map(|s| s.value()), Some("Words"));

        config.case_handling = Some(CaseHandlingConfig {
            mid_penalty: 5.0,
            ..CaseHandlingConfig::default()
        });
        let found = s.suggest_with_config("Wrods", &config);
        assert!(found.iter().all(|s| s.weight <= 3.0));
    }

    #[test]
    fn config_from_json() {
        let config: SpellerConfig = serde_json::from_str(
            r#"{
                "n_best": 5,
                "max_weight": null,
                "case_handling": { "start_penalty": 0.0, "end_penalty": 0.0, "mid_penalty": 1.0 },
                "max_candidates": 100,
                "max_overlay_words": 2
            }"#,
        )
        .unwrap();
        assert_eq!(config.n_best, Some(5));
        assert_eq!(config.max_overlay_words, Some(2));

        let s = AffixSpeller::compile(AFF, DIC, &config).unwrap();
        s.add("one").unwrap();
        s.add("two").unwrap();
        assert!(matches!(
            s.add("three"),
            Err(SpellerError::NoAvailableSlot { capacity: 2 })
        ));
        assert!(!s.is_correct("three"));
    }

    #[test]
    fn overlay_round_trip() {
        let s = speller();
        assert!(!s.clone().is_correct("zork"));
        s.add("zork").unwrap();
        assert!(s.clone().is_correct("zork"));
        s.remove("zork");
        assert!(!s.clone().is_correct("zork"));

        s.add_with_affix("florp", "word").unwrap();
        assert!(s.clone().is_correct("florps"));
        s.remove("florp");
        assert!(!s.clone().is_correct("florps"));

        s.remove("word");
        assert!(!s.clone().is_correct("words"));
        // adding lifts the removal, so the compiled entry is back too
        s.add("word").unwrap();
        assert!(s.clone().is_correct("word"));
        assert!(s.is_correct("words"));
    }
}

use hashbrown::{HashMap, HashSet};
use smol_str::SmolStr;

use super::distance::{keyboard_neighbors, weighted_distance};
use super::lookup::{Lexicon, LookupMode};
use super::SpellerConfig;
use crate::constants::REP_WEIGHT;
use crate::speller::suggestion::Suggestion;
use crate::tokenizer::case_handling::{upper_case, upper_first};
use crate::types::Weight;

#[inline(always)]
fn speller_max_weight(config: &SpellerConfig) -> Weight {
    config.max_weight.unwrap_or(f32::MAX)
}

/// Generates corrections for one input word through a cascade of edit
/// tiers, validating every candidate against the lexicon.
pub struct SpellerWorker<'a> {
    lexicon: Lexicon<'a>,
    alphabet: &'a [char],
    input: &'a str,
    config: &'a SpellerConfig,
    checked: HashSet<SmolStr>,
    corrections: HashMap<SmolStr, (Weight, usize)>,
}

impl<'a> SpellerWorker<'a> {
    #[inline(always)]
    pub(crate) fn new(
        lexicon: Lexicon<'a>,
        alphabet: &'a [char],
        input: &'a str,
        config: &'a SpellerConfig,
    ) -> SpellerWorker<'a> {
        SpellerWorker {
            lexicon,
            alphabet,
            input,
            config,
            checked: HashSet::new(),
            corrections: HashMap::new(),
        }
    }

    fn is_full(&self) -> bool {
        match self.config.n_best {
            Some(n) => self.corrections.len() >= n,
            None => false,
        }
    }

    /// Insertion order of the entry `candidate` derives from, if it is valid.
    /// Candidates containing spaces need every part to be valid.
    fn validate(&self, candidate: &str) -> Option<usize> {
        let mut rank = None;

        for part in candidate.split(' ') {
            let m = self
                .lexicon
                .first_match(part, LookupMode::Suggest, |_| true)?;
            rank.get_or_insert(m.rank);
        }

        rank
    }

    /// Returns whether a lookup was spent on `candidate`.
    fn try_candidate(&mut self, candidate: &str, weight: Option<Weight>) -> bool {
        if candidate.is_empty() || candidate == self.input || self.checked.contains(candidate) {
            return false;
        }
        self.checked.insert(SmolStr::from(candidate));

        let rank = match self.validate(candidate) {
            Some(rank) => rank,
            None => return true,
        };

        let weight = weight
            .unwrap_or_else(|| weighted_distance(self.lexicon.affix, self.input, candidate));
        if weight > speller_max_weight(self.config) {
            return true;
        }

        let entry = self
            .corrections
            .entry(SmolStr::from(candidate))
            .or_insert((weight, rank));
        if entry.0 > weight {
            *entry = (weight, rank);
        }

        true
    }

    fn case_changes(&mut self) {
        let title = upper_first(self.input);
        let upper = upper_case(self.input);
        self.try_candidate(&title, None);
        self.try_candidate(&upper, None);
    }

    fn replacements(&mut self) {
        let affix = self.lexicon.affix;
        let word = self.input;

        for rep in affix.replacements.iter().filter(|r| !r.from.is_empty()) {
            let mut start = 0;

            while let Some(pos) = word[start..].find(rep.from.as_str()) {
                let at = start + pos;
                let end = at + rep.from.len();

                if (!rep.anchor_start || at == 0) && (!rep.anchor_end || end == word.len()) {
                    let candidate = format!("{}{}{}", &word[..at], rep.to, &word[end..]);
                    self.try_candidate(&candidate, Some(REP_WEIGHT));
                }

                start = at + word[at..].chars().next().map(char::len_utf8).unwrap_or(1);
            }
        }
    }

    fn related_characters(&mut self) {
        let affix = self.lexicon.affix;
        let word = self.input;

        for group in &affix.related {
            for from in group {
                for (at, _) in word.match_indices(from.as_str()) {
                    let end = at + from.len();
                    for to in group.iter().filter(|to| *to != from) {
                        let candidate = format!("{}{}{}", &word[..at], to, &word[end..]);
                        self.try_candidate(&candidate, None);
                    }
                }
            }
        }
    }

    fn edit_alphabet(&self) -> &[char] {
        let try_chars = &self.lexicon.affix.try_chars;
        if try_chars.is_empty() {
            self.alphabet
        } else {
            try_chars
        }
    }

    /// Every string one edit away from `word`: deletions, adjacent swaps,
    /// insertions, keyboard-neighbour and alphabet substitutions.
    fn edits(&self, word: &str) -> Vec<String> {
        let chars: Vec<char> = word.chars().collect();
        let alphabet = self.edit_alphabet();
        let keyboard = &self.lexicon.affix.keyboard;
        let mut out = Vec::with_capacity(chars.len() * (2 * alphabet.len() + 4));

        let join = |chars: &[char]| chars.iter().collect::<String>();

        for i in 0..chars.len() {
            let mut c = chars.clone();
            c.remove(i);
            out.push(join(&c));
        }

        for i in 1..chars.len() {
            if chars[i - 1] != chars[i] {
                let mut c = chars.clone();
                c.swap(i - 1, i);
                out.push(join(&c));
            }
        }

        for i in 0..=chars.len() {
            for ch in alphabet {
                let mut c = chars.clone();
                c.insert(i, *ch);
                out.push(join(&c));
            }
        }

        for i in 0..chars.len() {
            let original = chars[i];
            let mut neighbors = keyboard_neighbors(keyboard, original);
            if original.is_uppercase() {
                let lower: String = original.to_lowercase().collect();
                if let Some(lower) = lower.chars().next() {
                    neighbors.extend(
                        keyboard_neighbors(keyboard, lower)
                            .into_iter()
                            .flat_map(char::to_uppercase),
                    );
                }
            }

            for ch in neighbors.iter().chain(alphabet.iter()) {
                if *ch == original {
                    continue;
                }
                let mut c = chars.clone();
                c[i] = *ch;
                out.push(join(&c));
            }
        }

        out
    }

    fn single_edits(&mut self) {
        for candidate in self.edits(self.input) {
            self.try_candidate(&candidate, None);
        }
    }

    fn double_edits(&mut self) {
        let mut lookups = 0usize;
        let max = self.config.max_candidates;

        for first in self.edits(self.input) {
            for candidate in self.edits(&first) {
                if lookups >= max {
                    log::trace!("{}: candidate cap of {} reached", self.input, max);
                    return;
                }
                if self.try_candidate(&candidate, None) {
                    lookups += 1;
                }
            }
        }
    }

    fn word_breaks(&mut self) {
        let word = self.input;

        for (at, _) in word.char_indices().skip(1) {
            let candidate = format!("{} {}", &word[..at], &word[at..]);
            self.try_candidate(&candidate, None);
            if self.is_full() {
                return;
            }
        }
    }

    fn generate_sorted_suggestions(&self) -> Vec<Suggestion> {
        let mut c: Vec<Suggestion> = self
            .corrections
            .iter()
            .map(|(value, (weight, rank))| Suggestion::new(value.clone(), *weight, *rank))
            .collect();

        c.sort();

        if let Some(n) = self.config.n_best {
            c.truncate(n);
        }

        c
    }

    pub(crate) fn suggest(mut self) -> Vec<Suggestion> {
        log::trace!("Beginning suggest for {}", self.input);

        self.case_changes();
        self.replacements();
        self.related_characters();
        log::trace!("tier 0: {} found", self.corrections.len());

        if !self.is_full() {
            self.single_edits();
            log::trace!("tier 1: {} found", self.corrections.len());
        }

        if self.corrections.is_empty() {
            self.double_edits();
            log::trace!("tier 2: {} found", self.corrections.len());
        }

        if !self.is_full() && !self.lexicon.affix.no_split_suggestions {
            self.word_breaks();
            log::trace!("tier 3: {} found", self.corrections.len());
        }

        self.generate_sorted_suggestions()
    }
}

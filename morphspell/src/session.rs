//! The public entry point: an open dictionary with its runtime overlay.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::archive::{self, error::LoadError};
use crate::constants::MAX_WORD_LEN;
use crate::dictionary::Dictionary;
use crate::encoding::Encoding;
use crate::morph;
use crate::speller::error::SpellerError;
use crate::speller::suggestion::Suggestion;
use crate::speller::{AffixSpeller, Speller, SpellerConfig};
use crate::vfs::Fs;

/// A compiled affix table and dictionary, open until [`Session::close`].
///
/// Every operation validates its word arguments against [`MAX_WORD_LEN`]
/// bytes in the dictionary encoding, and fails with
/// [`SpellerError::AlreadyClosed`] once the session is closed.
#[derive(Debug)]
pub struct Session {
    speller: RwLock<Option<Arc<AffixSpeller>>>,
    config: SpellerConfig,
}

impl Session {
    pub fn open<P: AsRef<Path>>(dic: P, aff: P, key: Option<&str>) -> Result<Session, LoadError> {
        Session::open_with_config(dic, aff, key, SpellerConfig::default())
    }

    pub fn open_with_config<P: AsRef<Path>>(
        dic: P,
        aff: P,
        key: Option<&str>,
        config: SpellerConfig,
    ) -> Result<Session, LoadError> {
        let sources = archive::load_sources(&Fs, dic.as_ref(), aff.as_ref(), key)?;
        Session::from_sources_with_config(&sources.aff, &sources.dic, config)
    }

    /// Compiles already decoded affix and dictionary text.
    pub fn from_sources(aff: &str, dic: &str) -> Result<Session, LoadError> {
        Session::from_sources_with_config(aff, dic, SpellerConfig::default())
    }

    pub fn from_sources_with_config(
        aff: &str,
        dic: &str,
        config: SpellerConfig,
    ) -> Result<Session, LoadError> {
        let speller = AffixSpeller::compile(aff, dic, &config)?;

        for warning in speller.dictionary().warnings() {
            log::warn!("dictionary line {}: {}", warning.line, warning.reason);
        }
        log::debug!(
            "opened session: {} entries, {} prefixes, {} suffixes",
            speller.dictionary().len(),
            speller.affix().prefixes().len(),
            speller.affix().suffixes().len()
        );

        Ok(Session {
            speller: RwLock::new(Some(speller)),
            config,
        })
    }

    fn speller(&self) -> Result<Arc<AffixSpeller>, SpellerError> {
        self.speller
            .read()
            .as_ref()
            .map(Arc::clone)
            .ok_or(SpellerError::AlreadyClosed)
    }

    /// The open speller, once `words` are all within the length bound.
    fn checked(&self, words: &[(&'static str, &str)]) -> Result<Arc<AffixSpeller>, SpellerError> {
        let speller = self.speller()?;
        let encoding = speller.encoding();

        for &(name, word) in words {
            let len = encoding.encoded_len(word);
            if len > MAX_WORD_LEN {
                return Err(SpellerError::InvalidWord {
                    name,
                    len,
                    max: MAX_WORD_LEN,
                });
            }
        }

        Ok(speller)
    }

    fn checked_non_empty(
        &self,
        words: &[(&'static str, &str)],
    ) -> Result<Arc<AffixSpeller>, SpellerError> {
        let speller = self.checked(words)?;
        match words.iter().find(|(_, word)| word.is_empty()) {
            Some(&(name, _)) => Err(SpellerError::EmptyWord(name)),
            None => Ok(speller),
        }
    }

    pub fn is_correct(&self, word: &str) -> Result<bool, SpellerError> {
        let speller = self.checked(&[("word", word)])?;
        Ok(speller.is_correct_with_config(word, &self.config))
    }

    pub fn suggest(&self, word: &str) -> Result<Vec<Suggestion>, SpellerError> {
        self.suggest_with_config(word, &self.config)
    }

    pub fn suggest_with_config(
        &self,
        word: &str,
        config: &SpellerConfig,
    ) -> Result<Vec<Suggestion>, SpellerError> {
        let speller = self.checked(&[("word", word)])?;
        Ok(speller.suggest_with_config(word, config))
    }

    pub fn analyze(&self, word: &str) -> Result<Vec<String>, SpellerError> {
        Ok(self.checked(&[("word", word)])?.analyze(word))
    }

    pub fn stem(&self, word: &str) -> Result<Vec<String>, SpellerError> {
        Ok(self.checked(&[("word", word)])?.stem(word))
    }

    /// Stems recovered from the output of [`Session::analyze`].
    pub fn stem_analysis<S: AsRef<str>>(&self, analyses: &[S]) -> Result<Vec<String>, SpellerError> {
        self.speller()?;
        Ok(morph::stems_from_analysis(analyses))
    }

    /// Forms of `word` inflected like `exemplar`.
    pub fn generate(&self, word: &str, exemplar: &str) -> Result<Vec<String>, SpellerError> {
        let speller = self.checked(&[("word", word), ("exemplar", exemplar)])?;
        Ok(speller.generate(word, exemplar))
    }

    pub fn generate_from_analysis(
        &self,
        word: &str,
        analyses: &[String],
    ) -> Result<Vec<String>, SpellerError> {
        let speller = self.checked(&[("word", word)])?;
        Ok(speller.generate_from_analysis(word, analyses))
    }

    pub fn add(&self, word: &str) -> Result<(), SpellerError> {
        self.checked_non_empty(&[("word", word)])?.add(word)
    }

    pub fn add_with_affix(&self, word: &str, exemplar: &str) -> Result<(), SpellerError> {
        self.checked_non_empty(&[("word", word), ("exemplar", exemplar)])?
            .add_with_affix(word, exemplar)
    }

    pub fn remove(&self, word: &str) -> Result<(), SpellerError> {
        self.checked_non_empty(&[("word", word)])?.remove(word);
        Ok(())
    }

    /// Adds every entry of the word list at `path`, read in the session
    /// encoding. Returns the number of entries added.
    pub fn add_dic<P: AsRef<Path>>(&self, path: P) -> Result<usize, SpellerError> {
        let speller = self.speller()?;
        let text = archive::load_dictionary(&Fs, path.as_ref(), speller.encoding())?;
        let entries = Dictionary::parse_entries(&text, speller.affix())?;
        let added = speller.add_entries(entries)?;
        log::debug!("added {} words from {}", added, path.as_ref().display());
        Ok(added)
    }

    pub fn dictionary_encoding(&self) -> Result<Encoding, SpellerError> {
        Ok(self.speller()?.encoding())
    }

    /// Releases the compiled tables. Closing twice is a no-op.
    pub fn close(&self) {
        if self.speller.write().take().is_some() {
            log::debug!("session closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.speller.read().is_none()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.is_closed() {
            log::warn!("session dropped without being closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_sessions_refuse_work() {
        let session = Session::from_sources("", "1\nword\n").unwrap();
        assert!(session.is_correct("word").unwrap());

        session.close();
        session.close();
        assert!(session.is_closed());
        assert!(matches!(session.is_correct("word"), Err(SpellerError::AlreadyClosed)));
        assert!(matches!(session.add("word"), Err(SpellerError::AlreadyClosed)));
        assert!(matches!(session.dictionary_encoding(), Err(SpellerError::AlreadyClosed)));
    }

    #[test]
    fn latin1_lengths_count_characters() {
        let session = Session::from_sources("SET ISO8859-1\n", "1\nword\n").unwrap();
        assert_eq!(session.dictionary_encoding().unwrap(), Encoding::Latin1);

        let word = "ä".repeat(MAX_WORD_LEN);
        assert!(session.is_correct(&word).is_ok());
        let word = "ä".repeat(MAX_WORD_LEN + 1);
        assert!(matches!(
            session.is_correct(&word),
            Err(SpellerError::InvalidWord { len: 257, .. })
        ));
        session.close();
    }

    #[test]
    fn empty_words_cannot_be_added() {
        let session = Session::from_sources("", "1\nword\n").unwrap();
        assert!(session.is_correct("").unwrap());
        assert!(matches!(session.add(""), Err(SpellerError::EmptyWord("word"))));
        assert!(matches!(
            session.add_with_affix("new", ""),
            Err(SpellerError::EmptyWord("exemplar"))
        ));
        session.close();
    }
}

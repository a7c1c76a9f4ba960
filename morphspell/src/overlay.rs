//! Words added and removed at runtime, layered over the compiled dictionary.

use hashbrown::{HashMap, HashSet};
use smol_str::SmolStr;

use crate::dictionary::Entry;
use crate::speller::error::SpellerError;

/// In-memory additions and removals.
///
/// Removing a word hides every entry spelled that way, base or added, and so
/// every form derived from it. Adding a word lifts a previous removal.
#[derive(Debug, Default)]
pub struct Overlay {
    added: HashMap<SmolStr, Vec<Entry>>,
    removed: HashSet<SmolStr>,
    count: usize,
    capacity: Option<usize>,
}

impl Overlay {
    pub fn new(capacity: Option<usize>) -> Overlay {
        Overlay {
            capacity,
            ..Default::default()
        }
    }

    fn check_capacity(&self, extra: usize) -> Result<(), SpellerError> {
        match self.capacity {
            Some(capacity) if self.count + extra > capacity => {
                Err(SpellerError::NoAvailableSlot { capacity })
            }
            _ => Ok(()),
        }
    }

    fn contains(&self, entry: &Entry) -> bool {
        self.added
            .get(&entry.word)
            .map(|entries| entries.contains(entry))
            .unwrap_or(false)
    }

    fn insert(&mut self, entry: Entry) {
        self.removed.remove(&entry.word);
        self.added
            .entry(entry.word.clone())
            .or_insert_with(Vec::new)
            .push(entry);
        self.count += 1;
    }

    /// Adding an entry already present only lifts a removal.
    pub fn add(&mut self, entry: Entry) -> Result<(), SpellerError> {
        if self.contains(&entry) {
            self.removed.remove(&entry.word);
            return Ok(());
        }
        self.check_capacity(1)?;
        self.insert(entry);
        Ok(())
    }

    /// Adds every new entry or none of them. Returns how many were new.
    pub fn add_all(&mut self, entries: Vec<Entry>) -> Result<usize, SpellerError> {
        let mut fresh: Vec<Entry> = Vec::with_capacity(entries.len());
        let mut known: Vec<SmolStr> = vec![];
        for entry in entries {
            if self.contains(&entry) {
                known.push(entry.word);
            } else if !fresh.contains(&entry) {
                fresh.push(entry);
            }
        }

        self.check_capacity(fresh.len())?;

        for word in known {
            self.removed.remove(&word);
        }
        let count = fresh.len();
        for entry in fresh {
            self.insert(entry);
        }
        Ok(count)
    }

    pub fn remove(&mut self, word: &str) {
        if let Some(entries) = self.added.remove(word) {
            self.count -= entries.len();
        }
        self.removed.insert(SmolStr::from(word));
    }

    #[inline(always)]
    pub fn is_removed(&self, word: &str) -> bool {
        self.removed.contains(word)
    }

    pub fn homonyms<'a>(&'a self, word: &str) -> impl Iterator<Item = &'a Entry> + 'a {
        self.added.get(word).into_iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_remove() {
        let mut overlay = Overlay::default();
        overlay.add(Entry::new("foo")).unwrap();
        assert_eq!(overlay.homonyms("foo").count(), 1);

        overlay.remove("foo");
        overlay.remove("foo");
        assert!(overlay.is_removed("foo"));
        assert_eq!(overlay.homonyms("foo").count(), 0);

        overlay.add(Entry::new("foo")).unwrap();
        assert!(!overlay.is_removed("foo"));
        assert_eq!(overlay.homonyms("foo").count(), 1);
    }

    #[test]
    fn capacity_leaves_overlay_unchanged() {
        let mut overlay = Overlay::new(Some(2));
        overlay.add(Entry::new("a")).unwrap();

        match overlay.add_all(vec![Entry::new("b"), Entry::new("c")]) {
            Err(SpellerError::NoAvailableSlot { capacity }) => assert_eq!(capacity, 2),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(overlay.len(), 1);
        assert_eq!(overlay.homonyms("b").count(), 0);

        overlay.add(Entry::new("b")).unwrap();
        assert!(overlay.add(Entry::new("c")).is_err());
    }

    #[test]
    fn adding_twice_takes_one_slot() {
        let mut overlay = Overlay::new(Some(2));
        overlay.add(Entry::new("foo")).unwrap();
        overlay.add(Entry::new("foo")).unwrap();
        assert_eq!(overlay.len(), 1);
        assert_eq!(overlay.homonyms("foo").count(), 1);

        overlay.add(Entry::new("bar")).unwrap();
        assert_eq!(overlay.len(), 2);
        assert!(overlay.add(Entry::new("baz")).is_err());

        assert_eq!(
            overlay.add_all(vec![Entry::new("foo"), Entry::new("bar")]).unwrap(),
            0
        );

        overlay.remove("foo");
        assert_eq!(overlay.len(), 1);
        overlay.add(Entry::new("baz")).unwrap();
    }
}

use std::fmt;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

pub type Weight = f32;

/// A single affix or property flag, decoded according to the [`FlagType`]
/// declared by the affix file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Flag(pub(crate) u32);

impl Flag {
    pub fn value(self) -> u32 {
        self.0
    }
}

/// How flags are spelled in affix and dictionary sources (the `FLAG` directive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagType {
    /// One character per flag. The default.
    Short,
    /// Two characters per flag (`FLAG long`).
    Long,
    /// Comma separated decimal numbers (`FLAG num`).
    Numeric,
    /// One Unicode scalar per flag (`FLAG UTF-8`).
    Utf8,
}

impl Default for FlagType {
    fn default() -> Self {
        FlagType::Short
    }
}

impl FlagType {
    pub(crate) fn display(self, flag: Flag) -> String {
        match self {
            FlagType::Short | FlagType::Utf8 => char::from_u32(flag.0)
                .map(String::from)
                .unwrap_or_else(|| flag.0.to_string()),
            FlagType::Long => {
                let hi = char::from_u32(flag.0 >> 16);
                let lo = char::from_u32(flag.0 & 0xFFFF);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => [hi, lo].iter().collect(),
                    _ => flag.0.to_string(),
                }
            }
            FlagType::Numeric => flag.0.to_string(),
        }
    }
}

/// The flags attached to a dictionary entry or to an affix's continuation.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FlagSet(HashSet<Flag>);

impl FlagSet {
    pub fn new() -> FlagSet {
        FlagSet(HashSet::new())
    }

    #[inline(always)]
    pub fn contains(&self, flag: Flag) -> bool {
        self.0.contains(&flag)
    }

    /// Membership test for the optional property flags of an affix file.
    #[inline(always)]
    pub fn contains_opt(&self, flag: Option<Flag>) -> bool {
        match flag {
            Some(flag) => self.0.contains(&flag),
            None => false,
        }
    }

    pub fn insert(&mut self, flag: Flag) -> bool {
        self.0.insert(flag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Flag> + '_ {
        self.0.iter().copied()
    }

    pub fn sorted(&self) -> Vec<Flag> {
        let mut flags: Vec<Flag> = self.0.iter().copied().collect();
        flags.sort_unstable();
        flags
    }
}

impl fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.sorted()).finish()
    }
}

impl std::iter::FromIterator<Flag> for FlagSet {
    fn from_iter<I: IntoIterator<Item = Flag>>(iter: I) -> Self {
        FlagSet(iter.into_iter().collect())
    }
}

impl Extend<Flag> for FlagSet {
    fn extend<I: IntoIterator<Item = Flag>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_display() {
        assert_eq!(FlagType::Short.display(Flag('S' as u32)), "S");
        assert_eq!(
            FlagType::Long.display(Flag(('A' as u32) << 16 | 'b' as u32)),
            "Ab"
        );
        assert_eq!(FlagType::Numeric.display(Flag(1001)), "1001");
    }

    #[test]
    fn flag_set_membership() {
        let set: FlagSet = vec![Flag(3), Flag(1), Flag(2)].into_iter().collect();
        assert!(set.contains(Flag(2)));
        assert!(!set.contains(Flag(4)));
        assert!(set.contains_opt(Some(Flag(1))));
        assert!(!set.contains_opt(None));
        assert_eq!(set.sorted(), vec![Flag(1), Flag(2), Flag(3)]);
    }
}

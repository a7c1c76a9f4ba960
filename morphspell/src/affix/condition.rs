//! Affix applicability conditions.
//!
//! Conditions use a tiny subset of regular expressions: `.`, literal
//! characters and bracketed (optionally negated) character sets. They are
//! compiled to a fixed sequence of character classes and matched directly
//! against the end (suffixes) or the start (prefixes) of a stem.

#[derive(Debug, Clone, PartialEq, Eq)]
enum CharClass {
    Any,
    Char(char),
    Set { negated: bool, chars: Box<[char]> },
}

impl CharClass {
    #[inline(always)]
    fn matches(&self, ch: char) -> bool {
        match self {
            CharClass::Any => true,
            CharClass::Char(c) => *c == ch,
            CharClass::Set { negated, chars } => chars.contains(&ch) != *negated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Condition {
    classes: Box<[CharClass]>,
}

impl Condition {
    /// The condition that accepts every stem.
    pub fn any() -> Condition {
        Condition::default()
    }

    pub fn parse(source: &str) -> Result<Condition, String> {
        if source == "." {
            return Ok(Condition::any());
        }

        let mut classes = vec![];
        let mut chars = source.chars();

        while let Some(ch) = chars.next() {
            match ch {
                '.' => classes.push(CharClass::Any),
                '[' => {
                    let mut set = vec![];
                    let mut negated = false;
                    let mut closed = false;

                    for (i, c) in chars.by_ref().enumerate() {
                        match c {
                            '^' if i == 0 => negated = true,
                            ']' => {
                                closed = true;
                                break;
                            }
                            c => set.push(c),
                        }
                    }

                    if !closed {
                        return Err(format!("unterminated character set in condition `{}`", source));
                    }

                    classes.push(CharClass::Set {
                        negated,
                        chars: set.into_boxed_slice(),
                    });
                }
                ']' => return Err(format!("unbalanced `]` in condition `{}`", source)),
                c => classes.push(CharClass::Char(c)),
            }
        }

        Ok(Condition {
            classes: classes.into_boxed_slice(),
        })
    }

    /// Number of characters the condition inspects.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn matches_end(&self, stem: &str) -> bool {
        let mut chars = stem.chars().rev();
        self.classes.iter().rev().all(|class| match chars.next() {
            Some(ch) => class.matches(ch),
            None => false,
        })
    }

    pub fn matches_start(&self, stem: &str) -> bool {
        let mut chars = stem.chars();
        self.classes.iter().all(|class| match chars.next() {
            Some(ch) => class.matches(ch),
            None => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_is_unconditional() {
        let cond = Condition::parse(".").unwrap();
        assert!(cond.is_empty());
        assert!(cond.matches_end(""));
        assert!(cond.matches_start("abc"));
    }

    #[test]
    fn suffix_conditions() {
        let cond = Condition::parse("[^aeiou]y").unwrap();
        assert_eq!(cond.len(), 2);
        assert!(cond.matches_end("fly"));
        assert!(!cond.matches_end("day"));
        assert!(!cond.matches_end("y"));

        let cond = Condition::parse("[sxz]").unwrap();
        assert!(cond.matches_end("box"));
        assert!(!cond.matches_end("boy"));
    }

    #[test]
    fn prefix_conditions() {
        let cond = Condition::parse("[^e].").unwrap();
        assert!(cond.matches_start("do"));
        assert!(!cond.matches_start("eat"));
        assert!(!cond.matches_start("d"));
    }

    #[test]
    fn malformed() {
        assert!(Condition::parse("[abc").is_err());
        assert!(Condition::parse("ab]").is_err());
    }
}

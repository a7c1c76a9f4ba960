use smol_str::SmolStr;

use super::compound::CompoundRule;
use super::condition::Condition;
use super::flags::parse_flag;
use super::{parse_keyboard, AffixData, AffixKind, AffixRule, Replacement};
use crate::archive::error::LoadError;
use crate::encoding::Encoding;
use crate::types::{FlagSet, FlagType};

#[derive(Debug)]
struct Line<'a> {
    number: usize,
    tokens: Vec<&'a str>,
}

impl<'a> Line<'a> {
    fn directive(&self) -> &'a str {
        self.tokens[0]
    }

    fn arg(&self, i: usize) -> Result<&'a str, LoadError> {
        self.tokens.get(i).copied().ok_or_else(|| {
            LoadError::malformed(
                self.number,
                format!("missing argument {} for {}", i, self.directive()),
            )
        })
    }
}

fn tokenize(text: &str) -> Vec<Line<'_>> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.first() {
                None => None,
                Some(t) if t.starts_with('#') => None,
                Some(_) => Some(Line {
                    number: i + 1,
                    tokens,
                }),
            }
        })
        .collect()
}

fn parse_count(line: &Line<'_>, i: usize) -> Result<usize, LoadError> {
    let raw = line.arg(i)?;
    raw.parse().map_err(|_| {
        LoadError::malformed(
            line.number,
            format!("expected an entry count for {}, found `{}`", line.directive(), raw),
        )
    })
}

/// Consumes the entries of a counted table such as `REP 3`, which must be
/// followed by exactly that many lines naming the same directive.
fn table<'l, 'a>(
    lines: &'l [Line<'a>],
    cursor: &mut usize,
    count: usize,
    matches: impl Fn(&Line<'a>) -> bool,
) -> Result<&'l [Line<'a>], LoadError> {
    let header = &lines[*cursor];
    let start = *cursor + 1;

    for n in 0..count {
        match lines.get(start + n) {
            Some(line) if matches(line) => {}
            other => {
                let number = other.map(|l| l.number).unwrap_or(header.number);
                return Err(LoadError::malformed(
                    number,
                    format!(
                        "{} declares {} entries but only {} follow",
                        header.directive(),
                        count,
                        n
                    ),
                ));
            }
        }
    }

    *cursor = start + count;
    Ok(&lines[start..start + count])
}

fn empty_if_zero(s: &str) -> &str {
    if s == "0" {
        ""
    } else {
        s
    }
}

/// Splits a `MAP` entry into its related characters; `(ss)` groups a sequence.
fn parse_map_group(s: &str) -> Vec<SmolStr> {
    let mut out = vec![];
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        if ch == '(' {
            let group: String = chars.by_ref().take_while(|c| *c != ')').collect();
            if !group.is_empty() {
                out.push(SmolStr::from(group));
            }
        } else {
            out.push(SmolStr::from(ch.to_string()));
        }
    }

    out
}

fn parse_replacement(from: &str, to: &str) -> Replacement {
    let mut from = from;
    let anchor_start = from.starts_with('^');
    if anchor_start {
        from = &from[1..];
    }
    let anchor_end = from.ends_with('$');
    if anchor_end {
        from = &from[..from.len() - 1];
    }

    Replacement {
        from: from.replace('_', " ").into(),
        to: to.replace('_', " ").into(),
        anchor_start,
        anchor_end,
    }
}

impl AffixData {
    /// Compiles decoded affix source text.
    ///
    /// Any structural problem aborts the whole load with
    /// [`LoadError::MalformedAffixData`]; directives that are not understood
    /// are skipped.
    pub fn parse(text: &str) -> Result<AffixData, LoadError> {
        let lines = tokenize(text);
        let mut data = AffixData::default();
        let mut cursor = 0;

        while cursor < lines.len() {
            let line = &lines[cursor];
            let number = line.number;
            let bad = |reason: String| LoadError::malformed(number, reason);

            match line.directive() {
                "SET" => {
                    let label = line.arg(1)?;
                    data.encoding = Encoding::from_label(label)
                        .ok_or_else(|| LoadError::UnsupportedEncoding(label.to_string()))?;
                }
                "FLAG" => {
                    data.flag_type = match line.arg(1)? {
                        "long" => FlagType::Long,
                        "num" => FlagType::Numeric,
                        "UTF-8" => FlagType::Utf8,
                        other => return Err(bad(format!("unknown flag type `{}`", other))),
                    };
                }
                "PFX" | "SFX" => {
                    let rules = data.parse_affix_block(&lines, &mut cursor)?;
                    match line.directive() {
                        "PFX" => data.prefixes.extend(rules),
                        _ => data.suffixes.extend(rules),
                    }
                    continue;
                }
                "REP" => {
                    let count = parse_count(line, 1)?;
                    for entry in table(&lines, &mut cursor, count, |l| l.directive() == "REP")? {
                        let from = entry.arg(1)?;
                        let to = entry.arg(2)?;
                        data.replacements.push(parse_replacement(from, to));
                    }
                    continue;
                }
                "MAP" => {
                    let count = parse_count(line, 1)?;
                    for entry in table(&lines, &mut cursor, count, |l| l.directive() == "MAP")? {
                        let group = parse_map_group(entry.arg(1)?);
                        if group.len() > 1 {
                            data.related.push(group);
                        }
                    }
                    continue;
                }
                "AF" => {
                    let count = parse_count(line, 1)?;
                    let flag_type = data.flag_type;
                    for entry in table(&lines, &mut cursor, count, |l| l.directive() == "AF")? {
                        let flags = super::flags::parse_flags(flag_type, entry.arg(1)?)
                            .map_err(|e| LoadError::malformed(entry.number, e))?;
                        data.flag_aliases.push(flags.into_iter().collect());
                    }
                    continue;
                }
                "AM" => {
                    let count = parse_count(line, 1)?;
                    for entry in table(&lines, &mut cursor, count, |l| l.directive() == "AM")? {
                        data.morph_aliases
                            .push(entry.tokens[1..].iter().map(|t| SmolStr::from(*t)).collect());
                    }
                    continue;
                }
                "COMPOUNDRULE" => {
                    let count = parse_count(line, 1)?;
                    let flag_type = data.flag_type;
                    for entry in table(&lines, &mut cursor, count, |l| {
                        l.directive() == "COMPOUNDRULE"
                    })? {
                        let rule = CompoundRule::parse(flag_type, entry.arg(1)?)
                            .map_err(|e| LoadError::malformed(entry.number, e))?;
                        data.compound.rules.push(rule);
                    }
                    continue;
                }
                "TRY" => data.try_chars = line.arg(1)?.chars().collect(),
                "KEY" => data.keyboard = parse_keyboard(line.arg(1)?),
                "IGNORE" => data.ignore = line.arg(1)?.chars().collect(),
                "NOSPLITSUGS" => data.no_split_suggestions = true,
                "FORBIDDENWORD" => data.forbidden = Some(data.single_flag(line)?),
                "NEEDAFFIX" | "PSEUDOROOT" => data.need_affix = Some(data.single_flag(line)?),
                "KEEPCASE" => data.keep_case = Some(data.single_flag(line)?),
                "NOSUGGEST" => data.no_suggest = Some(data.single_flag(line)?),
                "ONLYINCOMPOUND" => data.only_in_compound = Some(data.single_flag(line)?),
                "COMPOUNDFLAG" => data.compound.flag = Some(data.single_flag(line)?),
                "COMPOUNDBEGIN" => data.compound.begin = Some(data.single_flag(line)?),
                "COMPOUNDMIDDLE" => data.compound.middle = Some(data.single_flag(line)?),
                "COMPOUNDEND" | "COMPOUNDLAST" => data.compound.end = Some(data.single_flag(line)?),
                "COMPOUNDMIN" => {
                    let n = parse_count(line, 1)?;
                    data.compound.min_length = n.max(1);
                }
                "COMPOUNDWORDMAX" => data.compound.max_words = Some(parse_count(line, 1)?),
                other => log::debug!("line {}: ignoring directive {}", number, other),
            }

            cursor += 1;
        }

        data.index_rules();

        log::debug!(
            "compiled {} prefix and {} suffix rules ({})",
            data.prefixes.len(),
            data.suffixes.len(),
            data.encoding.name()
        );

        Ok(data)
    }

    fn single_flag(&self, line: &Line<'_>) -> Result<crate::types::Flag, LoadError> {
        parse_flag(self.flag_type, line.arg(1)?).map_err(|e| LoadError::malformed(line.number, e))
    }

    fn parse_affix_block(
        &self,
        lines: &[Line<'_>],
        cursor: &mut usize,
    ) -> Result<Vec<AffixRule>, LoadError> {
        let header = &lines[*cursor];
        let kind = match header.directive() {
            "PFX" => AffixKind::Prefix,
            _ => AffixKind::Suffix,
        };

        if header.tokens.len() < 4 {
            return Err(LoadError::malformed(
                header.number,
                format!("{} header needs a flag, Y or N and a count", header.directive()),
            ));
        }

        let flag_name = header.tokens[1];
        let flag = self.single_flag(header)?;
        let cross_product = match header.tokens[2] {
            "Y" => true,
            "N" => false,
            other => {
                return Err(LoadError::malformed(
                    header.number,
                    format!("expected Y or N for cross product, found `{}`", other),
                ))
            }
        };
        let count = parse_count(header, 3)?;

        let directive = header.directive();
        let entries = table(lines, cursor, count, |l| {
            l.directive() == directive && l.tokens.get(1) == Some(&flag_name)
        })?;

        entries
            .iter()
            .map(|entry| {
                if entry.tokens.len() < 4 {
                    return Err(LoadError::malformed(
                        entry.number,
                        format!("{} rule needs strip and append fields", directive),
                    ));
                }

                let strip = self.strip_ignored(empty_if_zero(entry.tokens[2]));
                let (append, continuation) = match entry.tokens[3].split_once('/') {
                    Some((append, flags)) => (
                        append,
                        self.parse_flag_set(flags)
                            .map_err(|e| LoadError::malformed(entry.number, e))?,
                    ),
                    None => (entry.tokens[3], FlagSet::new()),
                };
                let append = self.strip_ignored(empty_if_zero(append));

                let condition = Condition::parse(entry.tokens.get(4).copied().unwrap_or("."))
                    .map_err(|e| LoadError::malformed(entry.number, e))?;

                let morph = if entry.tokens.len() > 5 {
                    self.resolve_morph(&entry.tokens[5..])
                        .map_err(|e| LoadError::malformed(entry.number, e))?
                } else {
                    vec![]
                };

                Ok(AffixRule {
                    flag,
                    kind,
                    cross_product,
                    strip: strip.into(),
                    append: append.into(),
                    continuation,
                    condition,
                    morph,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Flag;

    const AFF: &str = "\
# English-ish
SET UTF-8
TRY esianrtolcdugmphbyfvkwz
KEY qwertyuiop|asdfghjkl|zxcvbnm
NOSUGGEST !
FORBIDDENWORD *

REP 2
REP f ph
REP ^alot$ a_lot

MAP 1
MAP aáà

PFX R Y 1
PFX R 0 re .

SFX S Y 3
SFX S y ies [^aeiou]y
SFX S 0 s [aeiou]y
SFX S 0 s [^y] is:plural

SFX D N 1
SFX D 0 ed/S .
";

    #[test]
    fn compiles_rule_blocks() {
        let data = AffixData::parse(AFF).unwrap();

        assert_eq!(data.prefixes().len(), 1);
        assert_eq!(data.suffixes().len(), 4);
        assert_eq!(data.try_chars.first(), Some(&'e'));
        assert_eq!(data.keyboard.len(), 3);
        assert_eq!(data.no_suggest, Some(Flag('!' as u32)));
        assert_eq!(data.forbidden, Some(Flag('*' as u32)));

        let ies = &data.suffixes()[0];
        assert_eq!(ies.strip, "y");
        assert_eq!(ies.append, "ies");
        assert!(ies.cross_product);

        let plural = &data.suffixes()[2];
        assert_eq!(plural.morph, vec![SmolStr::from("is:plural")]);

        let ed = &data.suffixes()[3];
        assert!(!ed.cross_product);
        assert!(ed.continuation.contains(Flag('S' as u32)));
    }

    #[test]
    fn replacements_and_map() {
        let data = AffixData::parse(AFF).unwrap();
        assert_eq!(data.replacements()[0].from, "f");
        let alot = &data.replacements()[1];
        assert!(alot.anchor_start && alot.anchor_end);
        assert_eq!(alot.from, "alot");
        assert_eq!(alot.to, "a lot");
        assert_eq!(data.related[0].len(), 3);
    }

    #[test]
    fn count_mismatch_is_fatal() {
        let aff = "SFX S Y 2\nSFX S 0 s .\n";
        match AffixData::parse(aff) {
            Err(LoadError::MalformedAffixData { line, .. }) => assert_eq!(line, 1),
            other => panic!("unexpected {:?}", other),
        }

        let aff = "REP x\n";
        assert!(matches!(
            AffixData::parse(aff),
            Err(LoadError::MalformedAffixData { .. })
        ));
    }

    #[test]
    fn bad_flag_types() {
        assert!(matches!(
            AffixData::parse("FLAG bogus\n"),
            Err(LoadError::MalformedAffixData { line: 1, .. })
        ));
        assert!(matches!(
            AffixData::parse("SET KOI8-R\n"),
            Err(LoadError::UnsupportedEncoding(_))
        ));
    }

    #[test]
    fn long_and_numeric_flags() {
        let data = AffixData::parse("FLAG long\nSFX Aa Y 1\nSFX Aa 0 s/Bb .\n").unwrap();
        let flag = Flag(('A' as u32) << 16 | 'a' as u32);
        assert_eq!(data.suffixes()[0].flag, flag);
        assert_eq!(data.display_flag(flag), "Aa");

        let data = AffixData::parse("FLAG num\nSFX 101 Y 1\nSFX 101 0 s/7,8 .\n").unwrap();
        assert_eq!(data.suffixes()[0].flag, Flag(101));
        assert_eq!(data.suffixes()[0].continuation.len(), 2);
    }

    #[test]
    fn aliases() {
        let aff = "AF 2\nAF AB\nAF C\nAM 1\nAM po:noun\nSFX A Y 1\nSFX A 0 s/2 . 1\n";
        let data = AffixData::parse(aff).unwrap();
        let rule = &data.suffixes()[0];
        assert!(rule.continuation.contains(Flag('C' as u32)));
        assert_eq!(rule.morph, vec![SmolStr::from("po:noun")]);

        let flags = data.parse_flag_set("1").unwrap();
        assert!(flags.contains(Flag('A' as u32)) && flags.contains(Flag('B' as u32)));
        assert!(data.parse_flag_set("3").is_err());
    }

    #[test]
    fn compounding_directives() {
        let aff = "COMPOUNDFLAG X\nCOMPOUNDMIN 2\nCOMPOUNDWORDMAX 3\nCOMPOUNDRULE 1\nCOMPOUNDRULE AB*\n";
        let data = AffixData::parse(aff).unwrap();
        assert_eq!(data.compound().flag, Some(Flag('X' as u32)));
        assert_eq!(data.compound().min_length, 2);
        assert_eq!(data.compound().max_words, Some(3));
        assert_eq!(data.compound().rules.len(), 1);
    }

    #[test]
    fn unknown_directives_are_ignored() {
        let data = AffixData::parse("LANG en_US\nWORDCHARS 0123456789\n").unwrap();
        assert!(data.suffixes().is_empty());
    }
}

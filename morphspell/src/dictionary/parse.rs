use smol_str::SmolStr;

use super::{Entry, ParseWarning};
use crate::affix::AffixData;
use crate::archive::error::LoadError;
use crate::types::FlagSet;

/// Splits `word[/flags]` at the first unescaped slash, unescaping `\/`.
fn split_word(field: &str) -> (String, Option<&str>) {
    let mut word = String::with_capacity(field.len());
    let mut chars = field.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        match ch {
            '\\' if matches!(chars.peek(), Some((_, '/'))) => {
                word.push('/');
                chars.next();
            }
            '/' if i > 0 => return (word, Some(&field[i + 1..])),
            ch => word.push(ch),
        }
    }

    (word, None)
}

fn is_morph_token(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(a), Some(b), Some(':')) if a != ':' && b != ':'
    )
}

fn parse_line(line: &str, affix: &AffixData) -> Result<Entry, String> {
    let mut fields = line.split_whitespace();
    let head = fields.next().ok_or_else(|| "empty line".to_string())?;
    let rest: Vec<&str> = fields.collect();

    let (word, flags) = split_word(head);
    let word = affix.strip_ignored(&word);
    if word.is_empty() {
        return Err("entry has no word".into());
    }

    let flags = match flags {
        Some(flags) => affix.parse_flag_set(flags)?,
        None => FlagSet::new(),
    };

    let morph = match rest.as_slice() {
        [] => vec![],
        [alias] if !affix.morph_aliases.is_empty() && alias.chars().all(|c| c.is_ascii_digit()) => {
            affix.resolve_morph(&rest)?
        }
        tokens => {
            if let Some(bad) = tokens.iter().find(|t| !is_morph_token(t)) {
                return Err(format!("malformed morphological field `{}`", bad));
            }
            tokens.iter().map(|t| SmolStr::from(*t)).collect()
        }
    };

    Ok(Entry {
        word: word.into(),
        flags,
        morph,
    })
}

pub(super) fn parse_word_list(
    text: &str,
    affix: &AffixData,
) -> Result<(Vec<Entry>, Vec<ParseWarning>), LoadError> {
    let mut entries = vec![];
    let mut warnings = vec![];
    let mut attempted = 0usize;

    for (i, line) in text.lines().enumerate() {
        let number = i + 1;

        if i == 0 {
            let hint = line.trim();
            if hint.parse::<usize>().is_ok() {
                continue;
            }
            log::warn!("line 1: expected an entry count, found `{}`", hint);
        }

        if line.starts_with('\t') || line.trim().is_empty() {
            continue;
        }

        attempted += 1;
        match parse_line(line, affix) {
            Ok(entry) => entries.push(entry),
            Err(reason) => {
                log::warn!("line {}: skipping dictionary entry: {}", number, reason);
                warnings.push(ParseWarning {
                    line: number,
                    reason,
                });
            }
        }
    }

    if entries.is_empty() && attempted > 0 {
        return Err(LoadError::MalformedDictionary(format!(
            "none of {} entries could be read",
            attempted
        )));
    }

    Ok((entries, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Flag;

    #[test]
    fn escaped_slash() {
        assert_eq!(split_word("and\\/or/X"), ("and/or".to_string(), Some("X")));
        assert_eq!(split_word("word"), ("word".to_string(), None));
        assert_eq!(split_word("/"), ("/".to_string(), None));
    }

    #[test]
    fn skips_and_warns() {
        let affix = AffixData::parse("FLAG num\n").unwrap();
        let text = "4\nhello/1\nbroken/x\n\tindented comment\n\nworld po:noun\nodd garbage\n";
        let (entries, warnings) = parse_word_list(text, &affix).unwrap();

        let words: Vec<&str> = entries.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, vec!["hello", "world"]);
        assert!(entries[0].flags.contains(Flag(1)));
        assert_eq!(entries[1].morph, vec![SmolStr::from("po:noun")]);

        let lines: Vec<usize> = warnings.iter().map(|w| w.line).collect();
        assert_eq!(lines, vec![3, 7]);
    }

    #[test]
    fn non_numeric_header_is_an_entry() {
        let affix = AffixData::default();
        let (entries, _) = parse_word_list("first\nsecond\n", &affix).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn all_lines_failing_is_fatal() {
        let affix = AffixData::parse("FLAG long\n").unwrap();
        assert!(matches!(
            parse_word_list("2\na/X\nb/Y\n", &affix),
            Err(LoadError::MalformedDictionary(_))
        ));
    }

    #[test]
    fn morphology_aliases() {
        let affix = AffixData::parse("AM 1\nAM po:noun is:sg\n").unwrap();
        let (entries, _) = parse_word_list("1\ncat 1\n", &affix).unwrap();
        assert_eq!(entries[0].morph.len(), 2);
    }
}

use crate::types::{Flag, FlagType};

/// Decodes a run of flags as written after `/` in dictionaries and affixes.
pub(crate) fn parse_flags(flag_type: FlagType, s: &str) -> Result<Vec<Flag>, String> {
    match flag_type {
        FlagType::Short | FlagType::Utf8 => Ok(s.chars().map(|c| Flag(c as u32)).collect()),
        FlagType::Long => {
            let chars: Vec<char> = s.chars().collect();
            if chars.len() % 2 != 0 {
                return Err(format!("odd number of characters in long flags `{}`", s));
            }

            chars
                .chunks(2)
                .map(|pair| {
                    let (hi, lo) = (pair[0] as u32, pair[1] as u32);
                    if hi > 0xFFFF || lo > 0xFFFF {
                        return Err(format!("long flag `{}{}` out of range", pair[0], pair[1]));
                    }
                    Ok(Flag(hi << 16 | lo))
                })
                .collect()
        }
        FlagType::Numeric => s
            .split(',')
            .map(|n| match n.trim().parse::<u32>() {
                Ok(v) if v > 0 && v <= 65535 => Ok(Flag(v)),
                _ => Err(format!("invalid numeric flag `{}`", n)),
            })
            .collect(),
    }
}

/// Decodes exactly one flag, as used by property directives (`KEEPCASE X`).
pub(crate) fn parse_flag(flag_type: FlagType, s: &str) -> Result<Flag, String> {
    let flags = parse_flags(flag_type, s)?;
    match flags.as_slice() {
        [flag] => Ok(*flag),
        _ => Err(format!("expected a single flag, found `{}`", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_flags() {
        assert_eq!(
            parse_flags(FlagType::Short, "SM").unwrap(),
            vec![Flag('S' as u32), Flag('M' as u32)]
        );
        assert!(parse_flag(FlagType::Short, "SM").is_err());
    }

    #[test]
    fn long_flags() {
        let flags = parse_flags(FlagType::Long, "AaBb").unwrap();
        assert_eq!(flags.len(), 2);
        assert!(parse_flags(FlagType::Long, "AaB").is_err());
    }

    #[test]
    fn numeric_flags() {
        assert_eq!(
            parse_flags(FlagType::Numeric, "1,20,300").unwrap(),
            vec![Flag(1), Flag(20), Flag(300)]
        );
        assert!(parse_flags(FlagType::Numeric, "1,x").is_err());
        assert!(parse_flags(FlagType::Numeric, "70000").is_err());
    }
}

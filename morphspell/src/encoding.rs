//! Character encodings that affix and dictionary sources may declare with `SET`.

use serde::{Deserialize, Serialize};

use crate::archive::error::LoadError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Latin-9 code points that differ from Latin-1.
const LATIN9_OVERRIDES: &[(u8, char)] = &[
    (0xA4, '\u{20AC}'),
    (0xA6, '\u{0160}'),
    (0xA8, '\u{0161}'),
    (0xB4, '\u{017D}'),
    (0xB8, '\u{017E}'),
    (0xBC, '\u{0152}'),
    (0xBD, '\u{0153}'),
    (0xBE, '\u{0178}'),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encoding {
    Utf8,
    Latin1,
    Latin9,
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Utf8
    }
}

impl Encoding {
    pub fn from_label(label: &str) -> Option<Encoding> {
        match label.to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Some(Encoding::Utf8),
            "ISO8859-1" | "ISO-8859-1" | "LATIN1" => Some(Encoding::Latin1),
            "ISO8859-15" | "ISO-8859-15" | "LATIN9" => Some(Encoding::Latin9),
            _ => None,
        }
    }

    /// The canonical name, as written in a `SET` directive.
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Latin1 => "ISO8859-1",
            Encoding::Latin9 => "ISO8859-15",
        }
    }

    /// Number of bytes `s` occupies once encoded.
    pub fn encoded_len(self, s: &str) -> usize {
        match self {
            Encoding::Utf8 => s.len(),
            Encoding::Latin1 | Encoding::Latin9 => s.chars().count(),
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Result<String, LoadError> {
        match self {
            Encoding::Utf8 => {
                let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                match std::str::from_utf8(bytes) {
                    Ok(s) => Ok(s.to_string()),
                    Err(e) => {
                        let valid = &bytes[..e.valid_up_to()];
                        let line = valid.iter().filter(|b| **b == b'\n').count() + 1;
                        Err(LoadError::Decoding {
                            encoding: self.name(),
                            line,
                        })
                    }
                }
            }
            Encoding::Latin1 => Ok(bytes.iter().map(|b| *b as char).collect()),
            Encoding::Latin9 => Ok(bytes
                .iter()
                .map(|b| {
                    LATIN9_OVERRIDES
                        .iter()
                        .find(|(byte, _)| byte == b)
                        .map(|(_, ch)| *ch)
                        .unwrap_or(*b as char)
                })
                .collect()),
        }
    }
}

/// Finds the encoding declared by an affix source before it is decoded.
///
/// `SET` is plain ASCII in every supported encoding, so the raw bytes can be
/// scanned line by line. Sources without a declaration are UTF-8.
pub fn sniff_affix_encoding(bytes: &[u8]) -> Result<Encoding, LoadError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    for line in bytes.split(|b| *b == b'\n') {
        let line = match std::str::from_utf8(line) {
            Ok(line) => line.trim(),
            Err(_) => continue,
        };

        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("SET") {
            continue;
        }

        let label = tokens.next().unwrap_or("");
        return Encoding::from_label(label)
            .ok_or_else(|| LoadError::UnsupportedEncoding(label.to_string()));
    }

    Ok(Encoding::Utf8)
}

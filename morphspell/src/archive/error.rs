//! Errors raised while reading and compiling affix and dictionary sources.
use std::io::Error;
use std::path::PathBuf;

/// Errors that abort opening a session. No partially built session is ever
/// returned alongside one of these.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LoadError {
    /// Error opening or reading a source file
    #[error("I/O error reading '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: Error,
    },

    /// The affix source is malformed; nothing from it is kept
    #[error("Malformed affix data at line {line}: {reason}")]
    MalformedAffixData { line: usize, reason: String },

    /// The dictionary source has no usable entries at all
    #[error("Malformed dictionary: {0}")]
    MalformedDictionary(String),

    /// The `SET` directive names an encoding we cannot decode
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// A source is not valid in its declared encoding
    #[error("Invalid {encoding} data at line {line}")]
    Decoding { encoding: &'static str, line: usize },

    /// A `.hz` source could not be unpacked
    #[error("Failed to read hzip file '{}': {reason}", path.display())]
    Hzip { path: PathBuf, reason: String },
}

impl LoadError {
    pub(crate) fn malformed<S: Into<String>>(line: usize, reason: S) -> LoadError {
        LoadError::MalformedAffixData {
            line,
            reason: reason.into(),
        }
    }
}

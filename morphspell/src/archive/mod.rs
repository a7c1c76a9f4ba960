//! Reading affix and dictionary sources from a filesystem.
//!
//! A source path is read as is when the file exists. Otherwise the same path
//! with an `.hz` extension appended is unpacked with [`hzip`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub mod error;
pub mod hzip;

use self::error::LoadError;
use crate::encoding::{sniff_affix_encoding, Encoding};
use crate::vfs::{File, Filesystem};

/// Decoded affix and dictionary text.
#[derive(Debug, Clone)]
pub struct Sources {
    pub aff: String,
    pub dic: String,
    pub encoding: Encoding,
}

fn hz_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".hz");
    PathBuf::from(name)
}

fn read_file<F: Filesystem>(fs: &F, path: &Path) -> Result<Vec<u8>, LoadError> {
    let io_error = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = fs.open(path).map_err(io_error)?;
    file.read_all().map_err(io_error)
}

/// Raw bytes of the source at `path`, unpacking `<path>.hz` when only the
/// compressed file exists.
pub fn read_source<F: Filesystem>(
    fs: &F,
    path: &Path,
    key: Option<&str>,
) -> Result<Vec<u8>, LoadError> {
    if fs.exists(path) {
        return read_file(fs, path);
    }

    let hz = hz_path(path);
    if fs.exists(&hz) {
        log::debug!("reading compressed source {}", hz.display());
        let data = read_file(fs, &hz)?;
        return hzip::decode(&data, key).map_err(|e| LoadError::Hzip {
            path: hz,
            reason: e.to_string(),
        });
    }

    Err(LoadError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
    })
}

/// Reads both sources, decoding them in the encoding the affix source
/// declares.
pub fn load_sources<F: Filesystem>(
    fs: &F,
    dic_path: &Path,
    aff_path: &Path,
    key: Option<&str>,
) -> Result<Sources, LoadError> {
    let aff = read_source(fs, aff_path, key)?;
    let encoding = sniff_affix_encoding(&aff)?;
    log::debug!("{} declares {}", aff_path.display(), encoding.name());

    let aff = encoding.decode(&aff)?;
    let dic = encoding.decode(&read_source(fs, dic_path, key)?)?;

    Ok(Sources { aff, dic, encoding })
}

/// Reads an additional word list in an already known encoding.
pub fn load_dictionary<F: Filesystem>(
    fs: &F,
    path: &Path,
    encoding: Encoding,
) -> Result<String, LoadError> {
    encoding.decode(&read_source(fs, path, None)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::Fs;

    #[test]
    fn plain_files_win() {
        let dir = tempfile::tempdir().unwrap();
        let aff = dir.path().join("test.aff");
        let dic = dir.path().join("test.dic");
        std::fs::write(&aff, b"SET ISO8859-1\nTRY \xe4a\n").unwrap();
        std::fs::write(&dic, b"1\nK\xe4se\n").unwrap();
        std::fs::write(hz_path(&dic), b"not hzip").unwrap();

        let sources = load_sources(&Fs, &dic, &aff, None).unwrap();
        assert_eq!(sources.encoding, Encoding::Latin1);
        assert_eq!(sources.dic, "1\nKäse\n");
        assert_eq!(sources.aff, "SET ISO8859-1\nTRY äa\n");
    }

    #[test]
    fn falls_back_to_hzip() {
        let dir = tempfile::tempdir().unwrap();
        let dic = dir.path().join("test.dic");
        std::fs::write(
            hz_path(&dic),
            [b"hz0".as_ref(), &[0, 2, b'a', b'b', 1, 0, 0, 0, 1, 0x80, 0x20]].concat(),
        )
        .unwrap();

        assert_eq!(read_source(&Fs, &dic, None).unwrap(), b"abab");
    }

    #[test]
    fn missing_and_broken() {
        let dir = tempfile::tempdir().unwrap();
        let dic = dir.path().join("missing.dic");
        assert!(matches!(
            read_source(&Fs, &dic, None),
            Err(LoadError::Io { .. })
        ));

        std::fs::write(hz_path(&dic), b"hz1\x00").unwrap();
        assert!(matches!(
            read_source(&Fs, &dic, None),
            Err(LoadError::Hzip { .. })
        ));
    }
}

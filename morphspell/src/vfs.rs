use std::fmt::Debug;
use std::io::{Read, Result};
use std::path::Path;

pub trait Filesystem {
    type File: File;

    fn open<P: AsRef<Path>>(&self, path: P) -> Result<Self::File>;
    fn exists<P: AsRef<Path>>(&self, path: P) -> bool;
}

pub trait File: Read + Debug {
    fn len(&self) -> Result<u64>;

    /// Reads the whole file from its current position.
    fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.len().unwrap_or(0) as usize);
        self.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl File for std::fs::File {
    fn len(&self) -> Result<u64> {
        self.metadata().map(|m| m.len())
    }
}

pub struct Fs;

impl Filesystem for Fs {
    type File = std::fs::File;

    #[inline(always)]
    fn open<P: AsRef<Path>>(&self, path: P) -> Result<Self::File> {
        std::fs::File::open(&path)
    }

    #[inline(always)]
    fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        path.as_ref().is_file()
    }
}

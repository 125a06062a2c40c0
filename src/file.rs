//! Objects read from files.

use std::{fs, io};
use std::path::{Path, PathBuf};
use bytes::Bytes;
use log::debug;


//------------ FileContents --------------------------------------------------

/// The complete contents of a file kept in memory.
#[derive(Clone, Debug)]
pub struct FileContents {
    path: PathBuf,
    data: Bytes,
}

impl FileContents {
    /// Reads the file at `path` into memory.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let path = path.as_ref();
        debug!("Reading {}", path.display());
        let data = fs::read(path)?;
        Ok(FileContents { path: path.into(), data: data.into() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_slice(&self) -> &[u8] {
        self.data.as_ref()
    }
}

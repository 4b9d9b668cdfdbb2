//! Assembled OOXML package.
//!
//! A package is an ordered map of part names to bytes, written out as a ZIP
//! archive. Parts are held in a `BTreeMap` so archive member order is
//! deterministic for a given workbook.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Default)]
pub struct Package {
    parts: BTreeMap<String, Vec<u8>>,
}

impl Package {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, bytes: Vec<u8>) {
        self.parts.insert(name, bytes);
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(Vec::as_slice)
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Write the package to any sink as a deflate-compressed ZIP archive.
    pub fn write_to<W: Write>(&self, mut w: W) -> Result<(), PackageError> {
        let cursor = Cursor::new(Vec::new());
        let mut zip = zip::ZipWriter::new(cursor);
        let options = zip::write::FileOptions::<()>::default()
            .compression_method(zip::CompressionMethod::Deflated);

        for (name, bytes) in &self.parts {
            zip.start_file(name, options)?;
            zip.write_all(bytes)?;
        }

        let cursor = zip.finish()?;
        w.write_all(&cursor.into_inner())?;
        Ok(())
    }

    pub fn write_to_bytes(&self) -> Result<Vec<u8>, PackageError> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Write the package to `path`, typically an `.xlsx` file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), PackageError> {
        let file = File::create(path)?;
        self.write_to(file)
    }
}

//! Snapshot archive reader with streaming gzip decompression.
//!
//! A snapshot archive is a gzip-compressed tar of per-table JSON files.
//! Entries are demultiplexed strictly in archive order; order is
//! significant because it determines peer boundaries downstream.

use crate::error::{Error, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

type GzFile = GzDecoder<BufReader<File>>;

/// Streaming reader over a snapshot archive.
pub struct ArchiveReader {
    path: PathBuf,
    archive: tar::Archive<GzFile>,
}

impl ArchiveReader {
    /// Open an archive for reading. Only prepares the streaming pipeline;
    /// no entry is read until iteration.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| Error::Access {
            path: path.clone(),
            source,
        })?;
        let decoder = GzDecoder::new(BufReader::new(file));
        Ok(Self {
            path,
            archive: tar::Archive::new(decoder),
        })
    }

    /// Start iterating entries in archive order.
    pub fn entries(&mut self) -> Result<ArchiveEntries<'_>> {
        let path = self.path.clone();
        let inner = self.archive.entries().map_err(|e| Error::Corrupt {
            context: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(ArchiveEntries { path, inner })
    }
}

/// Sequential cursor over an archive's regular-file entries.
pub struct ArchiveEntries<'a> {
    path: PathBuf,
    inner: tar::Entries<'a, GzFile>,
}

impl<'a> ArchiveEntries<'a> {
    /// Advance to the next regular-file entry.
    ///
    /// Directory entries are skipped silently; any other entry type is a
    /// fatal format error. `Ok(None)` marks the end of the archive.
    pub fn next_file(&mut self) -> Result<Option<ArchiveEntry<'a>>> {
        loop {
            let Some(entry) = self.inner.next() else {
                return Ok(None);
            };
            let entry = entry.map_err(|e| Error::Corrupt {
                context: self.path.display().to_string(),
                reason: e.to_string(),
            })?;

            let name = entry
                .path()
                .map_err(|e| Error::Corrupt {
                    context: self.path.display().to_string(),
                    reason: e.to_string(),
                })?
                .to_string_lossy()
                .into_owned();

            let entry_type = entry.header().entry_type();
            if entry_type.is_dir() {
                continue;
            }
            if !entry_type.is_file() {
                return Err(Error::UnsupportedEntryType {
                    entry: name,
                    type_code: entry_type.as_byte(),
                });
            }

            let size = entry.header().size().map_err(|e| Error::Corrupt {
                context: name.clone(),
                reason: e.to_string(),
            })?;
            return Ok(Some(ArchiveEntry { name, size, entry }));
        }
    }
}

/// One regular-file entry: its name, declared byte length and content
/// stream. Must be fully consumed before the cursor advances.
pub struct ArchiveEntry<'a> {
    name: String,
    size: u64,
    entry: tar::Entry<'a, GzFile>,
}

impl ArchiveEntry<'_> {
    /// Full entry name inside the archive.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared byte length from the entry header.
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Read for ArchiveEntry<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.entry.read(buf)
    }
}

impl std::fmt::Debug for ArchiveReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveReader")
            .field("path", &self.path)
            .finish()
    }
}

impl std::fmt::Debug for ArchiveEntry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveEntry")
            .field("name", &self.name)
            .field("size", &self.size)
            .finish()
    }
}

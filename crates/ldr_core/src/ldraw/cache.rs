//! Per-import cache of parsed files.
//!
//! A model usually names the same few hundred files thousands of times. Each
//! distinct canonical filename is resolved and parsed at most once; failures
//! are remembered as well so that a missing file is only searched for once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::ldraw::encoding::{decode_text, TextEncoding};
use crate::ldraw::parser::PartParser;
use crate::ldraw::resolver::{canonical_name, SearchPaths};
use crate::ldraw::types::ParsedPart;

/// Why a referenced file could not be provided.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PartError {
    #[error("'{0}' was not found in any search directory")]
    NotFound(String),

    #[error("failed to read '{name}' from {path:?}: {message}")]
    Unreadable {
        name: String,
        path: PathBuf,
        message: String,
    },
}

impl PartError {
    /// The referenced name the error is about.
    pub fn name(&self) -> &str {
        match self {
            PartError::NotFound(name) => name,
            PartError::Unreadable { name, .. } => name,
        }
    }
}

#[derive(Debug)]
enum CacheEntry {
    Parsed(Arc<ParsedPart>),
    Failed(PartError),
}

/// Filename-keyed memo of [`ParsedPart`]s for one import.
#[derive(Debug)]
pub struct PartCache {
    search_paths: SearchPaths,
    entries: HashMap<String, CacheEntry>,
    files_read: usize,
}

impl PartCache {
    pub fn new(search_paths: SearchPaths) -> Self {
        Self {
            search_paths,
            entries: HashMap::new(),
            files_read: 0,
        }
    }

    /// Return the parsed file for `name`, reading it on first use.
    ///
    /// Entries are keyed by the canonical name, which keeps its case. Two
    /// spellings that differ only in case (`3001.DAT`, `3001.dat`) may
    /// resolve to the same file but get separate entries, so that file is
    /// read and parsed once per spelling.
    pub fn get_or_parse(&mut self, name: &str) -> Result<Arc<ParsedPart>, PartError> {
        let key = canonical_name(name);

        if let Some(entry) = self.entries.get(&key) {
            return match entry {
                CacheEntry::Parsed(part) => Ok(Arc::clone(part)),
                CacheEntry::Failed(err) => Err(err.clone()),
            };
        }

        let result = match self.search_paths.resolve(&key) {
            Some(path) => self.read_and_parse(&key, &path),
            None => Err(PartError::NotFound(key.clone())),
        };

        let entry = match &result {
            Ok(part) => CacheEntry::Parsed(Arc::clone(part)),
            Err(err) => CacheEntry::Failed(err.clone()),
        };
        self.entries.insert(key, entry);
        result
    }

    /// Parse a file given by path and register it under its file name.
    ///
    /// Used for the root model, which is named by path rather than found
    /// through the search directories.
    pub fn insert_path(&mut self, path: &Path) -> std::io::Result<Arc<ParsedPart>> {
        let key = path
            .file_name()
            .map(|n| canonical_name(&n.to_string_lossy()))
            .unwrap_or_else(|| canonical_name(&path.to_string_lossy()));

        let bytes = std::fs::read(path)?;
        self.files_read += 1;
        let part = Arc::new(Self::parse_bytes(&key, path, &bytes));
        self.entries.insert(key, CacheEntry::Parsed(Arc::clone(&part)));
        Ok(part)
    }

    /// Register already-loaded text under `name`.
    pub fn insert_source(&mut self, name: &str, content: &str) -> Arc<ParsedPart> {
        let key = canonical_name(name);
        let part = Arc::new(PartParser::new(key.clone(), PathBuf::from(&key), content).parse());
        self.entries.insert(key, CacheEntry::Parsed(Arc::clone(&part)));
        part
    }

    fn read_and_parse(&mut self, key: &str, path: &Path) -> Result<Arc<ParsedPart>, PartError> {
        let bytes = std::fs::read(path).map_err(|e| PartError::Unreadable {
            name: key.to_string(),
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        self.files_read += 1;
        Ok(Arc::new(Self::parse_bytes(key, path, &bytes)))
    }

    fn parse_bytes(key: &str, path: &Path, bytes: &[u8]) -> ParsedPart {
        let (text, encoding) = decode_text(bytes);
        if encoding != TextEncoding::Utf8 {
            log::debug!("Read {:?} as {}", path, encoding);
        }
        PartParser::new(key, path, &text).parse()
    }

    /// Number of files actually read from disk.
    pub fn files_read(&self) -> usize {
        self.files_read
    }

    /// Number of distinct names looked up, including failures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Newline-delimited URL files
//!
//! One URL per line, appended and flushed as each URL is discovered.

use crate::state::DiscoveredUrls;
use crate::storage::traits::{StorageError, StorageResult, UrlSink};
use async_trait::async_trait;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Append-only writer for a category's URL file
#[derive(Debug)]
pub struct UrlFile {
    path: PathBuf,
    file: File,
    written: usize,
}

impl UrlFile {
    /// Creates (or truncates) the file, creating parent directories as needed
    pub fn create(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| file_error(parent, source))?;
        }

        let file = File::create(path).map_err(|source| file_error(path, source))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            written: 0,
        })
    }

    /// Opens an existing file for appending, creating it if absent
    pub fn append(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| file_error(path, source))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            written: 0,
        })
    }

    /// Appends one URL and flushes it to the OS
    pub fn write_url(&mut self, url: &str) -> StorageResult<()> {
        writeln!(self.file, "{}", url)
            .and_then(|_| self.file.flush())
            .map_err(|source| file_error(&self.path, source))?;
        self.written += 1;
        Ok(())
    }

    /// Number of URLs written through this handle
    pub fn written(&self) -> usize {
        self.written
    }
}

#[async_trait]
impl UrlSink for UrlFile {
    async fn record(&mut self, url: &str) -> StorageResult<()> {
        self.write_url(url)
    }
}

/// Loads a previously persisted URL file
///
/// Lines are trimmed, blank lines skipped and duplicates dropped, keeping
/// first-seen order.
pub fn load_urls(path: &Path) -> StorageResult<DiscoveredUrls> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StorageError::UrlFileMissing(path.to_path_buf()))
        }
        Err(source) => return Err(file_error(path, source)),
    };

    let mut urls = DiscoveredUrls::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| file_error(path, source))?;
        let url = line.trim();
        if !url.is_empty() {
            urls.insert(url);
        }
    }

    tracing::debug!("Loaded {} URLs from {}", urls.len(), path.display());
    Ok(urls)
}

fn file_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::File {
        path: path.to_path_buf(),
        source,
    }
}

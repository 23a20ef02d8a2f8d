use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::{RaidSheetsError, Result};

/// Location of the id file, relative to the working directory.
pub const DEFAULT_ID_FILE: &str = "resources/spreadsheet_id.txt";

/// Local file holding the id of the spreadsheet owned by this installation.
///
/// The file is the only record of which spreadsheet to write to. Runs against
/// the same file are not synchronized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetIdStore {
    path: PathBuf,
}

impl Default for SpreadsheetIdStore {
    fn default() -> Self {
        Self::new(DEFAULT_ID_FILE)
    }
}

impl SpreadsheetIdStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SpreadsheetIdStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, action: &'static str, source: io::Error) -> RaidSheetsError {
        RaidSheetsError::IdFile {
            action,
            path: self.path.clone(),
            source,
        }
    }

    fn ensure_parent(&self) -> Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
                .map_err(|e| self.io_error("creating the directory of", e)),
            _ => Ok(()),
        }
    }

    /// Create the file with no content.
    ///
    /// Errors if the file already exists.
    pub fn create_empty(&self) -> Result<()> {
        info!(path = %self.path.display(), "creating new local file");
        self.ensure_parent()?;
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .map_err(|e| self.io_error("creating", e))?;
        Ok(())
    }

    /// Read the first line of the file.
    ///
    /// Returns `None` if the file does not exist. An empty file reads as an
    /// empty id.
    pub fn read(&self) -> Result<Option<String>> {
        info!(path = %self.path.display(), "retrieving spreadsheet ID from file");
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content.lines().next().unwrap_or("").to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error("reading", e)),
        }
    }

    /// Replace the content of the file with exactly `id`.
    pub fn write(&self, id: &str) -> Result<()> {
        info!(path = %self.path.display(), "writing spreadsheet ID to file");
        self.ensure_parent()?;
        fs::write(&self.path, id).map_err(|e| self.io_error("writing", e))
    }
}

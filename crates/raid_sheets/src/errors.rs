use std::path::PathBuf;

use sheets_client::errors::SheetsError;

#[derive(Debug, thiserror::Error)]
pub enum RaidSheetsError {
    #[error(
        "Error occurred when {action} spreadsheet ID file \"{}\". Operation will be aborted.",
        .path.display()
    )]
    IdFile {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read raid data from \"{}\": {source}", .path.display())]
    DataFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid raid data in \"{}\": {source}", .path.display())]
    InvalidData {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Spreadsheet request failed: {0}")]
    Sheets(#[from] SheetsError),
}

pub type Result<T, E = RaidSheetsError> = std::result::Result<T, E>;

//! Thin client for the parts of Google Sheets and Drive needed to publish
//! tabular data: spreadsheet creation, value writes and basic formatting.
use async_trait::async_trait;

use crate::errors::Result;
use crate::model::{
    AppendValuesResponse, BatchUpdateResponse, CellValue, Request, SheetSpec, Spreadsheet,
    UpdateValuesResponse, ValueRange,
};

mod client;

pub mod errors;
pub mod format;
pub mod model;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::client::{
    GoogleClient, GoogleClientBuilder, DEFAULT_DRIVE_BASE_URL, DEFAULT_SHEETS_BASE_URL,
};

/// Remote spreadsheet operations.
///
/// Every method is a single remote call. Nothing is buffered or retried.
#[async_trait]
pub trait SheetsApi: Sync + Send {
    /// Create a spreadsheet with one tab per `SheetSpec`, returning the created
    /// resource including its assigned id.
    async fn create_spreadsheet(&self, title: &str, sheets: &[SheetSpec]) -> Result<Spreadsheet>;

    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet>;

    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange>;

    /// Overwrite `range` with literal values.
    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<CellValue>],
    ) -> Result<UpdateValuesResponse>;

    /// Append rows after the existing content of the table found in `range`.
    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<CellValue>],
    ) -> Result<AppendValuesResponse>;

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchUpdateResponse>;
}

/// Remote file lookups.
#[async_trait]
pub trait DriveApi: Sync + Send {
    /// Check if a file with the given id exists.
    ///
    /// A "not found" response maps to `false`, every other failure is
    /// returned as an error.
    async fn file_exists(&self, file_id: &str) -> Result<bool>;
}

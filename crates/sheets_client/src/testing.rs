//! In-memory stand-in for the remote APIs.
//!
//! Keeps just enough state to answer reads consistently with earlier writes,
//! and records every call so tests can assert on the exact traffic.
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;

use crate::errors::{Result, SheetsError};
use crate::model::{
    AppendValuesResponse, BandedRange, BatchUpdateResponse, CellValue, Request, Row, Sheet,
    SheetProperties, SheetSpec, Spreadsheet, SpreadsheetProperties, UpdateValuesResponse,
    ValueRange,
};
use crate::{DriveApi, SheetsApi};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateSpreadsheet {
        title: String,
        sheets: Vec<SheetSpec>,
    },
    GetSpreadsheet {
        spreadsheet_id: String,
    },
    GetValues {
        spreadsheet_id: String,
        range: String,
    },
    UpdateValues {
        spreadsheet_id: String,
        range: String,
        rows: Vec<Row>,
    },
    AppendValues {
        spreadsheet_id: String,
        range: String,
        rows: Vec<Row>,
    },
    BatchUpdate {
        spreadsheet_id: String,
        requests: Vec<Request>,
    },
    FileExists {
        file_id: String,
    },
}

impl Call {
    pub fn name(&self) -> &'static str {
        match self {
            Call::CreateSpreadsheet { .. } => "create_spreadsheet",
            Call::GetSpreadsheet { .. } => "get_spreadsheet",
            Call::GetValues { .. } => "get_values",
            Call::UpdateValues { .. } => "update_values",
            Call::AppendValues { .. } => "append_values",
            Call::BatchUpdate { .. } => "batch_update",
            Call::FileExists { .. } => "file_exists",
        }
    }
}

#[derive(Debug, Default)]
struct State {
    spreadsheets: HashMap<String, Spreadsheet>,
    /// Keyed by (spreadsheet id, sheet title).
    values: HashMap<(String, String), Vec<Row>>,
    calls: Vec<Call>,
    failing: Option<&'static str>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct FakeGoogle {
    state: Mutex<State>,
}

/// Sheet title part of an A1 range reference.
fn sheet_title(range: &str) -> String {
    let title = range.split_once('!').map(|(title, _)| title).unwrap_or(range);
    title.trim_matches('\'').to_string()
}

fn not_found(what: &str) -> SheetsError {
    SheetsError::HttpError {
        status: StatusCode::NOT_FOUND,
        message: format!("{what} not found"),
    }
}

impl FakeGoogle {
    /// Make every subsequent call to the named operation fail with an
    /// internal server error.
    pub fn fail_on(&self, operation: &'static str) {
        self.state.lock().failing = Some(operation);
    }

    /// Register a spreadsheet exactly as the API would return it.
    pub fn insert_raw_spreadsheet(&self, spreadsheet: Spreadsheet) {
        let id = spreadsheet.spreadsheet_id.clone().unwrap_or_default();
        self.state.lock().spreadsheets.insert(id, spreadsheet);
    }

    /// Register a spreadsheet as if it had been created by an earlier run.
    pub fn insert_spreadsheet(&self, spreadsheet_id: &str, sheets: &[SheetSpec]) {
        let mut state = self.state.lock();
        let sheets = sheets
            .iter()
            .enumerate()
            .map(|(idx, spec)| {
                let mut sheet = spec.to_sheet();
                sheet.properties.sheet_id = Some(state.next_id());
                sheet.properties.index = Some(idx as i64);
                sheet
            })
            .collect();
        state.spreadsheets.insert(
            spreadsheet_id.to_string(),
            Spreadsheet {
                spreadsheet_id: Some(spreadsheet_id.to_string()),
                properties: SpreadsheetProperties {
                    title: Some("existing".to_string()),
                },
                sheets,
                spreadsheet_url: None,
            },
        );
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.state.lock().calls.iter().map(Call::name).collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// All batch update requests in call order.
    pub fn batch_requests(&self) -> Vec<Request> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::BatchUpdate { requests, .. } => Some(requests.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn spreadsheet(&self, spreadsheet_id: &str) -> Option<Spreadsheet> {
        self.state.lock().spreadsheets.get(spreadsheet_id).cloned()
    }

    pub fn spreadsheet_count(&self) -> usize {
        self.state.lock().spreadsheets.len()
    }

    pub fn sheet_id_at(&self, spreadsheet_id: &str, index: usize) -> Option<i64> {
        self.spreadsheet(spreadsheet_id)?
            .sheet(index)?
            .properties
            .sheet_id
    }

    /// Current content of a sheet.
    pub fn sheet_values(&self, spreadsheet_id: &str, title: &str) -> Vec<Row> {
        self.state
            .lock()
            .values
            .get(&(spreadsheet_id.to_string(), title.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, call: Call) -> Result<()> {
        let mut state = self.state.lock();
        let name = call.name();
        state.calls.push(call);
        if state.failing == Some(name) {
            return Err(SheetsError::HttpError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: format!("{name} failed"),
            });
        }
        Ok(())
    }

    fn sheet_mut<'a>(
        spreadsheet: &'a mut Spreadsheet,
        sheet_id: i64,
    ) -> Option<&'a mut Sheet> {
        spreadsheet
            .sheets
            .iter_mut()
            .find(|sheet| sheet.properties.id() == sheet_id)
    }
}

#[async_trait]
impl SheetsApi for FakeGoogle {
    async fn create_spreadsheet(&self, title: &str, sheets: &[SheetSpec]) -> Result<Spreadsheet> {
        self.record(Call::CreateSpreadsheet {
            title: title.to_string(),
            sheets: sheets.to_vec(),
        })?;

        let mut state = self.state.lock();
        let id = format!("spreadsheet-{}", state.next_id());
        let sheets = sheets
            .iter()
            .enumerate()
            .map(|(idx, spec)| {
                let mut sheet = spec.to_sheet();
                sheet.properties = SheetProperties {
                    sheet_id: Some(state.next_id()),
                    index: Some(idx as i64),
                    ..sheet.properties
                };
                sheet
            })
            .collect();
        let spreadsheet = Spreadsheet {
            spreadsheet_id: Some(id.clone()),
            properties: SpreadsheetProperties {
                title: Some(title.to_string()),
            },
            sheets,
            spreadsheet_url: Some(format!("https://docs.google.com/spreadsheets/d/{id}")),
        };
        state.spreadsheets.insert(id, spreadsheet.clone());
        Ok(spreadsheet)
    }

    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet> {
        self.record(Call::GetSpreadsheet {
            spreadsheet_id: spreadsheet_id.to_string(),
        })?;
        self.spreadsheet(spreadsheet_id)
            .ok_or_else(|| not_found("spreadsheet"))
    }

    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange> {
        self.record(Call::GetValues {
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.to_string(),
        })?;
        if self.spreadsheet(spreadsheet_id).is_none() {
            return Err(not_found("spreadsheet"));
        }
        Ok(ValueRange {
            range: Some(range.to_string()),
            major_dimension: Some("ROWS".to_string()),
            values: self.sheet_values(spreadsheet_id, &sheet_title(range)),
        })
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<CellValue>],
    ) -> Result<UpdateValuesResponse> {
        self.record(Call::UpdateValues {
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.to_string(),
            rows: rows.to_vec(),
        })?;

        let mut state = self.state.lock();
        if !state.spreadsheets.contains_key(spreadsheet_id) {
            return Err(not_found("spreadsheet"));
        }
        // Overwrites from the first row, rows past the written block stay.
        let existing = state
            .values
            .entry((spreadsheet_id.to_string(), sheet_title(range)))
            .or_default();
        for (idx, row) in rows.iter().enumerate() {
            match existing.get_mut(idx) {
                Some(slot) => *slot = row.clone(),
                None => existing.push(row.clone()),
            }
        }

        Ok(UpdateValuesResponse {
            spreadsheet_id: Some(spreadsheet_id.to_string()),
            updated_range: Some(range.to_string()),
            updated_rows: Some(rows.len() as i64),
            updated_columns: rows.iter().map(|r| r.len() as i64).max(),
            updated_cells: Some(rows.iter().map(|r| r.len() as i64).sum()),
        })
    }

    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<CellValue>],
    ) -> Result<AppendValuesResponse> {
        self.record(Call::AppendValues {
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.to_string(),
            rows: rows.to_vec(),
        })?;

        let mut state = self.state.lock();
        if !state.spreadsheets.contains_key(spreadsheet_id) {
            return Err(not_found("spreadsheet"));
        }
        state
            .values
            .entry((spreadsheet_id.to_string(), sheet_title(range)))
            .or_default()
            .extend(rows.iter().cloned());

        Ok(AppendValuesResponse {
            spreadsheet_id: Some(spreadsheet_id.to_string()),
            table_range: Some(range.to_string()),
            updates: None,
        })
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchUpdateResponse> {
        self.record(Call::BatchUpdate {
            spreadsheet_id: spreadsheet_id.to_string(),
            requests: requests.clone(),
        })?;

        let mut state = self.state.lock();
        let next_id = state.next_id();
        let spreadsheet = state
            .spreadsheets
            .get_mut(spreadsheet_id)
            .ok_or_else(|| not_found("spreadsheet"))?;

        for request in requests {
            match request {
                Request::AddBanding { banded_range } => {
                    let sheet = Self::sheet_mut(spreadsheet, banded_range.range.sheet_id)
                        .ok_or_else(|| not_found("sheet"))?;
                    sheet.banded_ranges.push(BandedRange {
                        banded_range_id: Some(next_id),
                        ..banded_range
                    });
                }
                Request::UpdateBanding { banded_range, .. } => {
                    let sheet = Self::sheet_mut(spreadsheet, banded_range.range.sheet_id)
                        .ok_or_else(|| not_found("sheet"))?;
                    let slot = sheet
                        .banded_ranges
                        .iter_mut()
                        .find(|existing| existing.banded_range_id == banded_range.banded_range_id)
                        .ok_or_else(|| not_found("banded range"))?;
                    *slot = banded_range;
                }
                Request::RepeatCell { range, .. } => {
                    Self::sheet_mut(spreadsheet, range.sheet_id)
                        .ok_or_else(|| not_found("sheet"))?;
                }
                Request::UpdateSpreadsheetProperties { properties, .. } => {
                    if properties.title.is_some() {
                        spreadsheet.properties.title = properties.title;
                    }
                }
            }
        }

        Ok(BatchUpdateResponse {
            spreadsheet_id: Some(spreadsheet_id.to_string()),
            replies: Vec::new(),
        })
    }
}

#[async_trait]
impl DriveApi for FakeGoogle {
    async fn file_exists(&self, file_id: &str) -> Result<bool> {
        self.record(Call::FileExists {
            file_id: file_id.to_string(),
        })?;
        Ok(self.spreadsheet(file_id).is_some())
    }
}

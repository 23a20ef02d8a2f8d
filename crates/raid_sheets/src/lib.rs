//! Publishes champion and skill data of RAID: Shadow Legends to a Google
//! spreadsheet owned by the local installation.
pub mod data;
pub mod errors;
pub mod id_store;
pub mod records;
pub mod sheet;
pub mod spreadsheet;

pub use crate::errors::{RaidSheetsError, Result};
pub use crate::id_store::{SpreadsheetIdStore, DEFAULT_ID_FILE};
pub use crate::spreadsheet::{InitState, RaidSpreadsheet};

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::errors::{RaidSheetsError, Result};
use crate::records::{Champion, Skill};

/// Champion and skill records to publish, as read from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RaidData {
    #[serde(default)]
    pub champions: Vec<Champion>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl RaidData {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| RaidSheetsError::DataFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| RaidSheetsError::InvalidData {
            path: path.to_path_buf(),
            source,
        })
    }
}

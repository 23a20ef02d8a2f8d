#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlParseError(String),

    #[error("Access token is not a valid header value")]
    InvalidAccessToken,

    #[error("Request errored with status code {status}: {message}")]
    HttpError {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Spreadsheet has no sheet at index {0}")]
    MissingSheet(usize),

    #[error("Sheet at index {0} has no banded range")]
    MissingBandedRange(usize),

    #[error("Create response did not contain a spreadsheet id")]
    MissingSpreadsheetId,
}

pub type Result<T, E = SheetsError> = std::result::Result<T, E>;

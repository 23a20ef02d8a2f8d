use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    Client, IntoUrl, RequestBuilder, StatusCode, Url,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, trace};

use crate::errors::{Result, SheetsError};
use crate::model::{
    AppendValuesResponse, BatchUpdateRequest, BatchUpdateResponse, CellValue, ErrorEnvelope,
    Request, SheetSpec, Spreadsheet, SpreadsheetProperties, UpdateValuesResponse, ValueRange,
};
use crate::{DriveApi, SheetsApi};

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const REQ_ACCEPT: &str = "application/json";

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/";
pub const DEFAULT_DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3/";

/// Values are written as-is, formulas are not evaluated.
const VALUE_INPUT_OPTION: &str = "RAW";

#[derive(Debug, Default)]
pub struct GoogleClientBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    sheets_base_url: Option<String>,
    drive_base_url: Option<String>,
}

impl GoogleClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = Some(connect_timeout);
        self
    }

    pub fn sheets_base_url(mut self, url: impl Into<String>) -> Self {
        self.sheets_base_url = Some(url.into());
        self
    }

    pub fn drive_base_url(mut self, url: impl Into<String>) -> Self {
        self.drive_base_url = Some(url.into());
        self
    }

    /// Build a client authenticating every request with `access_token`.
    pub fn build(self, access_token: &str) -> Result<GoogleClient> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .map_err(|_| SheetsError::InvalidAccessToken)?;
        auth.set_sensitive(true);

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static(REQ_ACCEPT));
        default_headers.insert(AUTHORIZATION, auth);

        let mut builder = Client::builder()
            .user_agent(APP_USER_AGENT)
            .default_headers(default_headers);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        let client = builder.build()?;
        Ok(GoogleClient {
            sheets_base_url: parse_base_url(
                self.sheets_base_url.as_deref().unwrap_or(DEFAULT_SHEETS_BASE_URL),
            )?,
            drive_base_url: parse_base_url(
                self.drive_base_url.as_deref().unwrap_or(DEFAULT_DRIVE_BASE_URL),
            )?,
            inner: client,
        })
    }
}

fn parse_base_url<U: IntoUrl>(url: U) -> Result<Url> {
    url.into_url()
        // The URL crate we use is from the "reqwest" crate which doesn't
        // expose the error and hence we cast it to a string.
        .map_err(|e| SheetsError::UrlParseError(format!("{e}")))
}

/// Append path segments to a base url, percent-encoding each one.
///
/// Range references such as `Champions!A2:Z` are kept as a single segment.
pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SheetsError::UrlParseError(format!("cannot be a base url: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// HTTP client for the Sheets v4 and Drive v3 REST APIs.
#[derive(Debug, Clone)]
pub struct GoogleClient {
    sheets_base_url: Url,
    drive_base_url: Url,
    inner: Client,
}

impl GoogleClient {
    pub fn builder() -> GoogleClientBuilder {
        GoogleClientBuilder::default()
    }

    fn sheets_url(&self, segments: &[&str]) -> Result<Url> {
        join_segments(&self.sheets_base_url, segments)
    }

    async fn execute<R>(&self, req: RequestBuilder) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let res = req.send().await?;
        let status = res.status();
        let body = res.text().await?;
        trace!(%status, %body, "response");

        if !status.is_success() {
            return Err(http_error(status, &body));
        }

        let res: R = serde_json::from_str(&body)?;
        Ok(res)
    }

    async fn execute_json<B, R>(&self, req: RequestBuilder, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute(req.json(body)).await
    }
}

fn http_error(status: StatusCode, body: &str) -> SheetsError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|env| env.error.message)
        .unwrap_or_else(|_| body.to_string());
    SheetsError::HttpError { status, message }
}

/// Borrowed request body for value writes.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeBody<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: &'a [Vec<CellValue>],
}

#[async_trait]
impl SheetsApi for GoogleClient {
    async fn create_spreadsheet(&self, title: &str, sheets: &[SheetSpec]) -> Result<Spreadsheet> {
        debug!(%title, sheets = sheets.len(), "creating spreadsheet");
        let body = Spreadsheet {
            properties: SpreadsheetProperties {
                title: Some(title.to_string()),
            },
            sheets: sheets.iter().map(SheetSpec::to_sheet).collect(),
            ..Default::default()
        };
        let url = self.sheets_url(&["spreadsheets"])?;
        self.execute_json(self.inner.post(url), &body).await
    }

    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet> {
        let url = self.sheets_url(&["spreadsheets", spreadsheet_id])?;
        self.execute(self.inner.get(url)).await
    }

    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange> {
        let url = self.sheets_url(&["spreadsheets", spreadsheet_id, "values", range])?;
        self.execute(self.inner.get(url)).await
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<CellValue>],
    ) -> Result<UpdateValuesResponse> {
        debug!(%range, rows = rows.len(), "updating values");
        let url = self.sheets_url(&["spreadsheets", spreadsheet_id, "values", range])?;
        let req = self
            .inner
            .put(url)
            .query(&[("valueInputOption", VALUE_INPUT_OPTION)]);
        let body = ValueRangeBody {
            range,
            major_dimension: "ROWS",
            values: rows,
        };
        self.execute_json(req, &body).await
    }

    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<CellValue>],
    ) -> Result<AppendValuesResponse> {
        debug!(%range, rows = rows.len(), "appending values");
        let segment = format!("{range}:append");
        let url = self.sheets_url(&["spreadsheets", spreadsheet_id, "values", &segment])?;
        let req = self
            .inner
            .post(url)
            .query(&[("valueInputOption", VALUE_INPUT_OPTION)]);
        let body = ValueRangeBody {
            range,
            major_dimension: "ROWS",
            values: rows,
        };
        self.execute_json(req, &body).await
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchUpdateResponse> {
        debug!(requests = requests.len(), "batch update");
        let segment = format!("{spreadsheet_id}:batchUpdate");
        let url = self.sheets_url(&["spreadsheets", &segment])?;
        let body = BatchUpdateRequest { requests };
        self.execute_json(self.inner.post(url), &body).await
    }
}

#[async_trait]
impl DriveApi for GoogleClient {
    async fn file_exists(&self, file_id: &str) -> Result<bool> {
        let url = join_segments(&self.drive_base_url, &["files", file_id])?;
        let req = self
            .inner
            .get(url)
            .query(&[("fields", "id"), ("supportsAllDrives", "true")]);

        match self.execute::<serde_json::Value>(req).await {
            Ok(_) => Ok(true),
            Err(SheetsError::HttpError {
                status: StatusCode::NOT_FOUND,
                ..
            }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

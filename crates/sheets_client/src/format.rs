//! Formatting helpers built on top of `batchUpdate`.
//!
//! Sheets are addressed by their position in the spreadsheet, the numeric
//! sheet id is looked up first.
use tracing::info;

use crate::errors::{Result, SheetsError};
use crate::model::{
    BandedRange, BandingProperties, BatchUpdateResponse, CellData, CellFormat, Color, GridRange,
    Request, Sheet, Spreadsheet, SpreadsheetProperties, TextFormat,
};
use crate::SheetsApi;

/// Colors of a banded range, header first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Banding {
    pub header: Color,
    pub first_band: Color,
    pub second_band: Color,
}

impl Banding {
    fn row_properties(&self) -> BandingProperties {
        BandingProperties {
            header_color: Some(self.header),
            first_band_color: Some(self.first_band),
            second_band_color: Some(self.second_band),
        }
    }
}

fn sheet_at(spreadsheet: &Spreadsheet, sheet_index: usize) -> Result<&Sheet> {
    spreadsheet
        .sheet(sheet_index)
        .ok_or(SheetsError::MissingSheet(sheet_index))
}

/// Get the numeric id of the sheet at `sheet_index`.
pub async fn sheet_id<C>(client: &C, spreadsheet_id: &str, sheet_index: usize) -> Result<i64>
where
    C: SheetsApi + ?Sized,
{
    let spreadsheet = client.get_spreadsheet(spreadsheet_id).await?;
    Ok(sheet_at(&spreadsheet, sheet_index)?.properties.id())
}

/// Number of rows holding values in `range`.
pub async fn row_count<C>(client: &C, spreadsheet_id: &str, range: &str) -> Result<i64>
where
    C: SheetsApi + ?Sized,
{
    let values = client.get_values(spreadsheet_id, range).await?;
    Ok(values.values.len() as i64)
}

async fn banded_range<C>(
    client: &C,
    spreadsheet_id: &str,
    sheet: &Sheet,
    range: &str,
    banding: &Banding,
) -> Result<BandedRange>
where
    C: SheetsApi + ?Sized,
{
    Ok(BandedRange {
        banded_range_id: None,
        range: GridRange {
            sheet_id: sheet.properties.id(),
            end_row_index: Some(row_count(client, spreadsheet_id, range).await?),
            ..Default::default()
        },
        row_properties: Some(banding.row_properties()),
    })
}

async fn add_banding_to<C>(
    client: &C,
    spreadsheet_id: &str,
    sheet: &Sheet,
    range: &str,
    banding: &Banding,
) -> Result<BatchUpdateResponse>
where
    C: SheetsApi + ?Sized,
{
    info!(%range, "adding banding to sheet");
    let banded_range = banded_range(client, spreadsheet_id, sheet, range, banding).await?;
    client
        .batch_update(spreadsheet_id, vec![Request::AddBanding { banded_range }])
        .await
}

async fn update_banding_of<C>(
    client: &C,
    spreadsheet_id: &str,
    sheet_index: usize,
    sheet: &Sheet,
    range: &str,
    banding: &Banding,
) -> Result<BatchUpdateResponse>
where
    C: SheetsApi + ?Sized,
{
    info!(%range, "updating banding of sheet");
    let existing_id = sheet
        .banded_ranges
        .first()
        .and_then(|banded| banded.banded_range_id)
        .ok_or(SheetsError::MissingBandedRange(sheet_index))?;

    let mut banded_range = banded_range(client, spreadsheet_id, sheet, range, banding).await?;
    banded_range.banded_range_id = Some(existing_id);

    client
        .batch_update(
            spreadsheet_id,
            vec![Request::UpdateBanding {
                banded_range,
                fields: "*".to_string(),
            }],
        )
        .await
}

/// Add alternating row colors over the rows of `range` currently holding
/// values.
pub async fn add_banding<C>(
    client: &C,
    spreadsheet_id: &str,
    sheet_index: usize,
    range: &str,
    banding: &Banding,
) -> Result<BatchUpdateResponse>
where
    C: SheetsApi + ?Sized,
{
    let spreadsheet = client.get_spreadsheet(spreadsheet_id).await?;
    let sheet = sheet_at(&spreadsheet, sheet_index)?;
    add_banding_to(client, spreadsheet_id, sheet, range, banding).await
}

/// Replace the first banded range of the sheet, resizing it to the rows of
/// `range` currently holding values.
pub async fn update_banding<C>(
    client: &C,
    spreadsheet_id: &str,
    sheet_index: usize,
    range: &str,
    banding: &Banding,
) -> Result<BatchUpdateResponse>
where
    C: SheetsApi + ?Sized,
{
    let spreadsheet = client.get_spreadsheet(spreadsheet_id).await?;
    let sheet = sheet_at(&spreadsheet, sheet_index)?;
    update_banding_of(client, spreadsheet_id, sheet_index, sheet, range, banding).await
}

/// Add banding, or update it if the sheet already has a banded range.
///
/// Adding a second banded range over the same cells is rejected by the API,
/// so repeated runs against the same spreadsheet go through the update path.
pub async fn set_banding<C>(
    client: &C,
    spreadsheet_id: &str,
    sheet_index: usize,
    range: &str,
    banding: &Banding,
) -> Result<BatchUpdateResponse>
where
    C: SheetsApi + ?Sized,
{
    let spreadsheet = client.get_spreadsheet(spreadsheet_id).await?;
    let sheet = sheet_at(&spreadsheet, sheet_index)?;
    let has_banding = sheet
        .banded_ranges
        .iter()
        .any(|banded| banded.banded_range_id.is_some());

    if has_banding {
        update_banding_of(client, spreadsheet_id, sheet_index, sheet, range, banding).await
    } else {
        add_banding_to(client, spreadsheet_id, sheet, range, banding).await
    }
}

/// Make the text of the first row of the sheet bold.
///
/// Only ever touches row 0, headers spanning several rows are not handled.
pub async fn bold_header_row<C>(
    client: &C,
    spreadsheet_id: &str,
    sheet_index: usize,
) -> Result<BatchUpdateResponse>
where
    C: SheetsApi + ?Sized,
{
    info!(sheet_index, "making header row bold");
    let request = Request::RepeatCell {
        range: GridRange {
            sheet_id: sheet_id(client, spreadsheet_id, sheet_index).await?,
            start_row_index: Some(0),
            end_row_index: Some(1),
            ..Default::default()
        },
        cell: CellData {
            user_entered_format: Some(CellFormat {
                text_format: Some(TextFormat { bold: Some(true) }),
            }),
        },
        fields: "*".to_string(),
    };
    client.batch_update(spreadsheet_id, vec![request]).await
}

/// Set the spreadsheet title, leaving every other property untouched.
pub async fn rename_spreadsheet<C>(
    client: &C,
    spreadsheet_id: &str,
    title: &str,
) -> Result<BatchUpdateResponse>
where
    C: SheetsApi + ?Sized,
{
    info!(%title, "renaming spreadsheet");
    let request = Request::UpdateSpreadsheetProperties {
        properties: SpreadsheetProperties {
            title: Some(title.to_string()),
        },
        fields: "title".to_string(),
    };
    client.batch_update(spreadsheet_id, vec![request]).await
}

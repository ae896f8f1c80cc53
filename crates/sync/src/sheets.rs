//! Google Sheets v4 mirror target.
//!
//! Rows are keyed by the issue id in column A. Upsert scans column A for the
//! key and overwrites that row in place, or appends a new row. Delete removes
//! the row with a `deleteDimension` batch update, which needs the numeric
//! sheet id resolved during initialization.
//!
//! Credential minting is out of scope: the client is handed a bearer access
//! token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde_json::{json, Value};
use tokio::sync::OnceCell;

use crate::client::MirrorClient;
use crate::error::SyncError;
use crate::row::{header_row, LAST_COLUMN};

/// Default API root.
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4";

/// HTTP request timeout for a single API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum length of an error body kept in [`SyncError::HttpStatus`].
const MAX_ERROR_BODY: usize = 512;

/// Connection settings for [`SheetsClient`].
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub api_base: String,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub access_token: String,
}

pub struct SheetsClient {
    client: reqwest::Client,
    config: SheetsConfig,
    sheet_id: OnceCell<i64>,
}

impl SheetsClient {
    /// Create a client with a pre-configured HTTP timeout.
    pub fn new(config: SheetsConfig) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            config,
            sheet_id: OnceCell::new(),
        })
    }

    /// A1 range on the configured sheet, e.g. `'Issues'!A:A`.
    ///
    /// The sheet name is always quoted; embedded quotes are doubled.
    fn range(&self, cells: &str) -> String {
        format!("'{}'!{cells}", self.config.sheet_name.replace('\'', "''"))
    }

    /// `{api_base}/spreadsheets/{spreadsheet_id}` followed by `segments`.
    fn url(&self, segments: &[&str]) -> Result<Url, SyncError> {
        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| SyncError::InvalidUrl(format!("{}: {e}", self.config.api_base)))?;
        url.path_segments_mut()
            .map_err(|()| SyncError::InvalidUrl(self.config.api_base.clone()))?
            .pop_if_empty()
            .push("spreadsheets")
            .extend(segments.iter().copied());
        Ok(url)
    }

    fn values_url(&self, range: &str) -> Result<Url, SyncError> {
        self.url(&[&self.config.spreadsheet_id, "values", range])
    }

    fn batch_update_url(&self) -> Result<Url, SyncError> {
        self.url(&[&format!("{}:batchUpdate", self.config.spreadsheet_id)])
    }

    /// Send an authenticated request and decode the JSON reply.
    async fn call(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<Value, SyncError> {
        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(&self.config.access_token)
            .query(query);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(floor_char_boundary(&body, MAX_ERROR_BODY));
            return Err(SyncError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| SyncError::UnexpectedResponse(e.to_string()))
    }

    async fn batch_update(&self, requests: Value) -> Result<Value, SyncError> {
        let url = self.batch_update_url()?;
        self.call(Method::POST, url, &[], Some(json!({ "requests": requests })))
            .await
    }

    /// Look up the numeric id of the configured sheet by title.
    async fn find_sheet_id(&self) -> Result<Option<i64>, SyncError> {
        let url = self.url(&[&self.config.spreadsheet_id])?;
        let reply = self
            .call(
                Method::GET,
                url,
                &[("fields", "sheets.properties(sheetId,title)")],
                None,
            )
            .await?;

        let sheets = reply["sheets"].as_array().cloned().unwrap_or_default();
        Ok(sheets.iter().find_map(|sheet| {
            let props = &sheet["properties"];
            (props["title"].as_str() == Some(self.config.sheet_name.as_str()))
                .then(|| props["sheetId"].as_i64())
                .flatten()
        }))
    }

    async fn add_sheet(&self) -> Result<i64, SyncError> {
        let reply = self
            .batch_update(json!([
                { "addSheet": { "properties": { "title": self.config.sheet_name } } }
            ]))
            .await?;
        reply["replies"][0]["addSheet"]["properties"]["sheetId"]
            .as_i64()
            .ok_or_else(|| SyncError::UnexpectedResponse("addSheet reply without sheetId".into()))
    }

    async fn sheet_id(&self) -> Result<i64, SyncError> {
        self.sheet_id
            .get_or_try_init(|| async {
                self.find_sheet_id().await?.ok_or_else(|| {
                    SyncError::UnexpectedResponse(format!(
                        "sheet '{}' does not exist",
                        self.config.sheet_name
                    ))
                })
            })
            .await
            .copied()
    }

    async fn ensure_header(&self) -> Result<(), SyncError> {
        let range = self.range(&format!("A1:{LAST_COLUMN}1"));
        let reply = self
            .call(Method::GET, self.values_url(&range)?, &[], None)
            .await?;

        let expected = header_row();
        let current: Vec<String> = reply["values"][0]
            .as_array()
            .map(|cells| {
                cells
                    .iter()
                    .map(|c| c.as_str().unwrap_or_default().to_string())
                    .collect()
            })
            .unwrap_or_default();
        if current == expected {
            return Ok(());
        }

        tracing::info!(sheet = %self.config.sheet_name, "Writing mirror header row");
        self.call(
            Method::PUT,
            self.values_url(&range)?,
            &[("valueInputOption", "RAW")],
            Some(json!({ "range": range, "majorDimension": "ROWS", "values": [expected] })),
        )
        .await?;
        Ok(())
    }

    /// 1-based row number holding `id` in column A, skipping the header.
    async fn find_row(&self, id: &str) -> Result<Option<usize>, SyncError> {
        let range = self.range("A:A");
        let reply = self
            .call(Method::GET, self.values_url(&range)?, &[], None)
            .await?;

        let rows = reply["values"].as_array().cloned().unwrap_or_default();
        Ok(rows
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, cells)| cells[0].as_str() == Some(id))
            .map(|(index, _)| index + 1))
    }
}

#[async_trait]
impl MirrorClient for SheetsClient {
    async fn ensure_initialized(&self) -> Result<(), SyncError> {
        let sheet_id = match self.find_sheet_id().await? {
            Some(id) => id,
            None => {
                tracing::info!(sheet = %self.config.sheet_name, "Creating mirror worksheet");
                self.add_sheet().await?
            }
        };
        let _ = self.sheet_id.set(sheet_id);
        self.ensure_header().await
    }

    async fn upsert_row(&self, id: &str, row: &[String]) -> Result<(), SyncError> {
        match self.find_row(id).await? {
            Some(row_number) => {
                let range = self.range(&format!("A{row_number}:{LAST_COLUMN}{row_number}"));
                self.call(
                    Method::PUT,
                    self.values_url(&range)?,
                    &[("valueInputOption", "RAW")],
                    Some(json!({ "range": range, "majorDimension": "ROWS", "values": [row] })),
                )
                .await?;
            }
            None => {
                let range = self.range(&format!("A:{LAST_COLUMN}"));
                let url = self.values_url(&format!("{range}:append"))?;
                self.call(
                    Method::POST,
                    url,
                    &[
                        ("valueInputOption", "RAW"),
                        ("insertDataOption", "INSERT_ROWS"),
                    ],
                    Some(json!({ "majorDimension": "ROWS", "values": [row] })),
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn delete_row(&self, id: &str) -> Result<(), SyncError> {
        let Some(row_number) = self.find_row(id).await? else {
            tracing::debug!(issue_id = id, "Mirror row already absent");
            return Ok(());
        };
        let sheet_id = self.sheet_id().await?;
        self.batch_update(json!([{
            "deleteDimension": {
                "range": {
                    "sheetId": sheet_id,
                    "dimension": "ROWS",
                    "startIndex": row_number - 1,
                    "endIndex": row_number,
                }
            }
        }]))
        .await?;
        Ok(())
    }
}

/// Largest index `<= max` that falls on a char boundary of `s`.
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

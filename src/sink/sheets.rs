//! Google Sheets realization of [RecordSink]. The spreadsheet document is
//! addressed by title, the way the sheet owner sees it, so the document is
//! first resolved to an id through a Drive file query.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::session::SessionRow;

use super::{
    auth::{fetch_access_token, ServiceAccountKey},
    RecordSink, SinkError,
};

/// Document and worksheet the rows land in. The names are part of the
/// contract with whoever reads the sheet.
pub const SPREADSHEET_TITLE: &str = "Effort Logger";
pub const WORKSHEET_TITLE: &str = "Logger";

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

pub struct SheetsSink {
    client: Client,
    credentials_path: PathBuf,
    spreadsheet_title: String,
    worksheet_title: String,
}

impl SheetsSink {
    /// The credential file is only touched once a record is appended, so a
    /// missing or broken key surfaces at the end of the run like every other
    /// sink failure.
    pub fn new(credentials_path: PathBuf) -> Self {
        Self {
            client: Client::new(),
            credentials_path,
            spreadsheet_title: SPREADSHEET_TITLE.to_owned(),
            worksheet_title: WORKSHEET_TITLE.to_owned(),
        }
    }

    /// Resolves the spreadsheet id from the document title.
    async fn resolve_spreadsheet_id(&self, token: &str) -> Result<String, SinkError> {
        #[derive(Deserialize)]
        struct FileList {
            #[serde(default)]
            files: Vec<FileEntry>,
        }
        #[derive(Deserialize)]
        struct FileEntry {
            id: String,
        }

        let query = format!(
            "name = '{}' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false",
            self.spreadsheet_title
        );
        let response = self
            .client
            .get(DRIVE_FILES_URL)
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id)"),
                ("pageSize", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "<no body>".into());
            return Err(SinkError::LookupFailed { status, body });
        }

        let list = response.json::<FileList>().await?;
        list.files
            .into_iter()
            .next()
            .map(|file| file.id)
            .ok_or_else(|| SinkError::SpreadsheetNotFound {
                title: self.spreadsheet_title.clone(),
            })
    }
}

#[async_trait]
impl RecordSink for SheetsSink {
    /// Blocks the event loop for its whole duration; it runs at most once per
    /// run, at the very end, and carries no timeout.
    async fn append(&self, row: SessionRow) -> Result<(), SinkError> {
        #[derive(Serialize)]
        struct AppendRequest<'a> {
            values: [&'a SessionRow; 1],
        }

        let key = ServiceAccountKey::from_file(&self.credentials_path)?;
        let token = fetch_access_token(&self.client, &key, Utc::now().timestamp()).await?;
        let spreadsheet_id = self.resolve_spreadsheet_id(&token).await?;
        info!(
            "Appending session row to {:?}/{:?}",
            self.spreadsheet_title, self.worksheet_title
        );

        let url = format!(
            "{SHEETS_BASE_URL}/{spreadsheet_id}/values/{}:append",
            self.worksheet_title
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&AppendRequest { values: [&row] })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "<no body>".into());
            return Err(SinkError::AppendRejected { status, body });
        }

        info!("Session row appended");
        Ok(())
    }
}

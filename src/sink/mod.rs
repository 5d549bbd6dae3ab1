//! Delivery of finished session rows to the remote store.

pub mod auth;
pub mod sheets;

use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::session::SessionRow;

/// Appends one finished session row as the new last row of the remote
/// worksheet. The row is consumed by value, so a record can only ever be
/// handed over once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordSink {
    async fn append(&self, row: SessionRow) -> Result<(), SinkError>;
}

/// Failure while writing a finished session to the remote store. Nothing is
/// retried or queued; the message is shown to the user together with its
/// cause.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("couldn't read service credentials from {path:?}: {source}")]
    CredentialsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("service credentials at {path:?} are malformed: {source}")]
    CredentialsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("couldn't sign the access token request: {0}")]
    Assertion(#[from] jsonwebtoken::errors::Error),
    #[error("token endpoint rejected the service credentials ({status}): {body}")]
    TokenDenied { status: StatusCode, body: String },
    #[error("spreadsheet lookup failed ({status}): {body}")]
    LookupFailed { status: StatusCode, body: String },
    #[error("no spreadsheet named {title:?} is visible to the service account")]
    SpreadsheetNotFound { title: String },
    #[error("the append request was rejected ({status}): {body}")]
    AppendRejected { status: StatusCode, body: String },
    #[error("request to the remote store failed: {0}")]
    Transport(#[from] reqwest::Error),
}

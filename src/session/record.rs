use chrono::{DateTime, Local};
use serde::Serialize;

use crate::utils::format::{sheet_date, sheet_duration, sheet_time};

/// Snapshot of a finished session. The state machine yields it exactly once,
/// when the second reflection prompt is answered, and the sink consumes it by
/// value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub category: String,
    pub objectives: String,
    pub key_takeaways: String,
    pub challenges: String,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub elapsed_seconds: u64,
}

impl SessionRecord {
    /// Flattens the record into the spreadsheet row. The total duration comes
    /// from the recorded timestamps, not from the displayed stopwatch.
    pub fn to_row(&self) -> SessionRow {
        SessionRow([
            sheet_date(self.start_time),
            sheet_time(self.start_time),
            sheet_time(self.end_time),
            sheet_duration(self.end_time - self.start_time),
            self.category.clone(),
            self.objectives.clone(),
            self.key_takeaways.clone(),
            self.challenges.clone(),
        ])
    }
}

/// One spreadsheet row: date, start, end, duration, category, objectives,
/// key takeaways, challenges. The column order is a fixed contract with
/// whatever reads the sheet downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SessionRow([String; 8]);

impl SessionRow {
    pub fn cells(&self) -> &[String; 8] {
        &self.0
    }
}

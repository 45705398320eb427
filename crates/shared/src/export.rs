//! Log export document
//!
//! The downloadable JSON produced by the log viewer's export action:
//! `{ exported, summary, entries }` with an ISO-8601 export timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dto::{ActorSummary, LogEntryData};

/// The full export payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    /// When the export was produced
    pub exported: DateTime<Utc>,
    pub total_entries: usize,
    pub summary: Vec<ActorSummary>,
    pub entries: Vec<LogEntryData>,
}

impl ExportDocument {
    pub fn new(
        exported: DateTime<Utc>,
        summary: Vec<ActorSummary>,
        entries: Vec<LogEntryData>,
    ) -> Self {
        Self {
            exported,
            total_entries: entries.len(),
            summary,
            entries,
        }
    }

    /// Suggested download filename, dated like `heroledger-log-2026-08-25.json`.
    pub fn file_name(&self) -> String {
        format!("heroledger-log-{}.json", self.exported.format("%Y-%m-%d"))
    }
}

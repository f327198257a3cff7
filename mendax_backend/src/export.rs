use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::message::ChatMessage;
use crate::tracking::TrackingData;

/// Read-only export of the full application state. There is no import
/// counterpart.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSnapshot {
    pub exported_at: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
    pub session_tracking_data: TrackingData,
    pub all_time_tracking_data: TrackingData,
}

impl ExportSnapshot {
    pub fn new(
        messages: Vec<ChatMessage>,
        session_tracking_data: TrackingData,
        all_time_tracking_data: TrackingData,
    ) -> Self {
        Self {
            exported_at: Utc::now(),
            messages,
            session_tracking_data,
            all_time_tracking_data,
        }
    }

    pub fn default_file_name(&self) -> String {
        format!(
            "oracle-session-{}.json",
            self.exported_at.format("%Y%m%d-%H%M%S")
        )
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize export snapshot")
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write export to {:?}", path))?;
        tracing::info!("Exported session data to {:?}", path);
        Ok(())
    }
}

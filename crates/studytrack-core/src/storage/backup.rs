//! Full-log backup file.
//!
//! A backup holds every category with its records. Importing one replaces
//! the whole study log.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::records::CategoryLog;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub categories: Vec<CategoryLog>,
}

impl Backup {
    /// Default file name, e.g. `studytrack-backup-2024-05-01.json`.
    pub fn file_name(&self) -> String {
        format!(
            "studytrack-backup-{}.json",
            self.exported_at.format("%Y-%m-%d")
        )
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

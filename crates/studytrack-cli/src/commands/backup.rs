use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;
use studytrack_core::{Backup, Database};

use super::CmdResult;

#[derive(Subcommand)]
pub enum BackupAction {
    /// Write every category and record to a JSON file
    Export {
        /// Output file (defaults to `studytrack-backup-<date>.json` here)
        path: Option<PathBuf>,
    },
    /// Replace the whole study log with a backup file
    Import {
        /// Backup file
        path: PathBuf,
    },
}

pub fn run(action: BackupAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        BackupAction::Export { path } => {
            let backup = db.export_backup(Utc::now())?;
            let path = path.unwrap_or_else(|| PathBuf::from(backup.file_name()));
            backup.write_to(&path)?;
            println!(
                "Exported {} categories to {}",
                backup.categories.len(),
                path.display()
            );
        }
        BackupAction::Import { path } => {
            let backup = Backup::read_from(&path)?;
            let count = db.import_backup(&backup)?;
            println!("Imported {count} categories from {}", path.display());
        }
    }
    Ok(())
}

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use studytrack_core::{Clock, Config, Database, NewRecord, SystemClock};

use super::{print_json, resolve_category, CmdResult};

#[derive(Subcommand)]
pub enum LogAction {
    /// Record a study day
    Add {
        /// Category (defaults to `default_category`)
        #[arg(long)]
        category: Option<String>,
        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Minutes studied
        #[arg(long)]
        minutes: Option<u32>,
        /// Mark the day as missed
        #[arg(long, conflicts_with = "minutes")]
        missed: bool,
        /// Hour of day the session started (0-23)
        #[arg(long)]
        hour: Option<u8>,
    },
    /// Delete a record by id
    Delete {
        /// Record ID
        id: i64,
        /// Category (defaults to `default_category`)
        #[arg(long)]
        category: Option<String>,
    },
    /// List the records of a category in date order
    List {
        /// Category (defaults to `default_category`)
        #[arg(long)]
        category: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: LogAction) -> CmdResult {
    let config = Config::load_or_default();
    let db = Database::open()?;

    match action {
        LogAction::Add {
            category,
            date,
            minutes,
            missed,
            hour,
        } => {
            let category = resolve_category(category, &config)?;
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let mut entry = if missed {
                NewRecord::missed(date)
            } else {
                NewRecord::completed(date, minutes.unwrap_or(0))
            };
            entry.start_hour = hour;

            let mut log = db.load_log(&category)?;
            let record = log.add_record(entry, SystemClock.now_ms())?;
            db.save_log(&log)?;
            print_json(&record)?;
        }
        LogAction::Delete { id, category } => {
            let category = resolve_category(category, &config)?;
            let mut log = db.load_log(&category)?;
            if !log.delete_record(id) {
                return Err(format!("no record {id} in {category}").into());
            }
            db.save_log(&log)?;
            println!("Record deleted: {id}");
        }
        LogAction::List { category, json } => {
            let category = resolve_category(category, &config)?;
            let log = db.load_log(&category)?;
            if json {
                print_json(&log)?;
            } else if log.is_empty() {
                println!("No records for {category}.");
            } else {
                for record in log.records() {
                    let status = if record.completed { "done" } else { "missed" };
                    let hour = record
                        .start_hour
                        .map(|h| format!("  {h:02}:00"))
                        .unwrap_or_default();
                    println!(
                        "{}  {:<6} {:>3} min{hour}  (id {})",
                        record.date, status, record.minutes, record.id
                    );
                }
            }
        }
    }
    Ok(())
}

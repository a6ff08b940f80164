use clap::Subcommand;
use serde::Serialize;
use studytrack_core::stats::TREND_WINDOWS;
use studytrack_core::{CategoryMetrics, Config, CoreError, Database, MetricsCalculator};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Show metrics for one category, or for every category
    Show {
        /// Category (defaults to `default_category`, then to all)
        #[arg(long)]
        category: Option<String>,
        /// Trailing window for average and trend: 7, 14, 30 or 60 records
        #[arg(long, value_parser = parse_window)]
        window: Option<usize>,
    },
}

#[derive(Serialize)]
struct CategoryReport {
    category: String,
    /// `None` while the category has no records.
    metrics: Option<CategoryMetrics>,
}

fn parse_window(s: &str) -> Result<usize, String> {
    let window: usize = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if TREND_WINDOWS.contains(&window) {
        Ok(window)
    } else {
        Err(format!("window must be one of {TREND_WINDOWS:?}"))
    }
}

pub fn run(action: StatsAction) -> CmdResult {
    let config = Config::load_or_default();
    let db = Database::open()?;

    match action {
        StatsAction::Show { category, window } => {
            let calculator = MetricsCalculator::new(window.unwrap_or(config.metrics.trend_window));
            let names = match category.or_else(|| config.category().map(str::to_string)) {
                Some(name) => vec![name],
                None => db.list_categories()?,
            };

            let reports = names
                .into_iter()
                .map(|name| -> Result<CategoryReport, CoreError> {
                    let log = db.load_log(&name)?;
                    Ok(CategoryReport {
                        metrics: calculator.calculate(log.records()),
                        category: name,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            print_json(&reports)?;
        }
    }
    Ok(())
}

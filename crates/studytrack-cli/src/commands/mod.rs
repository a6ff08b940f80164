pub mod backup;
pub mod category;
pub mod config;
pub mod focus;
pub mod log;
pub mod stats;

use serde::Serialize;
use studytrack_core::{Config, ValidationError};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Category named on the command line, or the configured default.
pub fn resolve_category(flag: Option<String>, config: &Config) -> Result<String, ValidationError> {
    flag.map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .or_else(|| config.category().map(str::to_string))
        .ok_or(ValidationError::EmptyCategory)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

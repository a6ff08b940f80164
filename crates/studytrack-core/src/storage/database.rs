//! SQLite-based study log storage.
//!
//! Provides persistent storage for:
//! - Categories, in creation order
//! - Session records per category, in log order
//! - Key-value store for application state (the focus timer record)

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use super::backup::Backup;
use super::data_dir;
use crate::error::{DatabaseError, Result, ValidationError};
use crate::records::{CategoryLog, SessionRecord};

/// SQLite database for the study log.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/studytrack/studytrack.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("studytrack.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS categories (
                name     TEXT PRIMARY KEY,
                position INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS records (
                category   TEXT NOT NULL,
                id         INTEGER NOT NULL,
                seq        INTEGER NOT NULL,
                date       TEXT NOT NULL,
                completed  INTEGER NOT NULL,
                minutes    INTEGER NOT NULL,
                start_hour INTEGER,
                PRIMARY KEY (category, id)
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_records_category_seq ON records(category, seq);",
        )?;
        Ok(())
    }

    // ── Categories ───────────────────────────────────────────────────

    /// Add a category. The name is trimmed and must be unique.
    pub fn add_category(&self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyCategory.into());
        }
        if self.has_category(name)? {
            return Err(ValidationError::DuplicateCategory(name.to_string()).into());
        }
        self.conn.execute(
            "INSERT INTO categories (name, position)
             VALUES (?1, (SELECT COALESCE(MAX(position), -1) + 1 FROM categories))",
            params![name],
        )?;
        Ok(name.to_string())
    }

    /// Remove a category together with all of its records.
    pub fn remove_category(&self, name: &str) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM categories WHERE name = ?1", params![name])?;
        if removed == 0 {
            return Err(ValidationError::UnknownCategory(name.to_string()).into());
        }
        tx.execute("DELETE FROM records WHERE category = ?1", params![name])?;
        tx.commit()?;
        Ok(())
    }

    pub fn list_categories(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM categories ORDER BY position")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    pub fn has_category(&self, name: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM categories WHERE name = ?1",
                params![name],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    // ── Records ──────────────────────────────────────────────────────

    /// Load the ordered record list of a category.
    pub fn load_log(&self, category: &str) -> Result<CategoryLog> {
        if !self.has_category(category)? {
            return Err(ValidationError::UnknownCategory(category.to_string()).into());
        }
        let mut stmt = self.conn.prepare(
            "SELECT id, date, completed, minutes, start_hour
             FROM records
             WHERE category = ?1
             ORDER BY seq",
        )?;
        let rows = stmt.query_map(params![category], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, Option<u8>>(4)?,
            ))
        })?;

        let mut log = CategoryLog::new(category);
        for row in rows {
            let (id, date, completed, minutes, start_hour) = row?;
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
                DatabaseError::QueryFailed(format!("bad date '{date}' in record {id}: {e}"))
            })?;
            log.records.push(SessionRecord {
                id,
                date,
                completed,
                minutes,
                start_hour,
            });
        }
        Ok(log)
    }

    /// Replace the stored records of a category with `log`.
    pub fn save_log(&self, log: &CategoryLog) -> Result<()> {
        if !self.has_category(&log.name)? {
            return Err(ValidationError::UnknownCategory(log.name.clone()).into());
        }
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM records WHERE category = ?1", params![log.name])?;
        insert_records(&tx, log)?;
        tx.commit()?;
        Ok(())
    }

    // ── Backup ───────────────────────────────────────────────────────

    /// Snapshot every category and its records.
    pub fn export_backup(&self, exported_at: chrono::DateTime<chrono::Utc>) -> Result<Backup> {
        let categories = self
            .list_categories()?
            .iter()
            .map(|name| self.load_log(name))
            .collect::<Result<Vec<_>>>()?;
        Ok(Backup {
            exported_at,
            categories,
        })
    }

    /// Replace all categories and records with the contents of `backup`.
    ///
    /// Imported logs are normalized (sorted, minutes of missed days zeroed).
    /// A completed record without minutes rejects the whole backup.
    /// Nothing is written if the backup is invalid.
    pub fn import_backup(&self, backup: &Backup) -> Result<usize> {
        let mut logs = backup.categories.clone();
        let mut seen = std::collections::HashSet::new();
        for log in &mut logs {
            log.name = log.name.trim().to_string();
            if log.name.is_empty() {
                return Err(ValidationError::EmptyCategory.into());
            }
            if !seen.insert(log.name.clone()) {
                return Err(ValidationError::DuplicateCategory(log.name.clone()).into());
            }
            log.normalize()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM records", [])?;
        tx.execute("DELETE FROM categories", [])?;
        for (position, log) in logs.iter().enumerate() {
            tx.execute(
                "INSERT INTO categories (name, position) VALUES (?1, ?2)",
                params![log.name, position as i64],
            )?;
            insert_records(&tx, log)?;
        }
        tx.commit()?;
        Ok(logs.len())
    }

    // ── Key-value ────────────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a value from the kv store. Missing keys are not an error.
    pub fn kv_delete(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

fn insert_records(conn: &Connection, log: &CategoryLog) -> Result<(), rusqlite::Error> {
    let mut stmt = conn.prepare(
        "INSERT INTO records (category, id, seq, date, completed, minutes, start_hour)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for (seq, record) in log.records.iter().enumerate() {
        stmt.execute(params![
            log.name,
            record.id,
            seq as i64,
            record.date.format("%Y-%m-%d").to_string(),
            record.completed,
            record.minutes,
            record.start_hour,
        ])?;
    }
    Ok(())
}

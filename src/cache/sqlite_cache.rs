use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::cache::DocumentCache;
use crate::entity::{MinutesRecord, SeriesRecord};
use crate::error::Result;

const CACHE_DB: &str = "cache.db";
const SCHEMA_VERSION: &str = "1";

/// SQLite mirror of the server-side minutes and meeting-series collections.
///
/// Reads go through the `DocumentCache` trait. The upsert/remove methods are
/// the synchronization surface: the sync layer applies confirmed server
/// state through them, and document handles never touch them.
pub struct SqliteCache {
    conn: Connection,
    #[allow(dead_code)]
    path: PathBuf,
}

impl SqliteCache {
    /// Open or create the cache database.
    pub fn open(plenum_dir: &Path) -> Result<Self> {
        let path = plenum_dir.join(CACHE_DB);
        let conn = Connection::open(&path)?;

        let cache = Self { conn, path };
        cache.init_schema()?;
        Ok(cache)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS minutes (
                id TEXT PRIMARY KEY,
                meeting_series_id TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT,
                topics TEXT NOT NULL,
                is_finalized INTEGER NOT NULL,
                is_unfinalized INTEGER NOT NULL,
                participants TEXT NOT NULL,
                agenda TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_minutes_series ON minutes(meeting_series_id)",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS meeting_series (
                id TEXT PRIMARY KEY,
                project TEXT NOT NULL,
                name TEXT NOT NULL,
                moderators TEXT NOT NULL,
                last_minutes_date TEXT
            )",
            [],
        )?;

        self.conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('schema_version', ?1)",
            [SCHEMA_VERSION],
        )?;

        Ok(())
    }

    /// Mirror a confirmed minutes document into the cache.
    pub fn upsert_minutes(&self, record: &MinutesRecord) -> Result<()> {
        let id = record.id.as_deref().unwrap_or_default();
        let topics_json = serde_json::to_string(&record.topics)?;

        self.conn.execute(
            "INSERT OR REPLACE INTO minutes
             (id, meeting_series_id, date, created_at, topics, is_finalized, is_unfinalized, participants, agenda)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                record.meeting_series_id,
                record.date,
                record.created_at.map(|dt| dt.to_rfc3339()),
                topics_json,
                record.is_finalized,
                record.is_unfinalized,
                record.participants,
                record.agenda,
            ],
        )?;

        tracing::debug!(id, "cached minutes");
        Ok(())
    }

    /// Drop a minutes document from the cache.
    pub fn remove_minutes(&self, id: &str) -> Result<()> {
        self.conn.execute("DELETE FROM minutes WHERE id = ?1", [id])?;
        Ok(())
    }

    /// List cached minutes, optionally restricted to one series, in date
    /// order.
    pub fn list_minutes(&self, series_id: Option<&str>) -> Result<Vec<MinutesRecord>> {
        let mut stmt = match series_id {
            Some(_) => self.conn.prepare(
                "SELECT id, meeting_series_id, date, created_at, topics, is_finalized, is_unfinalized, participants, agenda
                 FROM minutes WHERE meeting_series_id = ?1 ORDER BY date, id",
            )?,
            None => self.conn.prepare(
                "SELECT id, meeting_series_id, date, created_at, topics, is_finalized, is_unfinalized, participants, agenda
                 FROM minutes ORDER BY date, id",
            )?,
        };

        let rows = match series_id {
            Some(series) => stmt.query_map([series], minutes_row)?,
            None => stmt.query_map([], minutes_row)?,
        };

        let mut minutes = Vec::new();
        for row in rows {
            minutes.push(minutes_from_row(row?)?);
        }
        Ok(minutes)
    }

    /// Mirror a meeting series document into the cache.
    pub fn upsert_series(&self, record: &SeriesRecord) -> Result<()> {
        let moderators_json = serde_json::to_string(&record.moderators)?;

        self.conn.execute(
            "INSERT OR REPLACE INTO meeting_series
             (id, project, name, moderators, last_minutes_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.project,
                record.name,
                moderators_json,
                record.last_minutes_date,
            ],
        )?;

        tracing::debug!(id = %record.id, "cached meeting series");
        Ok(())
    }

    /// List cached meeting series by project and name.
    pub fn list_series(&self) -> Result<Vec<SeriesRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project, name, moderators, last_minutes_date
             FROM meeting_series ORDER BY project, name",
        )?;

        let rows = stmt.query_map([], series_row)?;

        let mut series = Vec::new();
        for row in rows {
            series.push(series_from_row(row?)?);
        }
        Ok(series)
    }
}

impl DocumentCache for SqliteCache {
    fn find_minutes(&self, id: &str) -> Result<Option<MinutesRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, meeting_series_id, date, created_at, topics, is_finalized, is_unfinalized, participants, agenda
                 FROM minutes WHERE id = ?1",
                [id],
                minutes_row,
            )
            .optional()?;

        match row {
            Some(row) => Ok(Some(minutes_from_row(row)?)),
            None => Ok(None),
        }
    }

    fn find_series(&self, id: &str) -> Result<Option<SeriesRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, project, name, moderators, last_minutes_date
                 FROM meeting_series WHERE id = ?1",
                [id],
                series_row,
            )
            .optional()?;

        match row {
            Some(row) => Ok(Some(series_from_row(row)?)),
            None => Ok(None),
        }
    }
}

type MinutesRow = (
    String,
    String,
    String,
    Option<String>,
    String,
    bool,
    bool,
    String,
    String,
);

fn minutes_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MinutesRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn minutes_from_row(row: MinutesRow) -> Result<MinutesRecord> {
    let (id, meeting_series_id, date, created_at, topics_json, is_finalized, is_unfinalized, participants, agenda) =
        row;

    Ok(MinutesRecord {
        id: Some(id),
        meeting_series_id,
        date,
        created_at: created_at.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }),
        topics: serde_json::from_str(&topics_json)?,
        is_finalized,
        is_unfinalized,
        participants,
        agenda,
    })
}

type SeriesRow = (String, String, String, String, Option<String>);

fn series_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SeriesRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn series_from_row(row: SeriesRow) -> Result<SeriesRecord> {
    let (id, project, name, moderators_json, last_minutes_date) = row;

    Ok(SeriesRecord {
        id,
        project,
        name,
        moderators: serde_json::from_str(&moderators_json)?,
        last_minutes_date,
    })
}

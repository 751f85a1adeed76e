use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::gateway::{RpcCallback, RpcError, RpcGateway};

const OUTBOX_DB: &str = "outbox.db";

/// A remote call waiting to be shipped.
#[derive(Debug, Clone, Serialize)]
pub struct PendingCall {
    pub id: i64,
    pub method: String,
    pub args: Vec<Value>,
    pub enqueued_at: DateTime<Utc>,
}

/// SQLite-backed pending-call queue.
///
/// Every gateway call is appended here in invocation order; a transport or
/// sync layer drains the queue toward the server. Enqueueing counts as
/// acceptance, so callbacks fire synchronously with the enqueue outcome.
pub struct OutboxGateway {
    conn: Connection,
    #[allow(dead_code)]
    path: PathBuf,
}

impl OutboxGateway {
    /// Open or create the outbox database.
    pub fn open(plenum_dir: &Path) -> Result<Self> {
        let path = plenum_dir.join(OUTBOX_DB);
        let conn = Connection::open(&path)?;

        let outbox = Self { conn, path };
        outbox.init_schema()?;
        Ok(outbox)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS calls (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                method TEXT NOT NULL,
                args TEXT NOT NULL,
                enqueued_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn enqueue(&self, method: &str, args: &[Value]) -> Result<()> {
        let args_json = serde_json::to_string(args)?;
        self.conn.execute(
            "INSERT INTO calls (method, args, enqueued_at) VALUES (?1, ?2, ?3)",
            params![method, args_json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// List queued calls in invocation order.
    pub fn pending(&self) -> Result<Vec<PendingCall>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, method, args, enqueued_at FROM calls ORDER BY id")?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut calls = Vec::new();
        for row in rows {
            let (id, method, args_json, enqueued_at) = row?;
            calls.push(PendingCall {
                id,
                method,
                args: serde_json::from_str(&args_json)?,
                enqueued_at: DateTime::parse_from_rfc3339(&enqueued_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_default(),
            });
        }
        Ok(calls)
    }

    /// Remove and return all queued calls, oldest first.
    pub fn take_all(&self) -> Result<Vec<PendingCall>> {
        let calls = self.pending()?;
        self.conn.execute("DELETE FROM calls", [])?;
        Ok(calls)
    }

    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM calls", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl RpcGateway for OutboxGateway {
    fn call(&self, method: &str, args: Vec<Value>, callback: Option<RpcCallback>) {
        tracing::debug!(method, "queueing remote call");

        match self.enqueue(method, &args) {
            Ok(()) => {
                if let Some(cb) = callback {
                    cb(Ok(Value::Null));
                }
            }
            Err(e) => {
                let err = RpcError::Enqueue {
                    method: method.to_string(),
                    reason: e.to_string(),
                };
                match callback {
                    Some(cb) => cb(Err(err)),
                    None => tracing::warn!(method, error = %e, "dropping remote call"),
                }
            }
        }
    }
}

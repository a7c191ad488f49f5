use crate::config::{is_valid_collection_name, CollectionsConfig, StorageConfig};
use crate::error::{LegalchatError, Result};
use crate::providers::{Message, Role};
use chrono::Utc;
use directories::ProjectDirs;
use rusqlite::{params, Connection, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod types;
pub use types::{StoredMessage, StoredSession};

/// Session-scoped, append-only log of chat turns
///
/// Implementations must make `append` a single atomic write and return
/// `replay` results in ascending timestamp order. Every failure to reach or
/// use the backing store is reported as
/// [`LegalchatError::StorageUnavailable`].
pub trait MessageStore: Send + Sync {
    /// Persist one message with a store-assigned timestamp
    fn append(&self, session_id: &str, message: &Message) -> Result<StoredMessage>;

    /// All messages of a session, oldest first; empty for an unknown session
    fn replay(&self, session_id: &str) -> Result<Vec<StoredMessage>>;

    /// Remove every message of a session; succeeds for unknown sessions
    fn clear(&self, session_id: &str) -> Result<()>;
}

fn unavailable(what: &str, err: impl std::fmt::Display) -> LegalchatError {
    LegalchatError::StorageUnavailable(format!("{}: {}", what, err))
}

/// Double-quoted SQL identifier for a validated collection name
fn quoted(name: &str) -> String {
    format!("\"{}\"", name)
}

/// Current time in Unix seconds with microsecond resolution
fn now_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Smallest f64 strictly greater than a non-negative `value`
fn next_up(value: f64) -> f64 {
    f64::from_bits(value.to_bits() + 1)
}

/// Default database location inside the user's data directory
pub fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "legalchat", "legalchat").ok_or_else(|| {
        LegalchatError::StorageUnavailable("Could not determine data directory".into())
    })?;
    Ok(proj_dirs.data_dir().join("legal_db.sqlite"))
}

/// SQLite-backed document store
///
/// Chat turns live in the chat-history collection; fine-tune examples live
/// in one collection per dataset. Every operation opens its own connection,
/// which is closed when the operation returns.
pub struct SqliteStorage {
    db_path: PathBuf,
    chat_collection: String,
}

impl SqliteStorage {
    /// Open the store described by the configuration
    ///
    /// Uses `storage.path` when set, otherwise the default data directory.
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let db_path = match &config.path {
            Some(path) => path.clone(),
            None => default_db_path()?,
        };
        Self::open(db_path, &config.collections.chat_history)
    }

    /// Create a store at the given path with the default collection names
    ///
    /// # Examples
    ///
    /// ```
    /// use legalchat::storage::{MessageStore, SqliteStorage};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let storage = SqliteStorage::new_with_path(dir.path().join("legal.db")).unwrap();
    /// assert!(storage.replay("unknown-session").unwrap().is_empty());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        Self::open(db_path.into(), &CollectionsConfig::default().chat_history)
    }

    fn open(db_path: PathBuf, chat_collection: &str) -> Result<Self> {
        if !is_valid_collection_name(chat_collection) {
            return Err(LegalchatError::Config(format!(
                "Invalid collection name: {:?}",
                chat_collection
            ))
            .into());
        }

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| unavailable("Failed to create database directory", e))?;
            }
        }

        let storage = Self {
            db_path,
            chat_collection: chat_collection.to_string(),
        };
        storage.init()?;

        tracing::debug!(
            "Opened store at {} (chat collection: {})",
            storage.db_path.display(),
            storage.chat_collection
        );

        Ok(storage)
    }

    /// Path of the SQLite database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Name of the chat-history collection
    pub fn chat_collection(&self) -> &str {
        &self.chat_collection
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .map_err(|e| unavailable("Failed to open database", e))?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| unavailable("Failed to configure database", e))?;
        Ok(conn)
    }

    /// Initialize the chat-history schema
    fn init(&self) -> Result<()> {
        let conn = self.connect()?;
        let table = quoted(&self.chat_collection);
        let index = quoted(&format!("idx_{}_session", self.chat_collection));

        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                type TEXT NOT NULL,
                content TEXT NOT NULL,
                timestamp REAL NOT NULL
            );
            CREATE INDEX IF NOT EXISTS {index}
                ON {table} (session_id, timestamp, seq);"
        ))
        .map_err(|e| unavailable("Failed to create tables", e))?;

        Ok(())
    }

    /// List stored chat sessions, most recently active first
    pub fn list_sessions(&self) -> Result<Vec<StoredSession>> {
        let conn = self.connect()?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT session_id, COUNT(*), MIN(timestamp), MAX(timestamp)
                FROM {}
                GROUP BY session_id
                ORDER BY MAX(timestamp) DESC",
                quoted(&self.chat_collection)
            ))
            .map_err(|e| unavailable("Failed to prepare statement", e))?;

        let rows = stmt
            .query_map([], |row| {
                let count: i64 = row.get(1)?;
                Ok(StoredSession {
                    session_id: row.get(0)?,
                    message_count: count as usize,
                    first_timestamp: row.get(2)?,
                    last_timestamp: row.get(3)?,
                })
            })
            .map_err(|e| unavailable("Failed to query sessions", e))?;

        let sessions = rows
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| unavailable("Failed to read sessions", e))?;

        Ok(sessions)
    }

    fn ensure_collection(conn: &Connection, collection: &str) -> Result<()> {
        if !is_valid_collection_name(collection) {
            return Err(LegalchatError::Config(format!(
                "Invalid collection name: {:?}",
                collection
            ))
            .into());
        }

        let table = quoted(collection);
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                document TEXT NOT NULL,
                created_at TEXT NOT NULL
            );"
        ))
        .map_err(|e| unavailable("Failed to create collection", e))?;

        Ok(())
    }

    /// Insert one JSON document into a collection, creating it on first use
    ///
    /// Returns the document's sequence number within the collection.
    pub fn insert_document(&self, collection: &str, document: &serde_json::Value) -> Result<i64> {
        let conn = self.connect()?;
        Self::ensure_collection(&conn, collection)?;

        let body = serde_json::to_string(document)?;
        conn.execute(
            &format!(
                "INSERT INTO {} (document, created_at) VALUES (?, ?)",
                quoted(collection)
            ),
            params![body, Utc::now().to_rfc3339()],
        )
        .map_err(|e| unavailable("Failed to insert document", e))?;

        Ok(conn.last_insert_rowid())
    }

    /// Number of documents in a collection; zero if it does not exist yet
    pub fn count_documents(&self, collection: &str) -> Result<usize> {
        let conn = self.connect()?;
        Self::ensure_collection(&conn, collection)?;

        let sql = format!("SELECT COUNT(*) FROM {}", quoted(collection));
        let count: i64 = conn
            .query_row(&sql, [], |r| r.get(0))
            .map_err(|e| unavailable("Failed to count documents", e))?;

        Ok(count as usize)
    }

    /// All documents of a collection in insertion order
    pub fn documents(&self, collection: &str) -> Result<Vec<serde_json::Value>> {
        let conn = self.connect()?;
        Self::ensure_collection(&conn, collection)?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT document FROM {} ORDER BY seq ASC",
                quoted(collection)
            ))
            .map_err(|e| unavailable("Failed to prepare statement", e))?;

        let bodies = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| unavailable("Failed to query documents", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| unavailable("Failed to read documents", e))?;

        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(Into::into))
            .collect()
    }
}

impl MessageStore for SqliteStorage {
    fn append(&self, session_id: &str, message: &Message) -> Result<StoredMessage> {
        let mut conn = self.connect()?;

        // IMMEDIATE takes the write lock up front so the max-timestamp read
        // and the insert cannot interleave with another writer.
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| unavailable("Failed to start transaction", e))?;

        let latest: Option<f64> = tx
            .query_row(
                &format!(
                    "SELECT MAX(timestamp) FROM {} WHERE session_id = ?",
                    quoted(&self.chat_collection)
                ),
                params![session_id],
                |row| row.get(0),
            )
            .map_err(|e| unavailable("Failed to read latest timestamp", e))?;

        let mut timestamp = now_seconds();
        if let Some(latest) = latest {
            if timestamp <= latest {
                timestamp = next_up(latest);
            }
        }

        tx.execute(
            &format!(
                "INSERT INTO {} (session_id, type, content, timestamp) VALUES (?, ?, ?, ?)",
                quoted(&self.chat_collection)
            ),
            params![
                session_id,
                message.role().as_type_str(),
                message.content(),
                timestamp
            ],
        )
        .map_err(|e| unavailable("Failed to insert message", e))?;

        tx.commit()
            .map_err(|e| unavailable("Failed to commit transaction", e))?;

        tracing::debug!(
            "Appended {} message to session {} at {:.6}",
            message.role(),
            session_id,
            timestamp
        );

        Ok(StoredMessage {
            session_id: session_id.to_string(),
            message: message.clone(),
            timestamp,
        })
    }

    fn replay(&self, session_id: &str) -> Result<Vec<StoredMessage>> {
        let conn = self.connect()?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT type, content, timestamp FROM {}
                WHERE session_id = ?
                ORDER BY timestamp ASC, seq ASC",
                quoted(&self.chat_collection)
            ))
            .map_err(|e| unavailable("Failed to prepare statement", e))?;

        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })
            .map_err(|e| unavailable("Failed to query messages", e))?;

        let mut messages = Vec::new();
        for row in rows {
            let (kind, content, timestamp) =
                row.map_err(|e| unavailable("Failed to read message", e))?;

            match Role::from_type_str(&kind) {
                Some(role) => messages.push(StoredMessage {
                    session_id: session_id.to_string(),
                    message: Message::from_parts(role, content),
                    timestamp,
                }),
                None => tracing::warn!(
                    "Skipping stored message with unknown type {:?} in session {}",
                    kind,
                    session_id
                ),
            }
        }

        Ok(messages)
    }

    fn clear(&self, session_id: &str) -> Result<()> {
        let conn = self.connect()?;

        let removed = conn
            .execute(
                &format!(
                    "DELETE FROM {} WHERE session_id = ?",
                    quoted(&self.chat_collection)
                ),
                params![session_id],
            )
            .map_err(|e| unavailable("Failed to delete messages", e))?;

        tracing::debug!("Cleared {} messages from session {}", removed, session_id);
        Ok(())
    }
}

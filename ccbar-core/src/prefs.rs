use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

/// Key under which the prettify flag is persisted.
pub const PRETTIFY_KEY: &str = "ccbar.prettify_enabled";

/// Prettify is on until the user turns it off.
pub const DEFAULT_PRETTIFY: bool = true;

/// Opens (or creates) the SQLite database at `path`, configures WAL mode,
/// and applies schema migrations.
///
/// `busy_timeout` is set through the `Connection` method rather than a PRAGMA
/// string so it takes effect regardless of pragma caching.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the file cannot be opened, WAL
/// configuration fails, or a migration fails.
pub async fn open_db(path: &str) -> Result<Connection, tokio_rusqlite::Error> {
    let conn = Connection::open(path).await?;

    conn.call(|db| {
        db.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;",
        )?;
        db.busy_timeout(Duration::from_secs(5))?;
        crate::schema::migrate(db)?;
        Ok(())
    })
    .await?;

    Ok(conn)
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Reads the raw text value stored under `key`, `None` when never written.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the query fails.
pub async fn read_preference(
    conn: &Connection,
    key: &str,
) -> Result<Option<String>, tokio_rusqlite::Error> {
    let key = key.to_owned();

    conn.call(move |db| {
        let value = db
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                rusqlite::params![&key],
                |r| r.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    })
    .await
}

/// Upserts `value` under `key` inside `BEGIN IMMEDIATE`.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the write transaction fails.
pub async fn write_preference(
    conn: &Connection,
    key: &str,
    value: &str,
) -> Result<(), tokio_rusqlite::Error> {
    let key = key.to_owned();
    let value = value.to_owned();

    conn.call(move |db| {
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO preferences (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key)
             DO UPDATE SET value = excluded.value,
                           updated_at = excluded.updated_at",
            rusqlite::params![&key, &value, now_secs()],
        )?;
        tx.commit()?;
        Ok(())
    })
    .await
}

/// Parses a stored flag; anything but `"true"` / `"false"` is unreadable.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Process-wide prettify preference shared by every toolbar.
///
/// The value is cached in memory so toolbars can read it synchronously while
/// rendering; [`PreferenceStore::set`] writes through to SQLite immediately.
/// Every storage failure is absorbed: reads fall back to
/// [`DEFAULT_PRETTIFY`], failed writes keep the new value for this run.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    conn: Option<Connection>,
    prettify: bool,
}

impl PreferenceStore {
    /// Loads the stored flag from `conn`.
    pub async fn load(conn: Connection) -> Self {
        let prettify = match read_preference(&conn, PRETTIFY_KEY).await {
            Ok(Some(raw)) => parse_flag(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "unreadable prettify preference, using default");
                DEFAULT_PRETTIFY
            }),
            Ok(None) => DEFAULT_PRETTIFY,
            Err(e) => {
                warn!(error = %e, "prettify preference unavailable, using default");
                DEFAULT_PRETTIFY
            }
        };
        debug!(prettify, "loaded prettify preference");
        Self {
            conn: Some(conn),
            prettify,
        }
    }

    /// A store with no backing database; values last for the process only.
    pub fn detached() -> Self {
        Self {
            conn: None,
            prettify: DEFAULT_PRETTIFY,
        }
    }

    /// Current prettify flag.
    pub fn get(&self) -> bool {
        self.prettify
    }

    /// Sets the flag and persists it before returning.
    pub async fn set(&mut self, enabled: bool) {
        self.prettify = enabled;
        let Some(conn) = &self.conn else {
            return;
        };
        let raw = if enabled { "true" } else { "false" };
        if let Err(e) = write_preference(conn, PRETTIFY_KEY, raw).await {
            warn!(error = %e, "failed to persist prettify preference");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_flag_strings_parse() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag("false"), Some(false));
        assert_eq!(parse_flag("TRUE"), None);
        assert_eq!(parse_flag(""), None);
    }

    #[tokio::test]
    async fn detached_store_defaults_on_and_remembers_in_memory() {
        let mut store = PreferenceStore::detached();
        assert!(store.get());
        store.set(false).await;
        assert!(!store.get());
    }
}

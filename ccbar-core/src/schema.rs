/// DDL for the schema_version tracking table.
///
/// Applied on every open before the version is read; `IF NOT EXISTS` keeps it
/// safe to repeat.
pub const SCHEMA_VERSION_DDL: &str = "
    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER NOT NULL
    ) STRICT;
";

/// DDL for the v1 schema: a single key/value table.
///
/// Values are stored as text exactly as written (`"true"` / `"false"` for
/// boolean flags). A row that does not parse is treated as absent by readers.
pub const SCHEMA_V1_SQL: &str = "
    CREATE TABLE IF NOT EXISTS preferences (
        key         TEXT    PRIMARY KEY,
        value       TEXT    NOT NULL,
        updated_at  INTEGER NOT NULL
    ) STRICT;
";

/// Forward-only migration steps; step `i` moves the schema to version `i + 1`.
const MIGRATIONS: &[&str] = &[SCHEMA_V1_SQL];

/// Latest schema version this build knows about.
pub const LATEST_VERSION: i64 = MIGRATIONS.len() as i64;

/// Brings the database up to [`LATEST_VERSION`].
///
/// Idempotent. Each missing step runs in its own `BEGIN IMMEDIATE`
/// transaction together with the version row that records it, so a crash
/// mid-migration never leaves a step half applied.
///
/// # Errors
///
/// Returns `rusqlite::Error` if DDL fails or the version row cannot be written.
pub fn migrate(db: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    db.execute_batch(SCHEMA_VERSION_DDL)?;

    let current: i64 = db
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    for (step, ddl) in MIGRATIONS.iter().enumerate() {
        let version = step as i64 + 1;
        if version <= current {
            continue;
        }
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute_batch(ddl)?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            rusqlite::params![version],
        )?;
        tx.commit()?;
    }

    Ok(())
}

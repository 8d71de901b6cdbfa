//! `cards` schema versions and the guard run by `SqliteCardStore::try_new`.
//!
//! Steps are applied in one transaction, in ascending version order. A
//! database stamped with a newer version than `CARD_SCHEMA_STEPS` knows is
//! never touched.

use crate::repo::card_repo::{RepoError, RepoResult};
use log::info;
use rusqlite::Connection;
use std::collections::HashSet;

/// Columns `SqliteCardStore` reads or writes.
pub const CARD_COLUMNS: [&str; 10] = [
    "id",
    "card_number",
    "cardholder_name",
    "expiry_date",
    "cvv",
    "card_type",
    "issue_date",
    "balance",
    "status",
    "updated_at",
];

struct CardSchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const CARD_SCHEMA_STEPS: &[CardSchemaStep] = &[CardSchemaStep {
    version: 1,
    name: "create_cards",
    sql: include_str!("sql/0001_cards.sql"),
}];

/// Newest `cards` schema version this binary can read and write.
pub fn card_schema_version() -> u32 {
    CARD_SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Reads the version stamped on the connection.
pub fn stored_schema_version(conn: &Connection) -> RepoResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Applies every step newer than the stored version.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the database is newer than this binary.
pub fn upgrade_card_schema(conn: &mut Connection) -> RepoResult<()> {
    let stored = stored_schema_version(conn)?;
    let target = card_schema_version();
    if stored > target {
        return Err(RepoError::UnsupportedSchemaVersion {
            db_version: stored,
            latest_supported: target,
        });
    }

    let pending: Vec<&CardSchemaStep> = CARD_SCHEMA_STEPS
        .iter()
        .filter(|step| step.version > stored)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        info!(
            "event=card_schema_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;
    Ok(())
}

/// Checks that the connection carries the exact `cards` schema this binary writes.
///
/// # Errors
/// - `UninitializedConnection` when the stored version differs.
/// - `MissingRequiredTable` when `cards` does not exist.
/// - `MissingRequiredColumn` for the first column of `CARD_COLUMNS` that is absent.
pub fn ensure_card_schema(conn: &Connection) -> RepoResult<()> {
    let expected_version = card_schema_version();
    let actual_version = stored_schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('cards');")?;
    let present = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<HashSet<_>, _>>()?;
    if present.is_empty() {
        return Err(RepoError::MissingRequiredTable("cards"));
    }

    match CARD_COLUMNS
        .iter()
        .find(|column| !present.contains(**column))
    {
        Some(column) => Err(RepoError::MissingRequiredColumn {
            table: "cards",
            column: *column,
        }),
        None => Ok(()),
    }
}

//! SQLite bootstrap for the card store.
//!
//! # Responsibility
//! - Open and configure SQLite connections.
//! - Bring the `cards` schema up to the version this binary writes.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - `SqliteCardStore` only accepts connections that passed `schema::ensure_card_schema`.

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};

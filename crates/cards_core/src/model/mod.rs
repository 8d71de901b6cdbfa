//! Card domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep request, record and response shapes in one place.
//!
//! # Invariants
//! - Every persisted card is identified by a store-assigned `CardId`.
//! - Deletion is represented by the `Deleted` status, not row removal.

pub mod card;

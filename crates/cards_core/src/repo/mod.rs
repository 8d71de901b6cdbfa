//! Card store abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the `CardStore` capability the service layer depends on.
//! - Isolate SQLite query details from business orchestration.
//!
//! # Invariants
//! - Stores never physically remove cards.
//! - Store ids are assigned once and never reused.

pub mod card_repo;
pub mod memory_repo;

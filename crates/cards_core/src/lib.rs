//! Core domain logic for card records.
//! This crate is the single source of truth for card business rules.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::card::{merge, Card, CardId, CardPatch, CardResponse, CardStatus, CreateCardRequest};
pub use repo::card_repo::{CardStore, RepoError, RepoResult, SqliteCardStore};
pub use repo::memory_repo::InMemoryCardStore;
pub use service::card_service::{
    increased_balance, CardService, CardServiceError, CardServiceResult, BALANCE_INCREASE_RATE,
    CARD_NOT_FOUND_CODE, CARD_NOT_FOUND_MESSAGE,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

//! Card use-case service.
//!
//! # Responsibility
//! - Provide create/get/list/update/delete entry points for core callers.
//! - Apply status transitions and partial-update rules.
//! - Run the batch balance increase.
//!
//! # Invariants
//! - `update_card` moves a card to `InProgress`; `delete_card` moves it to
//!   `Deleted`. No other status transition exists.
//! - Delete never removes the record from the store.
//! - Balance arithmetic uses checked decimal operations and never panics.

use crate::model::card::{merge, Card, CardId, CardResponse, CreateCardRequest};
use crate::repo::card_repo::{CardStore, RepoError};
use log::{error, info};
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rate applied by `increase_card_balances` (5%).
pub const BALANCE_INCREASE_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Fixed error code carried by `CardServiceError::NotFound`.
pub const CARD_NOT_FOUND_CODE: &str = "CARD_NOT_FOUND";
/// Fixed error message carried by `CardServiceError::NotFound`.
pub const CARD_NOT_FOUND_MESSAGE: &str = "Card not found";

/// Service error for card use-cases.
#[derive(Debug)]
pub enum CardServiceError {
    /// No card is stored under the requested id.
    NotFound(CardId),
    /// Store failure, propagated unchanged.
    Repo(RepoError),
}

impl CardServiceError {
    /// Stable machine-readable code for transport layers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => CARD_NOT_FOUND_CODE,
            Self::Repo(_) => "CARD_STORE_FAILURE",
        }
    }

    /// Fixed human-readable message for transport layers.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotFound(_) => CARD_NOT_FOUND_MESSAGE,
            Self::Repo(_) => "Card store failure",
        }
    }
}

impl Display for CardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(card_id) => {
                write!(f, "{CARD_NOT_FOUND_CODE}: {CARD_NOT_FOUND_MESSAGE} (id {card_id})")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<RepoError> for CardServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type CardServiceResult<T> = Result<T, CardServiceError>;

/// Card service facade over a `CardStore` implementation.
pub struct CardService<S: CardStore> {
    store: S,
}

impl<S: CardStore> CardService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persists a new card built from the request. Always inserts.
    pub fn create_card(&self, request: &CreateCardRequest) -> CardServiceResult<()> {
        info!("event=card_create module=service status=start");
        let saved = self.store.save(&Card::from_request(request))?;
        info!(
            "event=card_create module=service status=ok card_id={}",
            format_id(saved.id)
        );
        Ok(())
    }

    /// Gets one card by id.
    pub fn get_card(&self, card_id: CardId) -> CardServiceResult<CardResponse> {
        info!("event=card_get module=service status=start card_id={card_id}");
        let card = self.fetch_card_if_exist(card_id)?;
        info!("event=card_get module=service status=ok card_id={card_id}");
        Ok(CardResponse::from(card))
    }

    /// Lists every stored card, deleted ones included, in store order.
    pub fn get_cards(&self) -> CardServiceResult<Vec<CardResponse>> {
        info!("event=card_list module=service status=start");
        let cards = self.store.find_all()?;
        info!(
            "event=card_list module=service status=ok count={}",
            cards.len()
        );
        Ok(cards.into_iter().map(CardResponse::from).collect())
    }

    /// Soft-deletes a card. The record stays queryable with `Deleted` status.
    pub fn delete_card(&self, card_id: CardId) -> CardServiceResult<()> {
        info!("event=card_delete module=service status=start card_id={card_id}");
        let mut card = self.fetch_card_if_exist(card_id)?;
        card.soft_delete();
        self.store.save(&card)?;
        info!("event=card_delete module=service status=ok card_id={card_id}");
        Ok(())
    }

    /// Applies a partial update and moves the card to `InProgress`.
    ///
    /// # Contract
    /// - Fields absent from `request` keep their stored values.
    /// - Status becomes `InProgress` even when `request` is empty.
    pub fn update_card(
        &self,
        card_id: CardId,
        request: &CreateCardRequest,
    ) -> CardServiceResult<()> {
        info!("event=card_update module=service status=start card_id={card_id}");
        let mut card = self.fetch_card_if_exist(card_id)?;
        card.mark_in_progress();
        let card = merge(card, request);
        self.store.save(&card)?;
        info!("event=card_update module=service status=ok card_id={card_id}");
        Ok(())
    }

    /// Raises every card balance by `BALANCE_INCREASE_RATE` in one batch.
    ///
    /// Deleted cards are included. When any balance overflows, nothing is
    /// written. Nothing is compensated when the batch write itself fails.
    pub fn increase_card_balances(&self) -> CardServiceResult<()> {
        info!("event=card_balance_increase module=service status=start");
        let mut cards = self.store.find_all()?;
        for card in &mut cards {
            card.balance = increased_balance(card.balance).ok_or_else(|| {
                let card_id = format_id(card.id);
                error!(
                    "event=card_balance_increase module=service status=error card_id={card_id} error_code=balance_overflow"
                );
                RepoError::InvalidData(format!(
                    "balance of card {card_id} overflows when increased"
                ))
            })?;
        }
        self.store.save_all(&cards)?;
        info!(
            "event=card_balance_increase module=service status=ok count={} deleted_count={}",
            cards.len(),
            cards.iter().filter(|card| card.is_deleted()).count()
        );
        Ok(())
    }

    fn fetch_card_if_exist(&self, card_id: CardId) -> CardServiceResult<Card> {
        self.store.find_by_id(card_id)?.ok_or_else(|| {
            error!(
                "event=card_fetch module=service status=error card_id={card_id} error_code={CARD_NOT_FOUND_CODE}"
            );
            CardServiceError::NotFound(card_id)
        })
    }
}

/// `balance + balance * BALANCE_INCREASE_RATE`, or `None` on overflow.
///
/// Exact while the result fits in 28 fractional digits. Each increase adds
/// two digits of scale, so deeper results are rounded to 28 places.
pub fn increased_balance(balance: Decimal) -> Option<Decimal> {
    balance
        .checked_mul(BALANCE_INCREASE_RATE)
        .and_then(|increase| balance.checked_add(increase))
}

fn format_id(id: Option<CardId>) -> String {
    id.map_or_else(|| "none".to_string(), |id| id.to_string())
}

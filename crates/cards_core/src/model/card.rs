//! Card domain model.
//!
//! # Responsibility
//! - Define the canonical card record persisted by stores.
//! - Define the optional-field patch used by create/update use-cases.
//! - Provide pure field-copy mappings between request, record and response.
//!
//! # Invariants
//! - `id` is `None` only before the first save and never changes afterwards.
//! - `status` changes only through `mark_in_progress` and `soft_delete`.
//! - Patch merge overwrites a field only when the patch carries a value.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Store-assigned numeric identifier.
pub type CardId = i64;

/// Card lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardStatus {
    /// Freshly created, never updated.
    #[default]
    Created,
    /// Updated at least once after creation.
    InProgress,
    /// Soft-deleted; the record is kept in storage.
    Deleted,
}

/// Canonical persisted card record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Assigned by the store on first save.
    pub id: Option<CardId>,
    pub card_number: Option<String>,
    pub cardholder_name: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub cvv: Option<String>,
    pub card_type: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub balance: Decimal,
    pub status: CardStatus,
}

/// Optional-field patch applied to a card.
///
/// An absent field means "leave unchanged". There is no way to clear a
/// stored value through a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardPatch {
    pub card_number: Option<String>,
    pub cardholder_name: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub cvv: Option<String>,
    pub card_type: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub balance: Option<Decimal>,
}

/// Request shape used by both create and update use-cases.
pub type CreateCardRequest = CardPatch;

/// Read model returned to service callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardResponse {
    pub id: Option<CardId>,
    pub card_number: Option<String>,
    pub cardholder_name: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub cvv: Option<String>,
    pub card_type: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub balance: Decimal,
    pub status: CardStatus,
}

impl Card {
    /// Builds an unsaved card from a create request.
    ///
    /// # Invariants
    /// - `id` is `None` and `status` is `CardStatus::Created`.
    /// - A missing balance is stored as zero.
    pub fn from_request(request: &CreateCardRequest) -> Self {
        Self {
            id: None,
            card_number: request.card_number.clone(),
            cardholder_name: request.cardholder_name.clone(),
            expiry_date: request.expiry_date,
            cvv: request.cvv.clone(),
            card_type: request.card_type.clone(),
            issue_date: request.issue_date,
            balance: request.balance.unwrap_or(Decimal::ZERO),
            status: CardStatus::default(),
        }
    }

    /// Overwrites every field the patch carries a value for.
    ///
    /// Does not touch `id` or `status`.
    pub fn apply_patch(&mut self, patch: &CardPatch) {
        if let Some(card_number) = &patch.card_number {
            self.card_number = Some(card_number.clone());
        }
        if let Some(cardholder_name) = &patch.cardholder_name {
            self.cardholder_name = Some(cardholder_name.clone());
        }
        if let Some(expiry_date) = patch.expiry_date {
            self.expiry_date = Some(expiry_date);
        }
        if let Some(cvv) = &patch.cvv {
            self.cvv = Some(cvv.clone());
        }
        if let Some(card_type) = &patch.card_type {
            self.card_type = Some(card_type.clone());
        }
        if let Some(issue_date) = patch.issue_date {
            self.issue_date = Some(issue_date);
        }
        if let Some(balance) = patch.balance {
            self.balance = balance;
        }
    }

    /// Moves the card to `InProgress`.
    pub fn mark_in_progress(&mut self) {
        self.status = CardStatus::InProgress;
    }

    /// Marks the card as softly deleted.
    pub fn soft_delete(&mut self) {
        self.status = CardStatus::Deleted;
    }

    /// Returns whether the card carries the `Deleted` status.
    pub fn is_deleted(&self) -> bool {
        self.status == CardStatus::Deleted
    }
}

/// Pure merge of a patch into an existing card.
pub fn merge(mut existing: Card, patch: &CardPatch) -> Card {
    existing.apply_patch(patch);
    existing
}

impl From<&Card> for CardResponse {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id,
            card_number: card.card_number.clone(),
            cardholder_name: card.cardholder_name.clone(),
            expiry_date: card.expiry_date,
            cvv: card.cvv.clone(),
            card_type: card.card_type.clone(),
            issue_date: card.issue_date,
            balance: card.balance,
            status: card.status,
        }
    }
}

impl From<Card> for CardResponse {
    fn from(card: Card) -> Self {
        Self {
            id: card.id,
            card_number: card.card_number,
            cardholder_name: card.cardholder_name,
            expiry_date: card.expiry_date,
            cvv: card.cvv,
            card_type: card.card_type,
            issue_date: card.issue_date,
            balance: card.balance,
            status: card.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{merge, Card, CardPatch, CardStatus};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[test]
    fn empty_patch_leaves_card_unchanged() {
        let card = Card::from_request(&CardPatch {
            card_number: Some("4111111111111111".to_string()),
            balance: Some(Decimal::new(1250, 2)),
            ..CardPatch::default()
        });

        let merged = merge(card.clone(), &CardPatch::default());
        assert_eq!(merged, card);
    }

    #[test]
    fn patch_overwrites_only_present_fields() {
        let card = Card::from_request(&CardPatch {
            card_number: Some("4111111111111111".to_string()),
            cardholder_name: Some("A. Holder".to_string()),
            cvv: Some("123".to_string()),
            ..CardPatch::default()
        });
        let expiry = NaiveDate::from_ymd_opt(2030, 1, 31).unwrap();

        let merged = merge(
            card,
            &CardPatch {
                cvv: Some("999".to_string()),
                expiry_date: Some(expiry),
                ..CardPatch::default()
            },
        );

        assert_eq!(merged.card_number.as_deref(), Some("4111111111111111"));
        assert_eq!(merged.cardholder_name.as_deref(), Some("A. Holder"));
        assert_eq!(merged.cvv.as_deref(), Some("999"));
        assert_eq!(merged.expiry_date, Some(expiry));
        assert_eq!(merged.status, CardStatus::Created);
    }
}

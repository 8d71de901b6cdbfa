//! In-memory card store.
//!
//! Uses `RefCell` interior mutability since the core is single-threaded, so
//! the `CardStore` trait can keep `&self` receivers.

use crate::model::card::{Card, CardId};
use crate::repo::card_repo::{CardStore, RepoError, RepoResult};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// `BTreeMap`-backed store with sequential ids starting at 1.
#[derive(Debug)]
pub struct InMemoryCardStore {
    cards: RefCell<BTreeMap<CardId, Card>>,
    /// `None` once `CardId::MAX` has been handed out.
    next_id: Cell<Option<CardId>>,
    simulate_write_error: Cell<bool>,
}

impl Default for InMemoryCardStore {
    fn default() -> Self {
        Self {
            cards: RefCell::new(BTreeMap::new()),
            next_id: Cell::new(Some(1)),
            simulate_write_error: Cell::new(false),
        }
    }
}

impl InMemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with `RepoError::Store`.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    pub fn len(&self) -> usize {
        self.cards.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.borrow().is_empty()
    }

    fn check_writable(&self) -> RepoResult<()> {
        if self.simulate_write_error.get() {
            return Err(RepoError::Store("simulated write error".to_string()));
        }
        Ok(())
    }

    fn insert(&self, card: &Card) -> RepoResult<Card> {
        let id = match card.id {
            Some(id) => id,
            None => self
                .next_id
                .get()
                .ok_or_else(|| RepoError::Store("card id space exhausted".to_string()))?,
        };
        if self.next_id.get().is_some_and(|next| id >= next) {
            self.next_id.set(id.checked_add(1));
        }

        let saved = Card {
            id: Some(id),
            ..card.clone()
        };
        self.cards.borrow_mut().insert(id, saved.clone());
        Ok(saved)
    }
}

impl CardStore for InMemoryCardStore {
    fn save(&self, card: &Card) -> RepoResult<Card> {
        self.check_writable()?;
        self.insert(card)
    }

    fn save_all(&self, cards: &[Card]) -> RepoResult<Vec<Card>> {
        self.check_writable()?;
        cards.iter().map(|card| self.insert(card)).collect()
    }

    fn find_by_id(&self, id: CardId) -> RepoResult<Option<Card>> {
        Ok(self.cards.borrow().get(&id).cloned())
    }

    fn find_all(&self) -> RepoResult<Vec<Card>> {
        Ok(self.cards.borrow().values().cloned().collect())
    }
}

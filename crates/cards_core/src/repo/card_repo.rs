//! Card store contract and SQLite implementation.
//!
//! # Responsibility
//! - Define the key-value capability the card service depends on.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `save` on a card without `id` inserts and returns the assigned id.
//! - `save` on a card with `id` upserts that exact row.
//! - Read paths reject unparsable persisted values instead of masking them.

use crate::db::schema::ensure_card_schema;
use crate::model::card::{Card, CardId, CardStatus};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const CARD_SELECT_SQL: &str = "SELECT
    id,
    card_number,
    cardholder_name,
    expiry_date,
    cvv,
    card_type,
    issue_date,
    balance,
    status
FROM cards";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub type RepoResult<T> = Result<T, RepoError>;

/// Store error for card persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite error.
    Sqlite(rusqlite::Error),
    /// The database was written by a newer binary.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Persisted data cannot be converted to a valid card.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Non-SQL backend failure.
    Store(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "cards schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted card data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "card store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "card store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "card store requires column `{column}` in table `{table}`"
            ),
            Self::Store(message) => write!(f, "card store failure: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Persistence capability required by `CardService`.
pub trait CardStore {
    /// Inserts or updates one card and returns its persisted form.
    fn save(&self, card: &Card) -> RepoResult<Card>;
    /// Inserts or updates every card in one batch.
    fn save_all(&self, cards: &[Card]) -> RepoResult<Vec<Card>>;
    /// Looks up one card by id.
    fn find_by_id(&self, id: CardId) -> RepoResult<Option<Card>>;
    /// Returns every stored card in ascending id order.
    fn find_all(&self) -> RepoResult<Vec<Card>>;
}

impl<S: CardStore + ?Sized> CardStore for &S {
    fn save(&self, card: &Card) -> RepoResult<Card> {
        (**self).save(card)
    }

    fn save_all(&self, cards: &[Card]) -> RepoResult<Vec<Card>> {
        (**self).save_all(cards)
    }

    fn find_by_id(&self, id: CardId) -> RepoResult<Option<Card>> {
        (**self).find_by_id(id)
    }

    fn find_all(&self) -> RepoResult<Vec<Card>> {
        (**self).find_all()
    }
}

/// SQLite-backed card store.
pub struct SqliteCardStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCardStore<'conn> {
    /// Constructs a store over a connection returned by `db::open_db*`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the `cards` schema was never upgraded.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema is
    ///   not the one this binary writes.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_card_schema(conn)?;
        Ok(Self { conn })
    }
}

impl CardStore for SqliteCardStore<'_> {
    fn save(&self, card: &Card) -> RepoResult<Card> {
        write_card(self.conn, card)
    }

    fn save_all(&self, cards: &[Card]) -> RepoResult<Vec<Card>> {
        let tx = self.conn.unchecked_transaction()?;
        let mut saved = Vec::with_capacity(cards.len());
        for card in cards {
            saved.push(write_card(&tx, card)?);
        }
        tx.commit()?;
        Ok(saved)
    }

    fn find_by_id(&self, id: CardId) -> RepoResult<Option<Card>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CARD_SELECT_SQL} WHERE id = ?1;"))?;
        let raw = stmt.query_row([id], read_raw_card).optional()?;
        raw.map(RawCard::into_card).transpose()
    }

    fn find_all(&self) -> RepoResult<Vec<Card>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CARD_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut cards = Vec::new();

        while let Some(row) = rows.next()? {
            cards.push(read_raw_card(row)?.into_card()?);
        }

        Ok(cards)
    }
}

fn write_card(conn: &Connection, card: &Card) -> RepoResult<Card> {
    let expiry_date = card.expiry_date.map(format_date);
    let issue_date = card.issue_date.map(format_date);
    let balance = card.balance.to_string();
    let status = card_status_to_db(card.status);

    let id = match card.id {
        None => {
            conn.execute(
                "INSERT INTO cards (
                    card_number,
                    cardholder_name,
                    expiry_date,
                    cvv,
                    card_type,
                    issue_date,
                    balance,
                    status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                params![
                    card.card_number.as_deref(),
                    card.cardholder_name.as_deref(),
                    expiry_date,
                    card.cvv.as_deref(),
                    card.card_type.as_deref(),
                    issue_date,
                    balance,
                    status,
                ],
            )?;
            conn.last_insert_rowid()
        }
        Some(id) => {
            conn.execute(
                "INSERT INTO cards (
                    id,
                    card_number,
                    cardholder_name,
                    expiry_date,
                    cvv,
                    card_type,
                    issue_date,
                    balance,
                    status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(id) DO UPDATE SET
                    card_number = excluded.card_number,
                    cardholder_name = excluded.cardholder_name,
                    expiry_date = excluded.expiry_date,
                    cvv = excluded.cvv,
                    card_type = excluded.card_type,
                    issue_date = excluded.issue_date,
                    balance = excluded.balance,
                    status = excluded.status,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![
                    id,
                    card.card_number.as_deref(),
                    card.cardholder_name.as_deref(),
                    expiry_date,
                    card.cvv.as_deref(),
                    card.card_type.as_deref(),
                    issue_date,
                    balance,
                    status,
                ],
            )?;
            id
        }
    };

    Ok(Card {
        id: Some(id),
        ..card.clone()
    })
}

/// Row values as stored, before domain parsing.
struct RawCard {
    id: CardId,
    card_number: Option<String>,
    cardholder_name: Option<String>,
    expiry_date: Option<String>,
    cvv: Option<String>,
    card_type: Option<String>,
    issue_date: Option<String>,
    balance: String,
    status: String,
}

fn read_raw_card(row: &Row<'_>) -> rusqlite::Result<RawCard> {
    Ok(RawCard {
        id: row.get("id")?,
        card_number: row.get("card_number")?,
        cardholder_name: row.get("cardholder_name")?,
        expiry_date: row.get("expiry_date")?,
        cvv: row.get("cvv")?,
        card_type: row.get("card_type")?,
        issue_date: row.get("issue_date")?,
        balance: row.get("balance")?,
        status: row.get("status")?,
    })
}

impl RawCard {
    fn into_card(self) -> RepoResult<Card> {
        let balance = Decimal::from_str(&self.balance).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid balance `{}` in cards.balance for id {}",
                self.balance, self.id
            ))
        })?;

        let status = parse_card_status(&self.status).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid status `{}` in cards.status for id {}",
                self.status, self.id
            ))
        })?;

        Ok(Card {
            id: Some(self.id),
            card_number: self.card_number,
            cardholder_name: self.cardholder_name,
            expiry_date: parse_date(self.expiry_date, "cards.expiry_date")?,
            cvv: self.cvv,
            card_type: self.card_type,
            issue_date: parse_date(self.issue_date, "cards.issue_date")?,
            balance,
            status,
        })
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(value: Option<String>, column: &'static str) -> RepoResult<Option<NaiveDate>> {
    value
        .map(|text| {
            NaiveDate::parse_from_str(&text, DATE_FORMAT)
                .map_err(|_| RepoError::InvalidData(format!("invalid date `{text}` in {column}")))
        })
        .transpose()
}

fn card_status_to_db(status: CardStatus) -> &'static str {
    match status {
        CardStatus::Created => "created",
        CardStatus::InProgress => "in_progress",
        CardStatus::Deleted => "deleted",
    }
}

fn parse_card_status(value: &str) -> Option<CardStatus> {
    match value {
        "created" => Some(CardStatus::Created),
        "in_progress" => Some(CardStatus::InProgress),
        "deleted" => Some(CardStatus::Deleted),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{card_status_to_db, parse_card_status, parse_date};
    use crate::model::card::CardStatus;

    #[test]
    fn status_db_values_round_trip() {
        for status in [
            CardStatus::Created,
            CardStatus::InProgress,
            CardStatus::Deleted,
        ] {
            assert_eq!(parse_card_status(card_status_to_db(status)), Some(status));
        }
        assert_eq!(parse_card_status("archived"), None);
    }

    #[test]
    fn parse_date_rejects_malformed_text() {
        assert!(parse_date(None, "cards.expiry_date").unwrap().is_none());
        assert!(parse_date(Some("2030-02-30".to_string()), "cards.expiry_date").is_err());
    }
}

use cards_core::{merge, Card, CardPatch, CardResponse, CardStatus, CreateCardRequest};
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde_json::json;

#[test]
fn card_from_request_sets_defaults() {
    let card = Card::from_request(&CreateCardRequest {
        card_number: Some("4242424242424242".to_string()),
        ..CreateCardRequest::default()
    });

    assert_eq!(card.id, None);
    assert_eq!(card.status, CardStatus::Created);
    assert_eq!(card.balance, dec!(0));
    assert_eq!(card.card_number.as_deref(), Some("4242424242424242"));
    assert!(!card.is_deleted());
}

#[test]
fn status_transitions_are_explicit() {
    let mut card = Card::from_request(&CardPatch::default());

    card.mark_in_progress();
    assert_eq!(card.status, CardStatus::InProgress);

    card.soft_delete();
    assert!(card.is_deleted());
}

#[test]
fn merge_never_touches_id_or_status() {
    let mut card = Card::from_request(&CardPatch::default());
    card.id = Some(12);
    card.soft_delete();

    let merged = merge(
        card,
        &CardPatch {
            card_type: Some("PREPAID".to_string()),
            ..CardPatch::default()
        },
    );

    assert_eq!(merged.id, Some(12));
    assert_eq!(merged.status, CardStatus::Deleted);
    assert_eq!(merged.card_type.as_deref(), Some("PREPAID"));
}

#[test]
fn request_with_missing_fields_deserializes_as_absent() {
    let request: CreateCardRequest =
        serde_json::from_value(json!({ "cvv": "111", "expiry_date": "2031-03-31" })).unwrap();

    assert_eq!(request.cvv.as_deref(), Some("111"));
    assert_eq!(request.expiry_date, NaiveDate::from_ymd_opt(2031, 3, 31));
    assert_eq!(request.card_number, None);
    assert_eq!(request.balance, None);
}

#[test]
fn response_serialization_uses_expected_wire_fields() {
    let mut card = Card::from_request(&CardPatch {
        card_number: Some("4000056655665556".to_string()),
        issue_date: NaiveDate::from_ymd_opt(2025, 2, 1),
        balance: Some(dec!(42.50)),
        ..CardPatch::default()
    });
    card.id = Some(3);
    card.mark_in_progress();

    let json = serde_json::to_value(CardResponse::from(&card)).unwrap();
    assert_eq!(json["id"], 3);
    assert_eq!(json["card_number"], "4000056655665556");
    assert_eq!(json["issue_date"], "2025-02-01");
    assert_eq!(json["balance"], "42.50");
    assert_eq!(json["status"], "IN_PROGRESS");
    assert!(json["cvv"].is_null());

    let decoded: CardResponse = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, CardResponse::from(card));
}

use cards_core::db::schema::{
    card_schema_version, ensure_card_schema, stored_schema_version, upgrade_card_schema,
    CARD_COLUMNS,
};
use cards_core::db::{open_db, open_db_in_memory};
use cards_core::{CardPatch, CardService, RepoError, SqliteCardStore};
use rusqlite::Connection;

#[test]
fn fresh_database_gets_current_card_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(stored_schema_version(&conn).unwrap(), card_schema_version());
    ensure_card_schema(&conn).unwrap();
}

#[test]
fn upgrade_is_a_noop_on_current_schema() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO cards (card_number) VALUES ('4000');", [])
        .unwrap();

    upgrade_card_schema(&mut conn).unwrap();

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM cards;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn cards_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cards.db");

    {
        let conn = open_db(&path).unwrap();
        let service = CardService::new(SqliteCardStore::try_new(&conn).unwrap());
        service.create_card(&CardPatch::default()).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let service = CardService::new(SqliteCardStore::try_new(&conn).unwrap());
    assert_eq!(service.get_cards().unwrap().len(), 1);
}

#[test]
fn newer_card_schema_is_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    let future_version = card_schema_version() + 1;
    Connection::open(&path)
        .unwrap()
        .pragma_update(None, "user_version", future_version)
        .unwrap();

    match open_db(&path) {
        Err(RepoError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        }) => {
            assert_eq!(db_version, future_version);
            assert_eq!(latest_supported, card_schema_version());
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("a newer schema must be rejected"),
    }

    let untouched = Connection::open(&path).unwrap();
    assert_eq!(stored_schema_version(&untouched).unwrap(), future_version);
}

#[test]
fn cards_table_has_every_store_column_and_new_card_defaults() {
    let conn = open_db_in_memory().unwrap();
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info('cards');")
        .unwrap();
    let columns: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .map(Result::unwrap)
        .collect();
    for column in CARD_COLUMNS {
        assert!(columns.iter().any(|name| name == column), "missing {column}");
    }

    conn.execute("INSERT INTO cards DEFAULT VALUES;", []).unwrap();
    let (balance, status): (String, String) = conn
        .query_row("SELECT balance, status FROM cards;", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(balance, "0");
    assert_eq!(status, "created");
}

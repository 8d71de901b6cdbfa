//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `cards_core` linkage.
//! - Drive the card service against a local database for sanity checks.
//!
//! Usage: `cards_cli [ping|list|increase-balances] [db_path]`
//!
//! Environment:
//! - `CARDS_DB_PATH`: SQLite file used when `db_path` is not given;
//!   in-memory database when neither is set.
//! - `CARDS_LOG_DIR`: absolute log directory; logging stays off when unset.
//! - `CARDS_LOG_LEVEL`: defaults to `cards_core::default_log_level()`.

use cards_core::db::{open_db, open_db_in_memory};
use cards_core::{CardService, SqliteCardStore};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_run module=cli status=error error={err}");
            eprintln!("cards_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    if let Ok(log_dir) = std::env::var("CARDS_LOG_DIR") {
        let level = std::env::var("CARDS_LOG_LEVEL")
            .unwrap_or_else(|_| cards_core::default_log_level().to_string());
        cards_core::init_logging(&level, &log_dir)?;
    }

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "ping".to_string());
    let db_path = resolve_db_path(args.next(), std::env::var("CARDS_DB_PATH").ok());
    if command == "ping" {
        println!("cards_core ping={}", cards_core::ping());
        println!("cards_core version={}", cards_core::core_version());
        return Ok(());
    }

    let conn = match db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let service = CardService::new(SqliteCardStore::try_new(&conn)?);

    match command.as_str() {
        "list" => {
            for card in service.get_cards()? {
                println!(
                    "id={} status={:?} balance={}",
                    card.id.unwrap_or_default(),
                    card.status,
                    card.balance
                );
            }
        }
        "increase-balances" => {
            service.increase_card_balances()?;
            println!("balances increased");
        }
        other => return Err(format!("unknown command `{other}`").into()),
    }

    Ok(())
}

/// Positional path first, then `CARDS_DB_PATH`.
fn resolve_db_path(positional: Option<String>, env_path: Option<String>) -> Option<String> {
    positional
        .or(env_path)
        .filter(|path| !path.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::resolve_db_path;

    #[test]
    fn positional_db_path_wins_over_environment() {
        assert_eq!(
            resolve_db_path(Some("cli.db".to_string()), Some("env.db".to_string())).as_deref(),
            Some("cli.db")
        );
        assert_eq!(
            resolve_db_path(None, Some("env.db".to_string())).as_deref(),
            Some("env.db")
        );
    }

    #[test]
    fn missing_or_blank_db_path_means_in_memory() {
        assert_eq!(resolve_db_path(None, None), None);
        assert_eq!(resolve_db_path(Some("  ".to_string()), None), None);
    }
}

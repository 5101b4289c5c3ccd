//! Text-menu front end for the book catalog.
//!
//! # Responsibility
//! - Map command-line flags onto a `CatalogConfig`.
//! - Hand stdin/stdout to the menu loop; all catalog rules live in core.

mod menu;

use book_catalog_core::{
    default_log_level, init_logging, open_catalog, CatalogConfig, ConsistencyMode,
};
use clap::{Parser, ValueEnum};
use log::info;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendArg {
    /// One JSON document rewritten on every change
    Snapshot,
    /// SQLite database with a unique ISBN index
    Sqlite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Track read/unread status
    Read,
    /// Enforce unique ISBNs
    Isbn,
}

#[derive(Debug, Parser)]
#[command(name = "book-catalog")]
#[command(about = "Personal book catalog", long_about = None)]
struct Cli {
    /// Storage backend
    #[arg(long, value_enum, default_value_t = BackendArg::Snapshot)]
    backend: BackendArg,

    /// Consistency mode of the catalog
    #[arg(long, value_enum, default_value_t = ModeArg::Read)]
    mode: ModeArg,

    /// Absolute directory for rotating log files (logging is off without it)
    #[arg(long)]
    log_dir: Option<String>,

    /// Catalog location (default: library.json, or library.sqlite3 for sqlite)
    path: Option<PathBuf>,
}

impl Cli {
    fn catalog_config(&self) -> CatalogConfig {
        let mode = match self.mode {
            ModeArg::Read => ConsistencyMode::ReadStatus,
            ModeArg::Isbn => ConsistencyMode::UniqueIsbn,
        };
        match self.backend {
            BackendArg::Snapshot => CatalogConfig::snapshot(
                self.path.clone().unwrap_or_else(|| PathBuf::from("library.json")),
                mode,
            ),
            BackendArg::Sqlite => CatalogConfig::sqlite(
                self.path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("library.sqlite3")),
                mode,
            ),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        if let Err(err) = init_logging(default_log_level(), log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let config = cli.catalog_config();
    let store = match open_catalog(&config) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("error: cannot open catalog: {err}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        "event=cli_start module=cli status=ok backend={} mode={}",
        store.backend_kind().as_str(),
        store.mode()
    );

    if let Some(err) = store.recovered_from() {
        println!("Error loading library file ({err}). Starting with an empty library.");
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    match menu::run(&store, stdin.lock(), stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: terminal I/O failed: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use book_catalog_core::{BackendConfig, ConsistencyMode};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn defaults_to_read_status_snapshot() {
        let cli = Cli::parse_from(["book-catalog"]);
        let config = cli.catalog_config();
        assert_eq!(
            config.backend,
            BackendConfig::Snapshot {
                path: PathBuf::from("library.json")
            }
        );
        assert_eq!(config.mode, ConsistencyMode::ReadStatus);
    }

    #[test]
    fn sqlite_flags_map_to_sqlite_config() {
        let cli = Cli::parse_from([
            "book-catalog",
            "--backend",
            "sqlite",
            "--mode",
            "isbn",
            "books.db",
        ]);
        let config = cli.catalog_config();
        assert_eq!(
            config.backend,
            BackendConfig::Sqlite {
                path: PathBuf::from("books.db")
            }
        );
        assert_eq!(config.mode, ConsistencyMode::UniqueIsbn);
    }
}

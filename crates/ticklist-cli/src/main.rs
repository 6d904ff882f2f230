mod cli;
mod config;
mod storage;
mod tasks;
mod tui;

use crate::cli::ConfigCommand;
use clap::Parser;
use color_eyre::Result;
use ticklist_core::storage::KeyValueStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Entry point wiring the CLI to the store and the TUI.
fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let config = config::load()?;
    match cli.command.unwrap_or(cli::Command::Tui) {
        cli::Command::Tui => tui::launch(storage::open_task_store(&config)?)?,
        cli::Command::Version => print_version(),
        cli::Command::Health => run_health_check(&config)?,
        cli::Command::Config(ConfigCommand::Init) => init_config(&config)?,
        cli::Command::Task(cmd) => tasks::handle(cmd, &config)?,
    }

    Ok(())
}

fn init_tracing() {
    // Respect user-provided filters; default to warn so command output stays clean.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_version() {
    println!("ticklist {}", env!("CARGO_PKG_VERSION"));
}

/// Runs a quick read/write check against the configured data directory.
fn run_health_check(config: &config::Config) -> Result<()> {
    let store = storage::store_from_config(config)?;
    run_store_health(&store)?;
    println!("Storage: ok ({})", store.root().display());
    Ok(())
}

fn run_store_health<S: KeyValueStore>(store: &S) -> Result<()> {
    let check_key = "health/check";
    let payload = b"ok";
    store
        .put(check_key, payload)
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
    let round_trip = store
        .get(check_key)
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
    store
        .delete(check_key)
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;

    if round_trip != payload {
        color_eyre::eyre::bail!("storage round-trip failed");
    }
    Ok(())
}

fn init_config(config: &config::Config) -> Result<()> {
    let defaults = config::Config {
        storage_key: Some(config.slot().to_string()),
        ..config.clone()
    };
    let path = config::write_default_if_missing(&defaults)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage;
    use ticklist_core::storage::StorageError;

    #[test]
    fn health_check_with_test_store_succeeds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = storage::test_store(dir.path());
        run_store_health(&store).expect("health check should succeed");
        // The check cleans up after itself.
        assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }

    struct ReadOnly;

    impl KeyValueStore for ReadOnly {
        fn put(&self, _key: &str, _value: &[u8]) -> Result<(), StorageError> {
            Err(StorageError::Storage {
                reason: "read-only file system".into(),
            })
        }

        fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
            Err(StorageError::NotFound { key: key.into() })
        }

        fn delete(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn health_check_reports_write_failure() {
        let err = run_store_health(&ReadOnly).expect_err("should fail");
        assert!(err.to_string().contains("read-only file system"));
    }
}

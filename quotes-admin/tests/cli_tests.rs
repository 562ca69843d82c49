//! Command-line and environment resolution tests
//!
//! Environment variables are process-wide, so these run serially.

use clap::Parser;
use quotes_admin::cli::Cli;
use quotes_common::config::{AdminConfig, TomlConfig};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

fn clear_env() {
    env::remove_var("QUOTES_ROOT");
    env::remove_var("QUOTES_BIND");
}

#[test]
#[serial]
fn test_cli_flags() {
    clear_env();

    let cli = Cli::try_parse_from([
        "quotes-admin",
        "--root-folder",
        "/srv/quotes",
        "--bind",
        "0.0.0.0:8080",
    ])
    .unwrap();

    assert_eq!(cli.root_folder, Some(PathBuf::from("/srv/quotes")));
    assert_eq!(cli.bind.as_deref(), Some("0.0.0.0:8080"));
}

#[test]
#[serial]
fn test_env_fills_missing_flags() {
    clear_env();
    env::set_var("QUOTES_ROOT", "/var/lib/quotes");

    let cli = Cli::try_parse_from(["quotes-admin"]).unwrap();
    clear_env();

    assert_eq!(cli.root_folder, Some(PathBuf::from("/var/lib/quotes")));
    assert_eq!(cli.bind, None);
}

#[test]
#[serial]
fn test_flag_beats_env() {
    clear_env();
    env::set_var("QUOTES_BIND", "127.0.0.1:9000");

    let cli = Cli::try_parse_from(["quotes-admin", "--bind", "127.0.0.1:9100"]).unwrap();
    clear_env();

    assert_eq!(cli.bind.as_deref(), Some("127.0.0.1:9100"));
}

#[test]
#[serial]
fn test_cli_overrides_config_file() {
    clear_env();
    let file = TomlConfig::parse(
        r#"
        root_folder = "/from/file"
        bind = "127.0.0.1:7000"
        "#,
    )
    .unwrap();

    let cli = Cli::try_parse_from(["quotes-admin", "--root-folder", "/from/cli"]).unwrap();
    let config = AdminConfig::resolve(cli.root_folder, cli.bind, &file);

    assert_eq!(config.root_folder, PathBuf::from("/from/cli"));
    assert_eq!(config.bind, "127.0.0.1:7000");
    assert_eq!(config.database_path(), PathBuf::from("/from/cli/quotes.db"));
}

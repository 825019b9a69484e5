use clap::Parser;
use docsync_cli::{Cli, Command, HealthReport};
use docsync_store::DecodePolicy;
use docsync_sync::SyncErrorKind;
use docsync_types::Health;
use pretty_assertions::assert_eq;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["docsync"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

// ── Commands ──────────────────────────────────────────────────────

#[test]
fn parses_run() {
    let cli = parse(&["--mongo-uri", "mongodb://localhost:27017", "run"]);
    assert_eq!(cli.command, Command::Run);
    assert!(!cli.verbose);
}

#[test]
fn parses_watch_with_interval() {
    let cli = parse(&["watch", "--interval-secs", "60", "-v"]);
    assert_eq!(cli.command, Command::Watch { interval_secs: 60 });
    assert!(cli.verbose);
}

#[test]
fn watch_interval_defaults_to_five_minutes() {
    let cli = parse(&["watch"]);
    assert_eq!(cli.command, Command::Watch { interval_secs: 300 });
}

#[test]
fn parses_search_and_task() {
    assert_eq!(
        parse(&["search", "alien"]).command,
        Command::Search {
            query: "alien".to_string()
        }
    );
    assert_eq!(parse(&["task", "12"]).command, Command::Task { uid: 12 });
}

#[test]
fn missing_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["docsync"]).is_err());
}

// ── Config resolution ─────────────────────────────────────────────

#[test]
fn store_config_carries_flags() {
    let cli = parse(&[
        "--mongo-uri",
        "mongodb://db:27017",
        "--database",
        "cinema",
        "--collection",
        "movies",
        "--skip-bad-documents",
        "run",
    ]);
    let config = cli.connection.store_config().unwrap();
    assert_eq!(config.uri, "mongodb://db:27017");
    assert_eq!(config.database, "cinema");
    assert_eq!(config.collection, "movies");
    assert_eq!(config.decode_policy, DecodePolicy::Skip);
    assert_eq!(config.flag_field, "_meiliIndex");
}

#[test]
fn missing_mongo_uri_is_configuration_error() {
    let mut cli = parse(&["run"]);
    cli.connection.mongo_uri = None;
    let err = cli.connection.store_config().unwrap_err();
    assert_eq!(err.kind(), SyncErrorKind::Configuration);

    cli.connection.mongo_uri = Some("   ".to_string());
    assert!(cli.connection.store_config().is_err());
}

#[test]
fn sync_config_uses_index_and_window() {
    let cli = parse(&["--index", "films", "--window-days", "3", "run"]);
    let config = cli.connection.sync_config().unwrap();
    assert_eq!(config.index_name, "films");
    assert_eq!(config.primary_key, "id");
    assert_eq!(config.window.duration().num_days(), 3);
}

#[test]
fn negative_window_is_configuration_error() {
    let cli = parse(&["--window-days", "-2", "run"]);
    let err = cli.connection.sync_config().unwrap_err();
    assert_eq!(err.kind(), SyncErrorKind::Configuration);
}

#[test]
fn zero_window_is_disabled() {
    let cli = parse(&["--window-days", "0", "run"]);
    assert!(cli.connection.sync_config().unwrap().window.is_disabled());
}

#[test]
fn empty_api_key_is_dropped() {
    let mut cli = parse(&["--meili-host", "http://search:7700", "run"]);
    cli.connection.meili_api_key = Some(String::new());
    let config = cli.connection.meili_config();
    assert_eq!(config.host, "http://search:7700");
    assert!(config.api_key.is_none());
}

// ── Health report ─────────────────────────────────────────────────

#[test]
fn health_report_requires_both_services() {
    let healthy = HealthReport {
        store: Health::Available,
        search: Health::Available,
    };
    assert!(healthy.is_healthy());

    let degraded = HealthReport {
        store: Health::Available,
        search: Health::Unreachable("timeout".to_string()),
    };
    assert!(!degraded.is_healthy());
}

// tests/logging_filter.rs

use tracing_subscriber::filter::LevelFilter;

use batchfleet::cli::LogLevel;
use batchfleet::logging::build_filter;

#[test]
fn cli_level_wins_over_environment() {
    let filter = build_filter(Some(LogLevel::Warn), Some("trace"));
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
}

#[test]
fn environment_level_is_used_without_cli_flag() {
    let filter = build_filter(None, Some("DEBUG"));
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
}

#[test]
fn default_is_info() {
    assert_eq!(build_filter(None, None).max_level_hint(), Some(LevelFilter::INFO));
    assert_eq!(build_filter(None, Some("   ")).max_level_hint(), Some(LevelFilter::INFO));
}

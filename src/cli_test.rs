use std::time::Duration;

use clap::Parser;

use super::*;
use crate::config::DEFAULT_BACKEND_URL;
use crate::feed::StaleResponses;
use crate::gate::SubmitFailure;

// Assumes no HEYDOCKER_* variables are set in the test environment.
fn parse(args: &[&str]) -> Cli {
    let argv = std::iter::once("heydocker-panel").chain(args.iter().copied());
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn no_flags_yields_defaults() {
    let cli = parse(&[]);
    assert_eq!(cli.rows, DEFAULT_ROWS);
    let cfg = cli.panel_config().unwrap();
    assert_eq!(cfg.backend_url, DEFAULT_BACKEND_URL);
    assert_eq!(cfg, PanelConfig::default());
}

#[test]
fn flags_flow_into_config() {
    let cli = parse(&[
        "--backend-url",
        "http://backend.test:9000",
        "--poll-interval-ms",
        "250",
        "--stale-responses",
        "apply",
        "--submit-failure",
        "close",
        "--rows",
        "5",
    ]);
    let cfg = cli.panel_config().unwrap();
    assert_eq!(cfg.backend_url, "http://backend.test:9000");
    assert_eq!(cfg.poll_interval(), Duration::from_millis(250));
    assert_eq!(cfg.stale_responses, StaleResponses::Apply);
    assert_eq!(cfg.submit_failure, SubmitFailure::Close);
    assert_eq!(cli.rows, 5);
}

#[test]
fn zero_interval_flag_is_rejected() {
    let err = parse(&["--poll-interval-ms", "0"]).panel_config().unwrap_err();
    assert!(err.to_string().contains(ENV_POLL_INTERVAL_MS));
}

#[test]
fn non_numeric_timeout_flag_is_rejected() {
    let err = parse(&["--request-timeout-secs", "later"]).panel_config().unwrap_err();
    assert!(err.to_string().contains(ENV_REQUEST_TIMEOUT_SECS));
}

#[test]
fn setting_ignores_unknown_keys() {
    let cli = parse(&["--backend-url", "http://x.test"]);
    assert_eq!(cli.setting(ENV_BACKEND_URL).as_deref(), Some("http://x.test"));
    assert_eq!(cli.setting("HEYDOCKER_UNKNOWN"), None);
}

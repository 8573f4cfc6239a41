use linkscraper::handlers::*;
use linkscraper::command_argument_builder;
use linkscraper_core::report::ReportFormat;
use linkscraper_scanner::LabelPolicy;
use std::fs;
use tempfile::TempDir;
use tracing::Level;

fn crawl_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["linkscraper", "crawl"];
    argv.extend_from_slice(args);
    let matches = command_argument_builder()
        .try_get_matches_from(argv)
        .expect("arguments should parse");
    let (_, sub) = matches.subcommand().expect("crawl subcommand");
    sub.clone()
}

#[test]
fn test_parse_seed_url_with_scheme() {
    let url = parse_seed_url("https://example.com").unwrap();
    assert_eq!(url.as_str(), "https://example.com/");
}

#[test]
fn test_parse_seed_url_without_scheme_is_rejected() {
    let err = parse_seed_url("example.com").unwrap_err();
    assert!(err.contains("include the scheme"));
}

#[test]
fn test_parse_seed_url_rejects_other_schemes() {
    assert!(parse_seed_url("ftp://example.com/").is_err());
    assert!(parse_seed_url("mailto:someone@example.com").is_err());
}

#[test]
fn test_parse_seed_url_invalid() {
    assert!(parse_seed_url("not a valid url!!!").is_err());
    assert!(parse_seed_url("http://").is_err());
}

#[test]
fn test_log_level() {
    assert_eq!(log_level(false, 0), Level::WARN);
    assert_eq!(log_level(false, 1), Level::INFO);
    assert_eq!(log_level(false, 4), Level::DEBUG);
    assert_eq!(log_level(true, 0), Level::ERROR);
}

#[test]
fn test_cli_requires_url() {
    let result = command_argument_builder().try_get_matches_from(["linkscraper", "crawl"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_rejects_seed_without_scheme() {
    let result = command_argument_builder()
        .try_get_matches_from(["linkscraper", "crawl", "-u", "example.com"]);
    assert!(result.is_err());
}

#[test]
fn test_crawl_settings_defaults() {
    let matches = crawl_matches(&["-u", "https://a.example/"]);
    let (options, format, output) = crawl_settings_from_args(&matches, false).unwrap();

    assert_eq!(options.seed.as_str(), "https://a.example/");
    assert_eq!(options.timeout_secs, 10);
    assert_eq!(options.max_duration_minutes, 5);
    assert_eq!(options.label_policy, LabelPolicy::Accumulated);
    assert!(options.show_progress_bars);
    assert_eq!(format, ReportFormat::Text);
    assert!(output.is_none());
}

#[test]
fn test_crawl_settings_custom() {
    let matches = crawl_matches(&[
        "-u",
        "http://a.example/start",
        "--timeout",
        "3",
        "--max-duration",
        "0",
        "--labels",
        "first-seen",
        "-f",
        "json",
        "-o",
        "links.json",
    ]);
    let (options, format, output) = crawl_settings_from_args(&matches, true).unwrap();

    assert_eq!(options.timeout_secs, 3);
    assert_eq!(options.max_duration_minutes, 0);
    assert_eq!(options.label_policy, LabelPolicy::FirstSeen);
    assert!(!options.show_progress_bars);
    assert_eq!(format, ReportFormat::Json);
    assert_eq!(output.unwrap().to_str(), Some("links.json"));
}

#[test]
fn test_cli_rejects_unknown_label_policy() {
    let result = command_argument_builder().try_get_matches_from([
        "linkscraper",
        "crawl",
        "-u",
        "https://a.example/",
        "--labels",
        "newest",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_cli_label_policy_short_flag() {
    let matches = crawl_matches(&["-u", "https://a.example/", "-l", "accumulated"]);
    let (options, _, _) = crawl_settings_from_args(&matches, false).unwrap();
    assert_eq!(options.label_policy, LabelPolicy::Accumulated);
}

#[test]
fn test_cli_rejects_zero_timeout() {
    let result = command_argument_builder().try_get_matches_from([
        "linkscraper",
        "crawl",
        "-u",
        "https://a.example/",
        "--timeout",
        "0",
    ]);
    assert!(result.is_err());
}

#[tokio::test]
async fn test_handle_crawl_writes_report_for_unreachable_seed() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("links.txt");
    let path_arg = path.to_str().unwrap().to_string();

    let matches = crawl_matches(&["-u", "http://127.0.0.1:9/", "--timeout", "1", "-o", &path_arg]);
    handle_crawl(&matches, true).await?;

    let report = fs::read_to_string(&path)?;
    assert!(report.starts_with("Found 1 unique URL-label pairs"));
    assert!(report.contains("'<no label>' ('http://127.0.0.1:9/')"));
    assert!(report.contains("Failed fetches:  1"));

    Ok(())
}

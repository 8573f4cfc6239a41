use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use linkscraper_core::crawl::{CrawlOptions, execute_crawl};
use linkscraper_core::report::{ReportFormat, gather_report_data, generate_report, save_report};
use linkscraper_scanner::LabelPolicy;
use std::path::PathBuf;
use tracing::Level;
use url::Url;

/// Parse the seed argument. Only absolute http(s) URLs with a host are accepted.
pub fn parse_seed_url(input: &str) -> Result<Url, String> {
    let url = Url::parse(input.trim()).map_err(|e| {
        format!(
            "'{}' is not an absolute URL ({}); include the scheme, e.g. https://{}",
            input, e, input
        )
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!(
            "unsupported scheme '{}': only http and https can be crawled",
            url.scheme()
        ));
    }
    if url.host_str().is_none() {
        return Err(format!("'{}' has no host", input));
    }

    Ok(url)
}

/// Map the -q / -v flags to a log level. Warnings are shown by default.
pub fn log_level(quiet: bool, verbosity: u8) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

pub fn init_tracing(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Build crawl options, report format and output path from the `crawl` subcommand.
pub fn crawl_settings_from_args(
    args: &ArgMatches,
    quiet: bool,
) -> Result<(CrawlOptions, ReportFormat, Option<PathBuf>)> {
    let seed = args
        .get_one::<Url>("url")
        .cloned()
        .context("--url is required")?;

    let mut options = CrawlOptions::new(seed);
    if let Some(timeout) = args.get_one::<u64>("timeout") {
        options.timeout_secs = *timeout;
    }
    if let Some(minutes) = args.get_one::<u64>("max-duration") {
        options.max_duration_minutes = *minutes;
    }
    options.label_policy = args
        .get_one::<String>("labels")
        .and_then(|p| LabelPolicy::from_str(p))
        .unwrap_or_default();
    options.show_progress_bars = !quiet;

    let format = args
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let output = args.get_one::<PathBuf>("output").cloned();

    Ok((options, format, output))
}

pub async fn handle_crawl(args: &ArgMatches, quiet: bool) -> Result<()> {
    let (options, format, output) = crawl_settings_from_args(args, quiet)?;

    if !quiet {
        println!("\n{} Crawling {}", "→".blue().bold(), options.seed.as_str().bright_white());
        println!(
            "  Connection timeout: {}s, propagation window: {} min\n",
            options.timeout_secs, options.max_duration_minutes
        );
    }

    let outcome = execute_crawl(options, None).await?;
    let data = gather_report_data(&outcome);
    let report = generate_report(&data, format).context("failed to render report")?;

    match output {
        Some(path) => {
            save_report(&report, &path)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            if !quiet {
                println!(
                    "{} {} links written to {}",
                    "✓".green().bold(),
                    data.links.len(),
                    path.display()
                );
            }
        }
        None => print!("{}", report),
    }

    if outcome.is_incomplete() && !quiet {
        eprintln!(
            "{} {} crawl task(s) failed; the list may be incomplete",
            "⚠".yellow().bold(),
            outcome.failed_tasks
        );
    }

    Ok(())
}

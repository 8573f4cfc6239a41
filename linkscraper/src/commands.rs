use crate::CLAP_STYLING;
use crate::handlers::parse_seed_url;
use clap::{arg, command};

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("linkscraper")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("linkscraper")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress progress output and all log lines below errors")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" ... "Raise log verbosity (-v info, -vv debug)")
                .required(false)
                .global(true)
                .conflicts_with("quiet"),
        )
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl a site from a seed URL, following same-domain links only, and list \
                every distinct label/URL pair found.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("Absolute http(s) seed URL to start from")
                        .value_parser(parse_seed_url),
                )
                .arg(
                    arg!(-t --"timeout" <SECONDS>)
                        .required(false)
                        .help("Connection timeout per request in seconds")
                        .value_parser(clap::value_parser!(u64).range(1..))
                        .default_value("10"),
                )
                .arg(
                    arg!(-d --"max-duration" <MINUTES>)
                        .required(false)
                        .help(
                            "Stop spawning new page crawls after this many minutes (0 = seed page only)",
                        )
                        .value_parser(clap::value_parser!(u64))
                        .default_value("5"),
                )
                .arg(
                    arg!(-l --"labels" <POLICY>)
                        .required(false)
                        .help(
                            "Labels to report: accumulated (every label seen), first-seen (one per URL)",
                        )
                        .value_parser(["accumulated", "first-seen"])
                        .default_value("accumulated"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
}

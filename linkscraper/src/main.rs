use linkscraper::command_argument_builder;
use linkscraper::handlers::{handle_crawl, init_tracing, log_level};

#[tokio::main]
async fn main() {
    let mut cmd = command_argument_builder();
    let chosen_command = cmd.clone().get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbosity = chosen_command.get_count("verbose");

    init_tracing(log_level(quiet, verbosity));

    match chosen_command.subcommand() {
        Some(("crawl", primary_command)) => {
            if let Err(e) = handle_crawl(primary_command, quiet).await {
                eprintln!("✗ Crawl failed: {:#}", e);
                std::process::exit(1);
            }
        }
        _ => {
            // No subcommand provided, just show usage
            let _ = cmd.print_help();
            println!();
        }
    }
}

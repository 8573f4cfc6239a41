// Report generation from crawl outcomes

use linkscraper_scanner::{CrawlOutcome, Hyperlink};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub label: String,
    pub url: String,
    /// Text report line, rendered by the link's `Display`.
    #[serde(skip)]
    pub line: String,
}

impl From<&Hyperlink> for LinkEntry {
    fn from(link: &Hyperlink) -> Self {
        Self {
            label: link.label().to_string(),
            url: link.url().to_string(),
            line: link.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub unique_pairs: usize,
    pub unique_urls: usize,
    pub pages_visited: usize,
    pub failed_fetches: usize,
    pub failed_tasks: usize,
    pub duration_ms: u64,
    pub incomplete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub seed: String,
    pub site: String,
    pub summary: CrawlSummary,
    pub links: Vec<LinkEntry>,
}

pub fn gather_report_data(outcome: &CrawlOutcome) -> ReportData {
    let mut links = outcome.links.clone();
    links.sort();

    ReportData {
        seed: outcome.seed.url().to_string(),
        site: outcome.seed.site().to_string(),
        summary: CrawlSummary {
            unique_pairs: links.len(),
            unique_urls: outcome.unique_urls(),
            pages_visited: outcome.pages_visited,
            failed_fetches: outcome.failed_fetches,
            failed_tasks: outcome.failed_tasks,
            duration_ms: u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX),
            incomplete: outcome.is_incomplete(),
        },
        links: links.iter().map(LinkEntry::from).collect(),
    }
}

pub fn generate_report(data: &ReportData, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(data)),
        ReportFormat::Json => generate_json_report(data),
    }
}

pub fn generate_text_report(data: &ReportData) -> String {
    let mut report = String::new();

    report.push_str(&format!(
        "Found {} unique URL-label pairs (including the initial url) for the domain '{}' when visiting from '{}'\n",
        data.summary.unique_pairs, data.site, data.seed
    ));
    report.push_str("Here they are, sorted by label in the format '<label>' ('<URL>'):\n");

    for entry in &data.links {
        report.push_str(&entry.line);
        report.push('\n');
    }

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Unique URLs:     {}\n", data.summary.unique_urls));
    report.push_str(&format!("  Pages visited:   {}\n", data.summary.pages_visited));
    report.push_str(&format!("  Failed fetches:  {}\n", data.summary.failed_fetches));
    report.push_str(&format!(
        "  Duration:        {:.1} seconds\n",
        data.summary.duration_ms as f64 / 1000.0
    ));

    if data.summary.incomplete {
        report.push_str(&format!(
            "\n[!] {} crawl task(s) failed; this list may be incomplete.\n",
            data.summary.failed_tasks
        ));
    }

    report
}

pub fn generate_json_report(data: &ReportData) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Linkscraper",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "seed": data.seed,
            "site": data.site,
            "summary": data.summary,
            "links": data.links
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

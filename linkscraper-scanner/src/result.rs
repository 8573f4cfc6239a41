use crate::hyperlink::Hyperlink;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use url::Url;

/// Which labels end up in the returned link list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelPolicy {
    /// One entry per (url, label) pair recorded anywhere during the crawl.
    #[default]
    Accumulated,
    /// Only the label each URL was first claimed under, as collected by the task tree.
    FirstSeen,
}

impl LabelPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "accumulated" | "all" => Some(LabelPolicy::Accumulated),
            "first-seen" | "first" => Some(LabelPolicy::FirstSeen),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub seed: Hyperlink,
    /// Sorted by label, then URL.
    pub links: Vec<Hyperlink>,
    /// Registry contents at the end of the crawl.
    pub labels: HashMap<Url, BTreeSet<String>>,
    pub pages_visited: usize,
    pub failed_fetches: usize,
    pub failed_tasks: usize,
    pub elapsed: Duration,
}

impl CrawlOutcome {
    pub fn new(seed: Hyperlink) -> Self {
        Self {
            seed,
            links: Vec::new(),
            labels: HashMap::new(),
            pages_visited: 0,
            failed_fetches: 0,
            failed_tasks: 0,
            elapsed: Duration::from_secs(0),
        }
    }

    /// Distinct URLs recorded during the crawl, seed included.
    pub fn unique_urls(&self) -> usize {
        self.labels.len()
    }

    /// True when some subtree was lost to a task failure.
    pub fn is_incomplete(&self) -> bool {
        self.failed_tasks > 0
    }
}

/// Flatten a registry snapshot into one Hyperlink per (url, label) pair.
pub(crate) fn flatten_labels(labels: &HashMap<Url, BTreeSet<String>>) -> Vec<Hyperlink> {
    labels
        .iter()
        .flat_map(|(url, labels)| {
            labels
                .iter()
                .map(move |label| Hyperlink::new(url.clone(), label.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_policy_from_str() {
        assert_eq!(LabelPolicy::from_str("first-seen"), Some(LabelPolicy::FirstSeen));
        assert_eq!(LabelPolicy::from_str("ALL"), Some(LabelPolicy::Accumulated));
        assert_eq!(LabelPolicy::from_str("newest"), None);
    }

    #[test]
    fn test_flatten_labels_emits_every_pair() {
        let url = Url::parse("https://a.example/x").unwrap();
        let mut labels = HashMap::new();
        labels.insert(
            url.clone(),
            BTreeSet::from(["Bar".to_string(), "Foo".to_string()]),
        );

        let mut links = flatten_labels(&labels);
        links.sort();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].label(), "Bar");
        assert_eq!(links[1].label(), "Foo");
        assert!(links.iter().all(|l| l.url() == &url));
    }
}

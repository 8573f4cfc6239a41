use crate::hyperlink::Hyperlink;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::Mutex;
use url::Url;

/// Every URL scheduled during one crawl, with all labels seen for it.
///
/// Each operation runs under a single lock acquisition, so a check and the insert that
/// depends on it can never interleave with another task's. A URL present here is never
/// handed out for crawling again; only its label set keeps growing.
#[derive(Debug, Default)]
pub struct Registry {
    known: Mutex<HashMap<Url, BTreeSet<String>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the seed link. Called once by the root task before any claim.
    pub async fn register_seed(&self, seed: &Hyperlink) {
        let mut known = self.known.lock().await;
        known
            .entry(seed.url().clone())
            .or_default()
            .insert(seed.label().to_string());
    }

    /// Atomic test-and-set.
    ///
    /// Returns `true` if the URL was unknown and now belongs to the caller, who should
    /// crawl it. Returns `false` if it was already claimed; the label is merged in either
    /// way.
    pub async fn try_claim(&self, link: &Hyperlink) -> bool {
        let mut known = self.known.lock().await;
        match known.get_mut(link.url()) {
            Some(labels) => {
                labels.insert(link.label().to_string());
                false
            }
            None => {
                known.insert(
                    link.url().clone(),
                    BTreeSet::from([link.label().to_string()]),
                );
                true
            }
        }
    }

    pub(crate) async fn len(&self) -> usize {
        self.known.lock().await.len()
    }

    pub async fn snapshot(&self) -> HashMap<Url, BTreeSet<String>> {
        self.known.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn link(url: &str, label: &str) -> Hyperlink {
        Hyperlink::new(Url::parse(url).unwrap(), label)
    }

    #[tokio::test]
    async fn test_first_claim_wins() {
        let registry = Registry::new();
        assert!(registry.try_claim(&link("https://a.example/x", "Foo")).await);
        assert!(!registry.try_claim(&link("https://a.example/x", "Foo")).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_later_labels_are_merged() {
        let registry = Registry::new();
        let url = Url::parse("https://a.example/x").unwrap();

        assert!(registry.try_claim(&link(url.as_str(), "Foo")).await);
        assert!(!registry.try_claim(&link(url.as_str(), "Bar")).await);

        let labels = registry.snapshot().await.remove(&url).unwrap();
        assert_eq!(labels, BTreeSet::from(["Bar".to_string(), "Foo".to_string()]));
    }

    #[tokio::test]
    async fn test_seed_cannot_be_claimed() {
        let registry = Registry::new();
        registry.register_seed(&link("https://a.example/", "")).await;

        assert!(!registry.try_claim(&link("https://a.example/", "Home")).await);
        let labels = registry
            .snapshot()
            .await
            .remove(&Url::parse("https://a.example/").unwrap())
            .unwrap();
        assert_eq!(labels, BTreeSet::from([String::new(), "Home".to_string()]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_claims_have_single_winner() {
        let registry = Arc::new(Registry::new());

        let mut handles = Vec::new();
        for i in 0..64 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry
                    .try_claim(&link("https://a.example/contested", &format!("label {}", i)))
                    .await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        let labels = registry
            .snapshot()
            .await
            .remove(&Url::parse("https://a.example/contested").unwrap())
            .unwrap();
        assert_eq!(labels.len(), 64);
    }
}

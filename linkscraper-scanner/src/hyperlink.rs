use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use url::Url;

/// Derive the site identity of a URL: the last two dot-separated labels of its host.
///
/// `a.b.example.com` becomes `example.com`, a single-label host is returned as is, and a
/// URL without a host falls back to its full string form so that two hostless URLs only
/// share a site when they are textually identical.
pub fn site_identity(url: &Url) -> String {
    let Some(host) = url.host_str() else {
        return url.to_string();
    };

    // A fully qualified host (`example.com.`) names the same site as `example.com`.
    let trimmed = host.trim_end_matches('.');
    let host = if trimmed.is_empty() { host } else { trimmed };
    let parts: Vec<&str> = host.split('.').collect();
    let skip = parts.len().saturating_sub(2);
    parts[skip..].join(".")
}

/// A discovered link: target URL plus the anchor text it was found under.
#[derive(Debug, Clone)]
pub struct Hyperlink {
    url: Url,
    label: String,
    site: String,
}

impl Hyperlink {
    pub fn new(url: Url, label: impl Into<String>) -> Self {
        let site = site_identity(&url);
        Self {
            url,
            label: label.into(),
            site,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn shares_site_with(&self, other: &Hyperlink) -> bool {
        self.site == other.site
    }
}

// Identity is (url, label); `site` is derived from `url`.
impl PartialEq for Hyperlink {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url && self.label == other.label
    }
}

impl Eq for Hyperlink {}

impl Hash for Hyperlink {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
        self.label.hash(state);
    }
}

/// Ordered by label, then by URL.
impl Ord for Hyperlink {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label
            .cmp(&other.label)
            .then_with(|| self.url.as_str().cmp(other.url.as_str()))
    }
}

impl PartialOrd for Hyperlink {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Hyperlink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.label.trim().is_empty() {
            "<no label>"
        } else {
            self.label.as_str()
        };
        write!(f, "'{}' ('{}')", label, self.url)
    }
}

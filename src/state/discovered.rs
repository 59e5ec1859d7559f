use std::collections::HashSet;

/// Insertion-ordered set of article URLs gathered across listing pages
///
/// The set only ever grows; inserting a known URL is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredUrls {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl DiscoveredUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a URL, returning `true` if it was not already present
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.order.push(url);
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// URLs in the order they were first discovered
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }

    /// Set view, for comparisons that ignore discovery order
    pub fn as_set(&self) -> &HashSet<String> {
        &self.seen
    }
}

impl<S: Into<String>> FromIterator<S> for DiscoveredUrls {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut urls = Self::new();
        for url in iter {
            urls.insert(url);
        }
        urls
    }
}

impl<S: Into<String>> Extend<S> for DiscoveredUrls {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for url in iter {
            self.insert(url);
        }
    }
}

use std::collections::{BTreeMap, BTreeSet};

/// In-memory index of which pages link where.
///
/// Outgoing links are stored per page; backlinks are answered by scanning,
/// which keeps updates trivial and is cheap at personal-wiki sizes.
#[derive(Debug, Default)]
pub struct BacklinkIndex {
    outgoing: BTreeMap<String, BTreeSet<String>>,
}

impl BacklinkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the outgoing links recorded for `title`
    pub fn update_page(&mut self, title: &str, links: BTreeSet<String>) {
        self.outgoing.insert(title.to_string(), links);
    }

    /// Forget a page and its outgoing links
    ///
    /// Returns the links it had, if it was indexed
    pub fn remove_page(&mut self, title: &str) -> Option<BTreeSet<String>> {
        self.outgoing.remove(title)
    }

    /// Pages linked from `title`
    pub fn outgoing(&self, title: &str) -> Option<&BTreeSet<String>> {
        self.outgoing.get(title)
    }

    /// Pages that link to `title`, sorted
    pub fn backlinks(&self, title: &str) -> Vec<&str> {
        self.outgoing
            .iter()
            .filter(|(source, links)| source.as_str() != title && links.contains(title))
            .map(|(source, _)| source.as_str())
            .collect()
    }

    /// Linked titles that have no page in the index
    pub fn missing_pages(&self) -> BTreeSet<&str> {
        self.outgoing
            .values()
            .flatten()
            .map(String::as_str)
            .filter(|target| !self.outgoing.contains_key(*target))
            .collect()
    }

    /// Indexed page titles, sorted
    pub fn pages(&self) -> impl Iterator<Item = &str> {
        self.outgoing.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.outgoing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty()
    }
}

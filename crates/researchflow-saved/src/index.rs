use crate::registry::{SavedItemsRegistry, Subscription};
use researchflow_core::Result;
use std::collections::HashSet;

/// O(1) "is this URL saved?" lookups for a rendering view.
///
/// Built on mount and rebuilt whenever the registry reports a change.
#[derive(Debug)]
pub struct SavedIndex {
    urls: HashSet<String>,
    subscription: Subscription,
}

impl SavedIndex {
    pub fn build(registry: &SavedItemsRegistry) -> Result<Self> {
        let subscription = registry.subscribe();
        let mut index = Self {
            urls: HashSet::new(),
            subscription,
        };
        index.rebuild(registry)?;
        Ok(index)
    }

    /// Rebuild if a change was published since the last check
    pub fn refresh(&mut self, registry: &SavedItemsRegistry) -> Result<bool> {
        if !self.subscription.changed() {
            return Ok(false);
        }
        self.rebuild(registry)?;
        Ok(true)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    fn rebuild(&mut self, registry: &SavedItemsRegistry) -> Result<()> {
        self.urls = registry
            .list()?
            .into_iter()
            .map(|saved| saved.item.url)
            .collect();
        tracing::debug!(count = self.urls.len(), "saved index rebuilt");
        Ok(())
    }
}

// Source Registry
//
// Holds every enabled DiscoverSource by id and produces the descriptor list
// the host merges into its `extra_sources`.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::DiscoverSource;
use crate::models::DiscoverMediaSource;

/// Registry of discover sources, in registration order
#[derive(Default, Clone)]
pub struct SourceRegistry {
    sources: IndexMap<String, Arc<dyn DiscoverSource>>,
}

impl SourceRegistry {
    /// Create new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source, replacing any previous source with the same id
    ///
    /// Returns `true` when an existing source was replaced.
    pub fn register(&mut self, source: Arc<dyn DiscoverSource>) -> bool {
        let id = source.id().to_string();
        debug!(source = %id, "Registering discover source");
        self.sources.insert(id, source).is_some()
    }

    /// Get source by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<dyn DiscoverSource>> {
        self.sources.get(id).cloned()
    }

    /// All sources in registration order
    #[must_use]
    pub fn sources(&self) -> Vec<Arc<dyn DiscoverSource>> {
        self.sources.values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Build every descriptor, skipping (and logging) invalid ones
    pub async fn descriptors(&self, api_prefix: &str, api_token: &str) -> Vec<DiscoverMediaSource> {
        let mut out = Vec::with_capacity(self.sources.len());
        for source in self.sources.values() {
            let descriptor = source.descriptor(api_prefix, api_token).await;
            match descriptor.validate() {
                Ok(()) => out.push(descriptor),
                Err(e) => warn!(source = source.id(), error = %e, "Skipping invalid descriptor"),
            }
        }
        out
    }

    /// Append descriptors to the host's `extra_sources`, creating the list if absent
    pub async fn attach(
        &self,
        extra_sources: &mut Option<Vec<DiscoverMediaSource>>,
        api_prefix: &str,
        api_token: &str,
    ) {
        let descriptors = self.descriptors(api_prefix, api_token).await;
        extra_sources.get_or_insert_with(Vec::new).extend(descriptors);
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .finish()
    }
}

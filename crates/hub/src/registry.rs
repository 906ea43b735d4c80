//! Namespace to actor mapping.

use std::collections::HashMap;
use std::sync::Arc;

use ingest::IngestPipeline;
use parking_lot::RwLock;

use crate::actor::{spawn, HubConfig, HubHandle};

/// Lazily spawns one hub actor per namespace and hands out handles.
/// Namespaces never unload; a scrape namespace set is small and stable.
pub struct HubRegistry {
    pipeline: Arc<IngestPipeline>,
    config: HubConfig,
    hubs: RwLock<HashMap<String, HubHandle>>,
}

impl HubRegistry {
    pub fn new(pipeline: Arc<IngestPipeline>) -> Self {
        Self::with_config(pipeline, HubConfig::default())
    }

    pub fn with_config(pipeline: Arc<IngestPipeline>, config: HubConfig) -> Self {
        Self {
            pipeline,
            config,
            hubs: RwLock::new(HashMap::new()),
        }
    }

    pub fn handle(&self, namespace: &str) -> HubHandle {
        if let Some(handle) = self.hubs.read().get(namespace) {
            return handle.clone();
        }
        let mut hubs = self.hubs.write();
        // Another caller may have spawned while we waited for the lock.
        if let Some(handle) = hubs.get(namespace) {
            return handle.clone();
        }
        let handle = spawn(
            namespace.to_string(),
            Arc::clone(&self.pipeline),
            self.config.clone(),
        );
        hubs.insert(namespace.to_string(), handle.clone());
        handle
    }

    pub fn namespace_count(&self) -> usize {
        self.hubs.read().len()
    }
}

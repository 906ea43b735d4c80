//! Registry of crawl actors, one per site id.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use hub_core::Result;
use job_store::CrawlStateRecord;

use crate::actor::{spawn, CrawlDeps, CrawlHandle};

/// Looks up or spawns the actor for a site. Sites are independent actors
/// and run fully in parallel; within a site, the actor serializes all
/// operations.
pub struct CrawlRegistry {
    deps: Arc<CrawlDeps>,
    actors: RwLock<HashMap<String, CrawlHandle>>,
}

impl CrawlRegistry {
    pub fn new(deps: CrawlDeps) -> Self {
        Self {
            deps: Arc::new(deps),
            actors: RwLock::new(HashMap::new()),
        }
    }

    /// Get the handle for a site, spawning the actor (and resuming its
    /// persisted state) on first use.
    pub async fn handle(&self, site_id: &str) -> Result<CrawlHandle> {
        if let Some(handle) = self.actors.read().get(site_id) {
            return Ok(handle.clone());
        }

        // Load outside the lock; the store call suspends.
        let state = self
            .deps
            .store
            .load(site_id)
            .await?
            .unwrap_or_else(|| CrawlStateRecord::new(site_id));

        let mut actors = self.actors.write();
        // Another caller may have spawned while we were loading.
        if let Some(handle) = actors.get(site_id) {
            return Ok(handle.clone());
        }
        let handle = spawn(state, self.deps.clone());
        actors.insert(site_id.to_string(), handle.clone());
        Ok(handle)
    }

    /// Number of live actors (status surface).
    pub fn actor_count(&self) -> usize {
        self.actors.read().len()
    }
}

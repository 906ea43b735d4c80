//! Worker-backed discovery and fetching.
//!
//! The service does no network scraping of its own; browser-automation
//! workers connected over the socket do it. This bridge registers a
//! synthetic connection on the crawl namespace's hub, relays discovery and
//! fetch commands to a worker, and resolves the correlated replies. A
//! timed-out command surfaces as the hub's timeout error envelope.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use crawl::{CrawlFetcher, DiscoveryProvider, FetchedJob};
use hub::{ConnectionId, ConnectionSender, HubHandle};
use hub_core::limits::CONNECTION_SEND_BUFFER;
use hub_core::{ClientRole, Envelope, Error, Result};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;
use uuid::Uuid;

type Waiters = Arc<Mutex<HashMap<String, oneshot::Sender<Envelope>>>>;

pub struct WorkerScraper {
    hub: HubHandle,
    conn_id: ConnectionId,
    waiters: Waiters,
}

impl WorkerScraper {
    /// Register on the hub and start routing replies to callers.
    pub async fn connect(hub: HubHandle) -> Result<Arc<Self>> {
        let (tx, mut rx) = mpsc::channel(CONNECTION_SEND_BUFFER);
        let conn_id = hub
            .register(ClientRole::Observer, ConnectionSender::new(tx))
            .await?;

        let waiters: Waiters = Arc::new(Mutex::new(HashMap::new()));
        let router = Arc::clone(&waiters);
        tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                let Some(id) = envelope.command_id.clone() else {
                    continue;
                };
                if let Some(waiter) = router.lock().remove(&id) {
                    let _ = waiter.send(envelope);
                } else {
                    debug!(command = %id, "unclaimed scraper reply");
                }
            }
        });

        Ok(Arc::new(Self {
            hub,
            conn_id,
            waiters,
        }))
    }

    /// Dispatch one command and wait for its correlated reply.
    async fn call(&self, name: &str, payload: Value) -> Result<Value> {
        let command_id = Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        // Waiter goes in before dispatch so the reply cannot slip past it.
        self.waiters.lock().insert(command_id.clone(), tx);

        if let Err(e) = self
            .hub
            .dispatch(self.conn_id, name, Some(command_id.clone()), payload)
            .await
        {
            self.waiters.lock().remove(&command_id);
            return Err(e);
        }

        let envelope = rx
            .await
            .map_err(|_| Error::internal("scraper bridge connection closed"))?;
        if envelope.msg_type == "error" {
            let code = envelope
                .data
                .get("code")
                .and_then(Value::as_str)
                .unwrap_or("UNKNOWN");
            let message = envelope
                .data
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("worker error");
            return Err(Error::internal(format!("[{}] {}", code, message)));
        }
        Ok(envelope.data)
    }

    fn field<T: serde::de::DeserializeOwned>(data: &Value, key: &str) -> Result<T> {
        let value = data.get(key).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value)
            .map_err(|e| Error::internal(format!("malformed worker reply ({}): {}", key, e)))
    }
}

#[async_trait]
impl DiscoveryProvider for WorkerScraper {
    async fn discover(&self, base_url: &str, search_terms: &[String]) -> Result<Vec<String>> {
        let data = self
            .call(
                "discover_jobs",
                json!({ "base_url": base_url, "search_terms": search_terms }),
            )
            .await?;
        Self::field(&data, "urls")
    }
}

#[async_trait]
impl CrawlFetcher for WorkerScraper {
    async fn fetch_jobs(&self, urls: &[String]) -> Result<Vec<FetchedJob>> {
        let data = self.call("crawl_urls", json!({ "urls": urls })).await?;
        Self::field(&data, "jobs")
    }
}

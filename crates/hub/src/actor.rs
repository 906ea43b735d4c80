//! Per-namespace hub actor.
//!
//! One actor owns every connection and pending command for its namespace.
//! All mutation flows through the inbox, so registration, dispatch, replies
//! and the timeout sweep are serialized without locks. Frames from a single
//! connection are processed in arrival order because the socket task feeds
//! them into the inbox one at a time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use hub_core::limits::{COMMAND_TIMEOUT, HEARTBEAT_TIMEOUT, SWEEP_INTERVAL};
use hub_core::{
    ClientRole, Envelope, Error, HubErrorCode, InboundMessage, JobUrlSubmission, Result,
    WireMessage,
};
use ingest::IngestPipeline;
use serde_json::{json, Value};
use telemetry::metrics;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::connection::{ConnectionId, ConnectionRecord, ConnectionSender, PendingCommand};

/// Timing knobs for the actor, overridable in tests.
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub command_timeout: Duration,
    pub heartbeat_timeout: Duration,
    pub sweep_interval: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            command_timeout: COMMAND_TIMEOUT,
            heartbeat_timeout: HEARTBEAT_TIMEOUT,
            sweep_interval: SWEEP_INTERVAL,
        }
    }
}

/// Point-in-time actor state, for health reporting and tests.
#[derive(Debug, Clone, Copy)]
pub struct HubStats {
    pub connections: usize,
    pub workers: usize,
    pub pending_commands: usize,
}

enum HubMsg {
    Register {
        role: ClientRole,
        sender: ConnectionSender,
        reply: oneshot::Sender<ConnectionId>,
    },
    Inbound {
        conn_id: ConnectionId,
        text: String,
    },
    Dispatch {
        issuer: ConnectionId,
        name: String,
        command_id: Option<String>,
        payload: Value,
        reply: oneshot::Sender<Result<String>>,
    },
    Unregister {
        conn_id: ConnectionId,
    },
    Stats {
        reply: oneshot::Sender<HubStats>,
    },
}

/// Cheap cloneable handle to a namespace actor.
#[derive(Clone)]
pub struct HubHandle {
    namespace: Arc<str>,
    tx: mpsc::Sender<HubMsg>,
}

impl HubHandle {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Register a connection and return its assigned id. The sender is the
    /// hub's only route back to the peer.
    pub async fn register(&self, role: ClientRole, sender: ConnectionSender) -> Result<ConnectionId> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(HubMsg::Register { role, sender, reply })
            .await
            .map_err(|_| Error::internal("hub actor stopped"))?;
        rx.await.map_err(|_| Error::internal("hub actor stopped"))
    }

    /// Hand a raw text frame to the actor. Decoding and routing happen
    /// inside the actor so malformed input cannot skip the error path.
    pub async fn inbound(&self, conn_id: ConnectionId, text: String) {
        let _ = self.tx.send(HubMsg::Inbound { conn_id, text }).await;
    }

    /// Relay a command to a worker on behalf of `issuer`. Returns the
    /// correlation id the reply will carry.
    pub async fn dispatch(
        &self,
        issuer: ConnectionId,
        name: impl Into<String>,
        command_id: Option<String>,
        payload: Value,
    ) -> Result<String> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(HubMsg::Dispatch {
                issuer,
                name: name.into(),
                command_id,
                payload,
                reply,
            })
            .await
            .map_err(|_| Error::internal("hub actor stopped"))?;
        rx.await.map_err(|_| Error::internal("hub actor stopped"))?
    }

    pub async fn unregister(&self, conn_id: ConnectionId) {
        let _ = self.tx.send(HubMsg::Unregister { conn_id }).await;
    }

    pub async fn stats(&self) -> Result<HubStats> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(HubMsg::Stats { reply })
            .await
            .map_err(|_| Error::internal("hub actor stopped"))?;
        rx.await.map_err(|_| Error::internal("hub actor stopped"))
    }
}

pub(crate) fn spawn(
    namespace: String,
    pipeline: Arc<IngestPipeline>,
    config: HubConfig,
) -> HubHandle {
    let (tx, rx) = mpsc::channel(256);
    let handle = HubHandle {
        namespace: namespace.clone().into(),
        tx,
    };
    let actor = HubActor {
        namespace,
        pipeline,
        config,
        connections: HashMap::new(),
        pending: HashMap::new(),
    };
    tokio::spawn(actor.run(rx));
    handle
}

struct HubActor {
    namespace: String,
    pipeline: Arc<IngestPipeline>,
    config: HubConfig,
    connections: HashMap<ConnectionId, ConnectionRecord>,
    pending: HashMap<String, PendingCommand>,
}

impl HubActor {
    async fn run(mut self, mut rx: mpsc::Receiver<HubMsg>) {
        let mut sweep = tokio::time::interval(self.config.sweep_interval);
        sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else { break };
                    self.handle(msg).await;
                }
                _ = sweep.tick() => {
                    self.sweep();
                }
            }
        }
        debug!(namespace = %self.namespace, "hub actor stopped");
    }

    async fn handle(&mut self, msg: HubMsg) {
        match msg {
            HubMsg::Register { role, sender, reply } => {
                let conn_id = self.register(role, sender);
                let _ = reply.send(conn_id);
            }
            HubMsg::Inbound { conn_id, text } => {
                self.handle_frame(conn_id, &text).await;
            }
            HubMsg::Dispatch {
                issuer,
                name,
                command_id,
                payload,
                reply,
            } => {
                let _ = reply.send(self.dispatch(issuer, &name, command_id, payload));
            }
            HubMsg::Unregister { conn_id } => {
                self.unregister(conn_id);
            }
            HubMsg::Stats { reply } => {
                let _ = reply.send(self.stats());
            }
        }
    }

    fn stats(&self) -> HubStats {
        HubStats {
            connections: self.connections.len(),
            workers: self.connections.values().filter(|c| c.is_worker()).count(),
            pending_commands: self.pending.len(),
        }
    }

    fn register(&mut self, role: ClientRole, sender: ConnectionSender) -> ConnectionId {
        let conn_id = Uuid::new_v4();
        self.connections
            .insert(conn_id, ConnectionRecord::new(role, sender));
        metrics().connections_registered.inc();
        self.sync_gauges();
        info!(
            namespace = %self.namespace,
            connection = %conn_id,
            role = role.as_str(),
            "connection registered"
        );
        conn_id
    }

    fn unregister(&mut self, conn_id: ConnectionId) {
        if self.connections.remove(&conn_id).is_none() {
            return;
        }
        // Commands issued by the departed peer have nowhere to deliver;
        // release them now instead of waiting for the sweep.
        let released: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, cmd)| cmd.issuer == conn_id)
            .map(|(id, _)| id.clone())
            .collect();
        for command_id in &released {
            self.pending.remove(command_id);
        }
        if !released.is_empty() {
            debug!(
                namespace = %self.namespace,
                connection = %conn_id,
                count = released.len(),
                code = HubErrorCode::PeerDisconnected.code(),
                "released pending commands for departed issuer"
            );
        }
        self.sync_gauges();
        info!(namespace = %self.namespace, connection = %conn_id, "connection unregistered");
    }

    async fn handle_frame(&mut self, conn_id: ConnectionId, text: &str) {
        let message = InboundMessage::decode(text);
        match message.body {
            WireMessage::Register { role } => {
                // Re-registration over an open socket only updates the role.
                if let Some(record) = self.connections.get_mut(&conn_id) {
                    record.role = role;
                    record.last_heartbeat = Instant::now();
                    self.sync_gauges();
                }
            }
            WireMessage::Heartbeat => {
                if let Some(record) = self.connections.get_mut(&conn_id) {
                    record.last_heartbeat = Instant::now();
                }
            }
            WireMessage::JobResult(submission) => {
                self.handle_job_result(conn_id, message.command_id, submission)
                    .await;
            }
            WireMessage::Result { data } => {
                self.handle_result(conn_id, message.command_id, data);
            }
            WireMessage::Error { data } => {
                // A worker failing a command is still a reply; it releases
                // the pending entry and reaches the issuer as-is.
                self.route_reply(conn_id, message.command_id, "error", data);
            }
            WireMessage::Command { name, payload } => {
                if let Err(e) = self.dispatch(conn_id, &name, message.command_id.clone(), payload) {
                    self.send_error(conn_id, &e, message.command_id);
                }
            }
            WireMessage::Unknown { reason } => {
                metrics().malformed_messages.inc();
                warn!(
                    namespace = %self.namespace,
                    connection = %conn_id,
                    reason = %reason,
                    "malformed frame"
                );
                let err = Error::hub(HubErrorCode::MalformedMessage, reason);
                self.send_error(conn_id, &err, message.command_id);
            }
        }
    }

    /// Relay a command to an available worker and record the pending entry.
    fn dispatch(
        &mut self,
        issuer: ConnectionId,
        name: &str,
        command_id: Option<String>,
        payload: Value,
    ) -> Result<String> {
        let command_id = command_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        if self.pending.contains_key(&command_id) {
            return Err(Error::hub(
                HubErrorCode::DuplicateCorrelationId,
                format!("command {} already pending", command_id),
            ));
        }

        let envelope = Envelope::new(name, Some(command_id.clone()), payload);
        // Any connected worker will do. A failed enqueue means the peer is
        // gone; evict it and try the next one.
        loop {
            let Some(worker_id) = self
                .connections
                .iter()
                .find(|(_, c)| c.is_worker())
                .map(|(id, _)| *id)
            else {
                return Err(Error::hub(
                    HubErrorCode::NoWorkerAvailable,
                    "no worker connection available",
                ));
            };
            if self.connections[&worker_id].sender.send(envelope.clone()) {
                self.pending.insert(
                    command_id.clone(),
                    PendingCommand {
                        issuer,
                        issued_at: Instant::now(),
                    },
                );
                metrics().commands_dispatched.inc();
                self.sync_gauges();
                debug!(
                    namespace = %self.namespace,
                    command = %command_id,
                    worker = %worker_id,
                    name,
                    "command dispatched"
                );
                return Ok(command_id);
            }
            warn!(
                namespace = %self.namespace,
                worker = %worker_id,
                "worker send failed, evicting"
            );
            metrics().connections_evicted.inc();
            self.unregister(worker_id);
        }
    }

    /// Worker reply carrying job URLs: ingest first, then route the summary
    /// back to the issuer and fan it out to observers.
    async fn handle_job_result(
        &mut self,
        from: ConnectionId,
        command_id: Option<String>,
        submission: JobUrlSubmission,
    ) {
        let started = std::time::Instant::now();
        let summary = self.pipeline.submit_urls(&submission).await;
        metrics()
            .ingest_latency_ms
            .observe(started.elapsed().as_millis() as u64);
        let data = json!({
            "source": submission.source,
            "summary": summary,
        });
        self.route_reply(from, command_id, "job_result", data);
    }

    fn handle_result(&mut self, from: ConnectionId, command_id: Option<String>, data: Value) {
        self.route_reply(from, command_id, "result", data);
    }

    /// Deliver a worker reply to the pending issuer, then broadcast it to
    /// every observer except the issuer. The pending entry is released
    /// regardless of whether the issuer is still connected. A reply with no
    /// matching pending entry is logged and dropped, never fanned out.
    fn route_reply(
        &mut self,
        from: ConnectionId,
        command_id: Option<String>,
        msg_type: &str,
        data: Value,
    ) {
        let envelope = Envelope::new(msg_type, command_id.clone(), data);
        let pending = command_id.as_deref().and_then(|id| self.pending.remove(id));

        match pending {
            Some(cmd) => {
                let issuer_id = cmd.issuer;
                let waited = cmd.issued_at.elapsed().as_millis() as u64;
                metrics().dispatch_latency_ms.observe(waited);
                self.sync_gauges();
                let delivered = match self.connections.get(&issuer_id) {
                    Some(record) => record.sender.send(envelope.clone()),
                    None => false,
                };
                if delivered {
                    metrics().replies_matched.inc();
                } else {
                    metrics().replies_dropped.inc();
                    debug!(
                        namespace = %self.namespace,
                        command = ?command_id,
                        "issuer gone, reply dropped"
                    );
                    if self.connections.contains_key(&issuer_id) {
                        // Channel closed but the record lingers, evict it now
                        // rather than waiting for the heartbeat sweep.
                        metrics().connections_evicted.inc();
                        self.unregister(issuer_id);
                    }
                }
                self.broadcast(envelope, &[from, issuer_id]);
            }
            None => {
                metrics().replies_dropped.inc();
                debug!(
                    namespace = %self.namespace,
                    command = ?command_id,
                    "no pending command for reply"
                );
            }
        }
    }

    /// Scatter an envelope to every observer not in `exclude`. Send failures
    /// are collected and the offending connections evicted after the loop,
    /// so one dead peer cannot stop the fan-out.
    fn broadcast(&mut self, envelope: Envelope, exclude: &[ConnectionId]) {
        let mut dead = Vec::new();
        for (id, record) in &self.connections {
            if record.is_worker() || exclude.contains(id) {
                continue;
            }
            if record.sender.send(envelope.clone()) {
                metrics().broadcasts_sent.inc();
            } else {
                dead.push(*id);
            }
        }
        for id in dead {
            metrics().connections_evicted.inc();
            self.unregister(id);
        }
    }

    /// Periodic maintenance: release pending commands past the command
    /// timeout (notifying their issuers) and evict peers whose heartbeat
    /// has gone stale.
    fn sweep(&mut self) {
        let now = Instant::now();

        let expired: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, cmd)| now - cmd.issued_at > self.config.command_timeout)
            .map(|(id, _)| id.clone())
            .collect();
        for command_id in expired {
            if let Some(cmd) = self.pending.remove(&command_id) {
                metrics().commands_timed_out.inc();
                warn!(
                    namespace = %self.namespace,
                    command = %command_id,
                    "pending command timed out"
                );
                if let Some(record) = self.connections.get(&cmd.issuer) {
                    let err = Envelope::error(
                        HubErrorCode::CommandTimeout.code(),
                        "no reply before the command timeout",
                        Some(command_id),
                    );
                    record.sender.send(err);
                }
            }
        }

        let stale: Vec<ConnectionId> = self
            .connections
            .iter()
            .filter(|(_, c)| now - c.last_heartbeat > self.config.heartbeat_timeout)
            .map(|(id, _)| *id)
            .collect();
        for conn_id in stale {
            warn!(namespace = %self.namespace, connection = %conn_id, "heartbeat stale, evicting");
            metrics().connections_evicted.inc();
            self.unregister(conn_id);
        }

        self.sync_gauges();
    }

    fn send_error(&self, conn_id: ConnectionId, err: &Error, command_id: Option<String>) {
        if let Some(record) = self.connections.get(&conn_id) {
            let code = err.error_code().unwrap_or("INTERNAL");
            record
                .sender
                .send(Envelope::error(code, &err.to_string(), command_id));
        }
    }

    fn sync_gauges(&self) {
        let stats = self.stats();
        metrics().active_connections.set(stats.connections as u64);
        metrics().active_workers.set(stats.workers as u64);
        metrics().pending_commands.set(stats.pending_commands as u64);
    }
}

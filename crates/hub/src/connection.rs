//! Connection bookkeeping owned by a hub actor.

use hub_core::{ClientRole, Envelope};
use tokio::sync::mpsc;
use tokio::time::Instant;
use uuid::Uuid;

/// Opaque identifier assigned by the hub when a socket registers.
pub type ConnectionId = Uuid;

/// Write half of a connection. The socket task drains the channel and
/// owns the actual network I/O; the hub only ever enqueues.
#[derive(Clone)]
pub struct ConnectionSender {
    tx: mpsc::Sender<Envelope>,
}

impl ConnectionSender {
    pub fn new(tx: mpsc::Sender<Envelope>) -> Self {
        Self { tx }
    }

    /// Enqueue an envelope for the socket writer. Returns `false` when the
    /// peer is gone or its buffer is full; the caller decides whether that
    /// warrants eviction.
    pub fn send(&self, envelope: Envelope) -> bool {
        self.tx.try_send(envelope).is_ok()
    }
}

/// A registered peer as the hub actor sees it.
pub(crate) struct ConnectionRecord {
    pub role: ClientRole,
    pub sender: ConnectionSender,
    pub last_heartbeat: Instant,
}

impl ConnectionRecord {
    pub fn new(role: ClientRole, sender: ConnectionSender) -> Self {
        Self {
            role,
            sender,
            last_heartbeat: Instant::now(),
        }
    }

    pub fn is_worker(&self) -> bool {
        matches!(self.role, ClientRole::Worker)
    }
}

/// An in-flight command awaiting a worker reply, keyed by correlation id
/// in the actor's pending table.
pub(crate) struct PendingCommand {
    /// Connection that issued the command. Held by id, not by sender, so a
    /// disconnect between dispatch and reply degrades to log-and-drop.
    pub issuer: ConnectionId,
    pub issued_at: Instant,
}

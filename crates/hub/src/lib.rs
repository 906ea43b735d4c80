//! Real-time scrape coordination hub.
//!
//! Each namespace gets one actor that owns its socket connections and
//! in-flight commands. Commands are relayed to a connected worker, replies
//! are routed back to the issuer by correlation id and fanned out to
//! observers, and a periodic sweep releases timed-out commands and evicts
//! dead peers.

pub mod actor;
pub mod connection;
pub mod registry;

pub use actor::{HubConfig, HubHandle, HubStats};
pub use connection::{ConnectionId, ConnectionSender};
pub use registry::HubRegistry;

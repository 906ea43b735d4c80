//! Socket wire messages.
//!
//! Every frame is an envelope `{ type, commandId?, data }`. Inbound frames
//! decode into a closed set of variants; anything unrecognized or
//! unparseable lands in `Unknown` and is routed to the transport-error
//! path (structured error reply, no state mutation).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::job::JobUrlSubmission;

/// Raw envelope as it crosses the socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(rename = "commandId", default, skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn new(msg_type: impl Into<String>, command_id: Option<String>, data: Value) -> Self {
        Self {
            msg_type: msg_type.into(),
            command_id,
            data,
        }
    }

    /// Structured error reply, tagged with the offending correlation id
    /// when one was present.
    pub fn error(code: &str, message: &str, command_id: Option<String>) -> Self {
        Self::new(
            "error",
            command_id,
            serde_json::json!({ "code": code, "message": message }),
        )
    }

    pub fn to_json(&self) -> String {
        // Envelope contains only JSON-native types; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Connection role declared in the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientRole {
    Worker,
    Observer,
}

impl ClientRole {
    /// Unknown declared roles default to observer.
    pub fn from_declared(role: &str) -> Self {
        match role {
            "worker" => Self::Worker,
            _ => Self::Observer,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Observer => "observer",
        }
    }
}

/// Decoded inbound frame: the correlation id travels beside the body so the
/// error path can tag replies even when the body itself is malformed.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub command_id: Option<String>,
    pub body: WireMessage,
}

/// Closed set of recognized frame bodies.
#[derive(Debug, Clone)]
pub enum WireMessage {
    /// Handshake declaring the connection's role.
    Register { role: ClientRole },
    /// Liveness ping; updates the connection's last-heartbeat timestamp.
    Heartbeat,
    /// Worker result carrying discovered job URLs for ingestion.
    JobResult(JobUrlSubmission),
    /// Generic worker result relayed to the issuer and observers.
    Result { data: Value },
    /// Worker-reported failure for a relayed command; routed like a result.
    Error { data: Value },
    /// Free-form command to relay to a worker.
    Command { name: String, payload: Value },
    /// Unrecognized or unparseable frame; `reason` feeds the error reply.
    Unknown { reason: String },
}

impl InboundMessage {
    /// Decode a text frame. Never fails: malformed input becomes `Unknown`.
    pub fn decode(text: &str) -> Self {
        let envelope: Envelope = match serde_json::from_str(text) {
            Ok(env) => env,
            Err(e) => {
                return Self {
                    command_id: extract_command_id(text),
                    body: WireMessage::Unknown {
                        reason: format!("invalid envelope: {}", e),
                    },
                }
            }
        };

        let command_id = envelope.command_id.clone();
        let body = match envelope.msg_type.as_str() {
            "" => WireMessage::Unknown {
                reason: "missing message type".to_string(),
            },
            "register" => {
                let role = envelope
                    .data
                    .get("role")
                    .and_then(Value::as_str)
                    .unwrap_or("observer");
                WireMessage::Register {
                    role: ClientRole::from_declared(role),
                }
            }
            "heartbeat" => WireMessage::Heartbeat,
            "job_result" => match serde_json::from_value::<JobUrlSubmission>(envelope.data) {
                Ok(submission) => WireMessage::JobResult(submission),
                Err(e) => WireMessage::Unknown {
                    reason: format!("invalid job_result data: {}", e),
                },
            },
            "result" => WireMessage::Result {
                data: envelope.data,
            },
            "error" => WireMessage::Error {
                data: envelope.data,
            },
            other => WireMessage::Command {
                name: other.to_string(),
                payload: envelope.data,
            },
        };

        Self { command_id, body }
    }
}

/// Best-effort correlation-id recovery from a frame that failed full
/// envelope parsing, so the error reply can still be tagged.
fn extract_command_id(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;
    value
        .get("commandId")
        .and_then(Value::as_str)
        .map(str::to_string)
}

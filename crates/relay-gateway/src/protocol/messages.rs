//! Gateway message format
//!
//! The `{op, d, s, t}` envelope shared by every frame, and its text codec.

use super::opcodes::raw_opcode;
use super::{HelloPayload, IdentifyPayload, OpCode, PresencePayload};
use crate::error::DecodeError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Gateway message format
///
/// All frames sent over the gateway connection follow this format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayMessage {
    /// Operation code
    pub op: OpCode,

    /// Event data payload (`null` when absent)
    pub d: Value,

    /// Sequence number (only for op=0 Dispatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Event type (only for op=0 Dispatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewayMessage {
    /// Create a message with no sequence or event type
    #[must_use]
    pub fn new(op: OpCode, d: Value) -> Self {
        Self {
            op,
            d,
            s: None,
            t: None,
        }
    }

    // === Client Messages ===

    /// Create a Heartbeat message (op=1) echoing the last observed sequence
    #[must_use]
    pub fn heartbeat(last_sequence: Option<u64>) -> Self {
        Self::new(
            OpCode::Heartbeat,
            last_sequence.map_or(Value::Null, |s| Value::Number(s.into())),
        )
    }

    /// Create an Identify message (op=2)
    pub fn identify(payload: &IdentifyPayload) -> Result<Self, serde_json::Error> {
        Ok(Self::new(OpCode::Identify, serde_json::to_value(payload)?))
    }

    /// Create a Status Update message (op=3)
    pub fn status_update(presence: &PresencePayload) -> Result<Self, serde_json::Error> {
        Ok(Self::new(OpCode::StatusUpdate, serde_json::to_value(presence)?))
    }

    // === Server Messages ===

    /// Create a Dispatch message (op=0)
    #[must_use]
    pub fn dispatch(event_type: impl Into<String>, sequence: u64, data: Value) -> Self {
        Self {
            op: OpCode::Dispatch,
            d: data,
            s: Some(sequence),
            t: Some(event_type.into()),
        }
    }

    /// Create a Hello message (op=10)
    #[must_use]
    pub fn hello(payload: &HelloPayload) -> Self {
        Self::new(
            OpCode::Hello,
            serde_json::json!({ "heartbeat_interval": payload.heartbeat_interval }),
        )
    }

    /// Try to parse the Hello body (op=10)
    pub fn as_hello(&self) -> Option<HelloPayload> {
        if self.op != OpCode::Hello {
            return None;
        }
        HelloPayload::from_data(&self.d).ok()
    }

    // === Codec ===

    /// Encode into a text frame
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a raw frame
    ///
    /// Only the envelope is interpreted; `d` is passed through untouched.
    /// `op` and `s` are accepted as numbers or numeric strings.
    pub fn decode(frame: &[u8]) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_slice(frame)
            .map_err(|e| DecodeError::InvalidPayload(e.to_string()))?;

        let Value::Object(mut envelope) = value else {
            return Err(DecodeError::InvalidPayload(
                "frame is not a JSON object".to_string(),
            ));
        };

        let op = decode_opcode(&mut envelope)?;
        let s = decode_sequence(&mut envelope)?;
        let t = match envelope.remove("t") {
            None | Some(Value::Null) => None,
            Some(Value::String(t)) => Some(t),
            Some(other) => {
                return Err(DecodeError::InvalidPayload(format!(
                    "invalid event type: {other}"
                )))
            }
        };
        let d = envelope.remove("d").unwrap_or(Value::Null);

        Ok(Self { op, d, s, t })
    }
}

fn decode_opcode(envelope: &mut Map<String, Value>) -> Result<OpCode, DecodeError> {
    let raw = match envelope.remove("op") {
        None | Some(Value::Null) => return Err(DecodeError::MissingOpcode),
        Some(value) => {
            raw_opcode(&value).ok_or_else(|| DecodeError::InvalidOpcode(value.to_string()))?
        }
    };

    Ok(OpCode::from_raw(raw))
}

fn decode_sequence(envelope: &mut Map<String, Value>) -> Result<Option<u64>, DecodeError> {
    match envelope.remove("s") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| DecodeError::InvalidPayload(format!("invalid sequence: {n}"))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| DecodeError::InvalidPayload(format!("invalid sequence: {s:?}"))),
        Some(other) => Err(DecodeError::InvalidPayload(format!(
            "invalid sequence: {other}"
        ))),
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "GatewayMessage(op={}, t={}", self.op, t)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "GatewayMessage(op={})", self.op)
        }
    }
}

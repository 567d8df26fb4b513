use crate::connection::{Frame, MatchId};
use serde::Serialize;
use serde_json::Value;

/// Body of the error frame sent for an undecodable inbound frame.
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON payload";

/// Trait for getting the wire `type` name of a frame
pub trait EventType {
    fn event_type(&self) -> &'static str;
}

/// Every frame the server sends to a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Welcome,
    Subscribed {
        #[serde(rename = "matchId")]
        match_id: MatchId,
    },
    Unsubscribed {
        #[serde(rename = "matchId")]
        match_id: MatchId,
    },
    Error {
        message: String,
    },
    MatchCreated {
        data: Value,
    },
    Commentary {
        data: Value,
    },
}

impl ServerFrame {
    pub fn invalid_json() -> Self {
        ServerFrame::Error {
            message: INVALID_JSON_MESSAGE.to_string(),
        }
    }

    pub fn serialize(&self) -> Result<Frame, serde_json::Error> {
        Ok(Frame::from(serde_json::to_string(self)?))
    }
}

impl EventType for ServerFrame {
    fn event_type(&self) -> &'static str {
        match self {
            ServerFrame::Welcome => "welcome",
            ServerFrame::Subscribed { .. } => "subscribed",
            ServerFrame::Unsubscribed { .. } => "unsubscribed",
            ServerFrame::Error { .. } => "error",
            ServerFrame::MatchCreated { .. } => "match_created",
            ServerFrame::Commentary { .. } => "commentary",
        }
    }
}

/// The closed set of commands a client can send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Subscribe(MatchId),
    Unsubscribe(MatchId),
    /// Valid JSON that is not one of the above: unknown `type`, missing or
    /// non-integer `matchId`, or not an object at all.
    Unknown,
}

impl ClientCommand {
    /// Decodes one raw inbound frame. Only undecodable bytes are an error;
    /// every decodable value classifies as some command.
    pub fn decode(raw: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(raw)?;
        Ok(Self::classify(&value))
    }

    fn classify(value: &Value) -> Self {
        let Some(match_id) = value.get("matchId").and_then(integer_match_id) else {
            return ClientCommand::Unknown;
        };

        match value.get("type").and_then(Value::as_str) {
            Some("subscribe") => ClientCommand::Subscribe(match_id),
            Some("unsubscribe") => ClientCommand::Unsubscribe(match_id),
            _ => ClientCommand::Unknown,
        }
    }
}

/// Accepts any JSON number with no fractional part that fits a `MatchId`,
/// so `7` and `7.0` name the same match.
fn integer_match_id(value: &Value) -> Option<MatchId> {
    if let Some(id) = value.as_i64() {
        return Some(id);
    }

    let float = value.as_f64()?;
    let in_range = float >= MatchId::MIN as f64 && float < MatchId::MAX as f64;
    (float.fract() == 0.0 && in_range).then_some(float as MatchId)
}

/// An outbound frame together with who should receive it.
#[derive(Debug, Clone)]
pub struct Message {
    pub frame: ServerFrame,
    pub scope: MessageScope,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageScope {
    /// Send to every open connection
    Broadcast,
    /// Send to the connections subscribed to one match
    Match { match_id: MatchId },
}

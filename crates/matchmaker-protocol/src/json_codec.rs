//! JSON encoding/decoding for both endpoints.
//!
//! Decoding is two-pass: read the `message_type` discriminator first, then
//! decode the kind-specific payload from the same text. That keeps "not
//! JSON at all", "unknown kind" and "known kind with a bad payload"
//! distinguishable for logging.
//!
//! NOTE: one message per text frame. Framing is the transport's job.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::wire_types::{
    Envelope, PlayerInbound, RegisterServer, ServerInbound, PING, REGISTER, REQUEST_MATCH,
    UNREGISTER,
};

/// Errors that can arise when decoding/encoding a frame.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Not JSON, or missing/mistyped fields.
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed frame with a `message_type` this endpoint does not know.
    #[error("unknown message type: {0}")]
    UnknownMessageType(String),

    /// Payload parsed but a field is out of range.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),
}

// ============================================================================
// INBOUND
// ============================================================================

/// Decode a frame received on the server endpoint.
pub fn decode_server_message(text: &str) -> Result<ServerInbound, ProtocolError> {
    let base: Envelope = serde_json::from_str(text)?;

    match base.message_type.as_str() {
        PING => Ok(ServerInbound::Ping),
        REGISTER => {
            let register: RegisterServer = decode_payload(text)?;
            register.validate().map_err(ProtocolError::InvalidField)?;
            Ok(ServerInbound::Register(register))
        }
        UNREGISTER => Ok(ServerInbound::Unregister),
        _ => Err(ProtocolError::UnknownMessageType(base.message_type)),
    }
}

/// Decode a frame received on the player endpoint.
pub fn decode_player_message(text: &str) -> Result<PlayerInbound, ProtocolError> {
    let base: Envelope = serde_json::from_str(text)?;

    match base.message_type.as_str() {
        PING => Ok(PlayerInbound::Ping),
        REQUEST_MATCH => Ok(PlayerInbound::RequestMatch),
        _ => Err(ProtocolError::UnknownMessageType(base.message_type)),
    }
}

fn decode_payload<T: DeserializeOwned>(text: &str) -> Result<T, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

// ============================================================================
// OUTBOUND
// ============================================================================

/// Encode any message of this protocol into a JSON text frame.
pub fn encode<T: Serialize>(msg: &T) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(msg)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire_types::{PlayerOutbound, ServerOutbound};
    use matchmaker_core::TicketId;

    #[test]
    fn decodes_register() {
        let msg = decode_server_message(
            r#"{"message_type":"register","address":"10.1.2.3","port":7777,"capacity":4}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ServerInbound::Register(RegisterServer {
                address: "10.1.2.3".into(),
                port: 7777,
                capacity: 4,
            })
        );
    }

    #[test]
    fn register_missing_field_is_malformed() {
        let err = decode_server_message(r#"{"message_type":"register","address":"h"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Json(_)));
    }

    #[test]
    fn register_zero_capacity_is_rejected() {
        let err = decode_server_message(
            r#"{"message_type":"register","address":"h","port":1,"capacity":0}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidField("capacity")));
    }

    #[test]
    fn unknown_type_is_reported_by_name() {
        let err = decode_player_message(r#"{"message_type":"leave-queue"}"#).unwrap_err();
        match err {
            ProtocolError::UnknownMessageType(t) => assert_eq!(t, "leave-queue"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn not_json_is_malformed() {
        assert!(matches!(decode_player_message("ping"), Err(ProtocolError::Json(_))));
        assert!(matches!(decode_server_message("{}"), Err(ProtocolError::Json(_))));
    }

    #[test]
    fn server_endpoint_does_not_accept_player_kinds() {
        let err = decode_server_message(r#"{"message_type":"request-match"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownMessageType(_)));
    }

    #[test]
    fn encodes_outbound_with_kebab_case_tag() {
        let ticket = TicketId::new();
        let text = encode(&ServerOutbound::ServerAllocated { ticket_id: ticket }).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["message_type"], "server-allocated");
        assert_eq!(value["ticket_id"], ticket.to_string());

        let text = encode(&PlayerOutbound::Status { player_count: 3 }).unwrap();
        assert_eq!(text, r#"{"message_type":"status","player_count":3}"#);

        assert_eq!(encode(&PlayerOutbound::Ping).unwrap(), r#"{"message_type":"ping"}"#);
    }
}

//! matchmaker-protocol
//!
//! Wire-level encoding/decoding for the matchmaker.
//!
//! Both endpoints speak JSON text frames tagged with a `message_type`
//! discriminator.
//!
//! - [`wire_types`] : message kinds and payloads, per role and direction
//! - [`json_codec`] : discriminator-first decoding and encoding

pub mod wire_types;
pub mod json_codec;

pub use wire_types::{PlayerInbound, PlayerOutbound, RegisterServer, ServerInbound, ServerOutbound};

pub use json_codec::{
    ProtocolError,
    decode_player_message,
    decode_server_message,
    encode,
};

//! Codec trait and implementations for text frames.
//!
//! A "codec" (coder/decoder) converts between messages and the text that
//! travels in a WebSocket frame. Decoding is discriminant-first: the codec
//! reads the `type` field before anything else, so an unknown message is
//! recognized as such instead of being reported as a malformed one.

use serde::Serialize;

use crate::{ProtocolError, Tagged};

/// Encodes messages to text frames and decodes them back.
///
/// - `Send + Sync + 'static` → the codec can live inside the session's
///   shared state and be used from the receive task and from callers.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a message into a text frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Parses a text frame into a message of family `T`.
    ///
    /// # Errors
    /// - [`ProtocolError::MissingType`]: no string `type` field.
    /// - [`ProtocolError::UnknownType`]: unrecognized discriminant and `T`
    ///   has no way to represent it.
    /// - [`ProtocolError::Decode`]: malformed JSON, or a known discriminant
    ///   with missing or mistyped fields.
    fn decode<T: Tagged>(&self, text: &str) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`), the only format the game
/// server speaks.
///
/// ## Example
///
/// ```rust
/// use broadside_protocol::{Codec, JsonCodec, ClientMessage, ServerMessage};
///
/// let codec = JsonCodec;
///
/// let text = codec.encode(&ClientMessage::Attack { x: 3, y: 4 }).unwrap();
/// assert_eq!(text, r#"{"type":"attack","x":3,"y":4}"#);
///
/// let msg: ServerMessage = codec.decode(r#"{"type":"frobnicate"}"#).unwrap();
/// assert_eq!(msg, ServerMessage::Unknown { kind: "frobnicate".into() });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: Tagged>(&self, text: &str) -> Result<T, ProtocolError> {
        // Parse into an untyped tree first so the discriminant can be
        // inspected without committing to a variant.
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(ProtocolError::Decode)?;

        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or(ProtocolError::MissingType)?;

        if !T::TAGS.contains(&kind) {
            return T::unknown(kind)
                .ok_or_else(|| ProtocolError::UnknownType(kind.to_string()));
        }

        serde_json::from_value(value).map_err(ProtocolError::Decode)
    }
}

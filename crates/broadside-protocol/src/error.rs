//! Error types for the protocol layer.
//!
//! Each crate in Broadside defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in turning text frames into
//! messages (or back), not in networking or game rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a message into a text frame).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed.
    ///
    /// Common causes: malformed JSON, a recognized `type` with missing
    /// required fields, or a field with the wrong JSON type. Values are
    /// never coerced, so `"x": "3"` is an error where a number is expected.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame is a JSON object but carries no string `type` field.
    #[error("message has no \"type\" discriminant")]
    MissingType,

    /// The discriminant is not one this message family knows, and the
    /// family has no way to represent unknown messages.
    #[error("unknown message type: {0}")]
    UnknownType(String),

    /// The message decoded fine but violates a protocol rule, e.g. a
    /// coordinate outside the 10x10 grid.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

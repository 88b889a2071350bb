//! Wire types for the Broadside game protocol.
//!
//! Every frame exchanged with the game server is a JSON object whose
//! `type` field names the message. This module defines both directions:
//!
//! - [`ClientMessage`]: what we send (join the queue, submit ships, attack).
//! - [`ServerMessage`]: what the server pushes to us (turns, attack
//!   results, game over, ...).
//!
//! Field names follow the server's conventions exactly. Ship descriptors
//! use camelCase (`posX`, `isHorizontal`) while everything else is
//! snake_case, so the serde attributes below are load-bearing: a rename
//! mismatch means the server silently ignores our frames.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Shared payload types
// ---------------------------------------------------------------------------

/// The server's verdict on a single shot.
///
/// `#[serde(rename_all = "lowercase")]` maps `Hit` to `"hit"` and `Miss`
/// to `"miss"`, matching the `result` field of `attack_result` and
/// `opponent_attack`. Any other string is a decode error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackOutcome {
    Hit,
    Miss,
}

impl AttackOutcome {
    /// Returns `true` for [`AttackOutcome::Hit`].
    pub fn is_hit(self) -> bool {
        matches!(self, Self::Hit)
    }
}

impl fmt::Display for AttackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
        }
    }
}

/// One ship as submitted in a `ships_data` frame.
///
/// The server identifies ships by their position in the submitted list,
/// so there is no id here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipPlacement {
    /// Column of the bow.
    pub pos_x: i32,
    /// Row of the bow.
    pub pos_y: i32,
    pub length: u32,
    pub is_horizontal: bool,
}

/// A ship as reported by the server in `ship_destroyed`.
///
/// Same shape as [`ShipPlacement`] plus the ship's index in its owner's
/// fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipDescriptor {
    pub id: u32,
    pub pos_x: i32,
    pub pos_y: i32,
    pub length: u32,
    pub is_horizontal: bool,
}

impl ShipDescriptor {
    /// Drops the id, leaving the placement the ship occupies.
    pub fn placement(&self) -> ShipPlacement {
        ShipPlacement {
            pos_x: self.pos_x,
            pos_y: self.pos_y,
            length: self.length,
            is_horizontal: self.is_horizontal,
        }
    }
}

// ---------------------------------------------------------------------------
// ClientMessage: what we send
// ---------------------------------------------------------------------------

/// Frames sent from the client to the game server.
///
/// `#[serde(tag = "type", rename_all = "snake_case")]` produces internally
/// tagged JSON with snake_case discriminants:
///   `Attack { x: 3, y: 4 }` → `{ "type": "attack", "x": 3, "y": 4 }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// "Put me in the matchmaking queue."
    JoinQueue,

    /// "Take me out of the queue." The client disconnects right after.
    LeaveQueue,

    /// Submits (or resubmits) the whole fleet. A resubmission after a
    /// `ships_validation_error` replaces the previous one entirely.
    ShipsData { ships: Vec<ShipPlacement> },

    /// Fires at column `x`, row `y` of the opponent's grid.
    Attack { x: i32, y: i32 },

    /// Asks to be paired with a specific friend instead of a stranger.
    JoinFriend { friend_username: String },
}

impl ClientMessage {
    /// The wire discriminant of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JoinQueue => "join_queue",
            Self::LeaveQueue => "leave_queue",
            Self::ShipsData { .. } => "ships_data",
            Self::Attack { .. } => "attack",
            Self::JoinFriend { .. } => "join_friend",
        }
    }
}

// ---------------------------------------------------------------------------
// ServerMessage: what the server pushes
// ---------------------------------------------------------------------------

/// Frames pushed from the game server to the client.
///
/// The server may grow new message types over time, so decoding goes
/// through [`Codec::decode`](crate::Codec::decode), which maps any
/// unrecognized discriminant to [`ServerMessage::Unknown`] instead of
/// failing. Plain `serde_json::from_str` would reject such frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    // -- Connection lifecycle --
    /// The server accepted our token. `username` echoes who it thinks we
    /// are; older servers omit it.
    ConnectionSuccess {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        username: Option<String>,
    },

    /// The server rejected the connection (bad token, banned, ...).
    ConnectionError { error: String },

    // -- Matchmaking --
    /// Current size of the matchmaking queue.
    PlayersInQueue { count: u32 },

    /// Number of games currently being played on the server.
    ActiveGames { count: u32 },

    /// An opponent was found; the placement phase begins.
    StartGame,

    /// A `join_friend` request named a user who is not online.
    FriendNotFound {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    // -- Placement --
    ShipsAccepted,

    ShipsValidationError { error: String },

    // -- Turns --
    YourTurn,

    OpponentTurn,

    /// Result of our own shot at the opponent's grid.
    AttackResult {
        x: i32,
        y: i32,
        result: AttackOutcome,
    },

    /// The opponent fired at our grid.
    OpponentAttack {
        x: i32,
        y: i32,
        result: AttackOutcome,
    },

    /// Our last shot sank an opponent ship. Only the attacker receives it.
    ShipDestroyed { ship: ShipDescriptor },

    // -- Game over --
    YouWin,

    YouLose,

    OpponentDisconnected,

    /// Generic server-side failure message.
    Error { message: String },

    /// A well-formed frame whose `type` this client does not understand.
    ///
    /// `#[serde(skip)]` keeps it out of the derived (de)serializers; only
    /// the codec constructs it.
    #[serde(skip)]
    Unknown { kind: String },
}

/// Every discriminant [`ServerMessage`] derives a deserializer for.
const SERVER_MESSAGE_TAGS: &[&str] = &[
    "connection_success",
    "connection_error",
    "players_in_queue",
    "active_games",
    "start_game",
    "friend_not_found",
    "ships_accepted",
    "ships_validation_error",
    "your_turn",
    "opponent_turn",
    "attack_result",
    "opponent_attack",
    "ship_destroyed",
    "you_win",
    "you_lose",
    "opponent_disconnected",
    "error",
];

const CLIENT_MESSAGE_TAGS: &[&str] =
    &["join_queue", "leave_queue", "ships_data", "attack", "join_friend"];

// ---------------------------------------------------------------------------
// Tagged: discriminant-aware decoding
// ---------------------------------------------------------------------------

/// A message family discriminated by a `type` field.
///
/// The codec uses this to read the discriminant first and decide what to
/// do before handing the frame to serde.
pub trait Tagged: Sized + Serialize + serde::de::DeserializeOwned {
    /// Discriminants the derived deserializer understands.
    const TAGS: &'static [&'static str];

    /// Builds the value for an unrecognized discriminant, or `None` if
    /// the family cannot represent one (decoding then fails).
    fn unknown(kind: &str) -> Option<Self>;
}

impl Tagged for ServerMessage {
    const TAGS: &'static [&'static str] = SERVER_MESSAGE_TAGS;

    fn unknown(kind: &str) -> Option<Self> {
        Some(Self::Unknown {
            kind: kind.to_string(),
        })
    }
}

impl Tagged for ClientMessage {
    const TAGS: &'static [&'static str] = CLIENT_MESSAGE_TAGS;

    fn unknown(_kind: &str) -> Option<Self> {
        None
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The server is written against exact JSON shapes. These tests pin
    //! the output of our serde attributes to those shapes.

    use super::*;
    use serde_json::json;

    // =====================================================================
    // ClientMessage shapes
    // =====================================================================

    #[test]
    fn test_client_join_queue_json_format() {
        let json = serde_json::to_value(ClientMessage::JoinQueue).unwrap();
        assert_eq!(json, json!({ "type": "join_queue" }));
    }

    #[test]
    fn test_client_attack_json_format() {
        let json =
            serde_json::to_value(ClientMessage::Attack { x: 3, y: 4 }).unwrap();
        assert_eq!(json, json!({ "type": "attack", "x": 3, "y": 4 }));
    }

    #[test]
    fn test_client_ships_data_uses_camel_case_fields() {
        let msg = ClientMessage::ShipsData {
            ships: vec![ShipPlacement {
                pos_x: 0,
                pos_y: 2,
                length: 5,
                is_horizontal: true,
            }],
        };
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "ships_data");
        assert_eq!(
            json["ships"][0],
            json!({ "posX": 0, "posY": 2, "length": 5, "isHorizontal": true })
        );
    }

    #[test]
    fn test_client_join_friend_json_format() {
        let msg = ClientMessage::JoinFriend {
            friend_username: "bob".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            json!({ "type": "join_friend", "friend_username": "bob" })
        );
    }

    #[test]
    fn test_client_message_kind_matches_wire_tag() {
        let messages = [
            ClientMessage::JoinQueue,
            ClientMessage::LeaveQueue,
            ClientMessage::ShipsData { ships: vec![] },
            ClientMessage::Attack { x: 0, y: 0 },
            ClientMessage::JoinFriend {
                friend_username: "x".into(),
            },
        ];
        for msg in messages {
            let json = serde_json::to_value(&msg).unwrap();
            assert_eq!(json["type"], msg.kind());
            assert!(CLIENT_MESSAGE_TAGS.contains(&msg.kind()));
        }
    }

    // =====================================================================
    // ServerMessage shapes
    // =====================================================================

    #[test]
    fn test_server_attack_result_parses() {
        let msg: ServerMessage = serde_json::from_str(
            r#"{"type":"attack_result","x":1,"y":2,"result":"hit"}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ServerMessage::AttackResult {
                x: 1,
                y: 2,
                result: AttackOutcome::Hit,
            }
        );
    }

    #[test]
    fn test_server_ship_destroyed_parses_camel_case() {
        let msg: ServerMessage = serde_json::from_str(
            r#"{"type":"ship_destroyed","ship":{"id":4,"posX":7,"posY":1,"length":2,"isHorizontal":false}}"#,
        )
        .unwrap();
        let ServerMessage::ShipDestroyed { ship } = msg else {
            panic!("expected ShipDestroyed, got {msg:?}");
        };
        assert_eq!(ship.id, 4);
        assert_eq!((ship.pos_x, ship.pos_y), (7, 1));
        assert!(!ship.is_horizontal);
    }

    #[test]
    fn test_server_connection_success_username_is_optional() {
        let without: ServerMessage =
            serde_json::from_str(r#"{"type":"connection_success"}"#).unwrap();
        assert_eq!(without, ServerMessage::ConnectionSuccess { username: None });

        let with: ServerMessage = serde_json::from_str(
            r#"{"type":"connection_success","username":"alice"}"#,
        )
        .unwrap();
        assert_eq!(
            with,
            ServerMessage::ConnectionSuccess {
                username: Some("alice".into())
            }
        );
    }

    #[test]
    fn test_server_unit_variants_serialize_as_bare_tag() {
        let json = serde_json::to_value(ServerMessage::OpponentDisconnected)
            .unwrap();
        assert_eq!(json, json!({ "type": "opponent_disconnected" }));
    }

    #[test]
    fn test_server_attack_result_rejects_unknown_outcome() {
        let result: Result<ServerMessage, _> = serde_json::from_str(
            r#"{"type":"attack_result","x":1,"y":2,"result":"sunk"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_server_message_tags_cover_every_variant() {
        let samples = [
            json!({ "type": "connection_success" }),
            json!({ "type": "connection_error", "error": "e" }),
            json!({ "type": "players_in_queue", "count": 1 }),
            json!({ "type": "active_games", "count": 1 }),
            json!({ "type": "start_game" }),
            json!({ "type": "friend_not_found" }),
            json!({ "type": "ships_accepted" }),
            json!({ "type": "ships_validation_error", "error": "e" }),
            json!({ "type": "your_turn" }),
            json!({ "type": "opponent_turn" }),
            json!({ "type": "attack_result", "x": 0, "y": 0, "result": "miss" }),
            json!({ "type": "opponent_attack", "x": 0, "y": 0, "result": "hit" }),
            json!({ "type": "ship_destroyed", "ship": {
                "id": 0, "posX": 0, "posY": 0, "length": 2, "isHorizontal": true
            }}),
            json!({ "type": "you_win" }),
            json!({ "type": "you_lose" }),
            json!({ "type": "opponent_disconnected" }),
            json!({ "type": "error", "message": "e" }),
        ];
        assert_eq!(samples.len(), SERVER_MESSAGE_TAGS.len());
        for sample in samples {
            let tag = sample["type"].as_str().unwrap().to_string();
            assert!(SERVER_MESSAGE_TAGS.contains(&tag.as_str()), "{tag}");
            let parsed: Result<ServerMessage, _> = serde_json::from_value(sample);
            assert!(parsed.is_ok(), "{tag} should parse");
        }
    }

    #[test]
    fn test_attack_outcome_display() {
        assert_eq!(AttackOutcome::Hit.to_string(), "HIT");
        assert_eq!(AttackOutcome::Miss.to_string(), "MISS");
    }

    #[test]
    fn test_ship_descriptor_placement_drops_id() {
        let ship = ShipDescriptor {
            id: 3,
            pos_x: 1,
            pos_y: 2,
            length: 3,
            is_horizontal: true,
        };
        assert_eq!(
            ship.placement(),
            ShipPlacement {
                pos_x: 1,
                pos_y: 2,
                length: 3,
                is_horizontal: true,
            }
        );
    }
}

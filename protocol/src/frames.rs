//! The frame envelopes exchanged over one websocket connection, plus the
//! limits the session hub enforces on them.

use serde::{Deserialize, Serialize};

use crate::actions::ActionRequest;
use crate::dto::GameDto;
use crate::hex::HexCoordinate;

/// Largest inbound text frame the server accepts, in bytes. Anything
/// larger is a protocol error and closes the connection.
pub const MAX_FRAME_BYTES: usize = 64 * 1024;

/// Bound of one connection's outbound queue. A connection that cannot
/// drain this many frames is considered stale and gets closed.
pub const OUTBOUND_QUEUE_SIZE: usize = 64;

/// Every frame a client may send. The `type` tag selects the variant;
/// unknown tags fail to parse and are answered with an error frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientFrame {
    /// Connection bootstrap: join a game or reclaim a prior identity.
    PlayerConnect {
        game_id: String,
        player_name: String,
        #[serde(default)]
        player_id: Option<String>,
    },
    PlayAction {
        game_id: String,
        action_request: ActionRequest,
    },
    /// Resolves a pending card-draw selection.
    ConfirmCardDraw {
        game_id: String,
        #[serde(default)]
        cards_to_take: Vec<String>,
        #[serde(default)]
        cards_to_buy: Vec<String>,
    },
    /// Resolves the production-phase card purchase.
    ConfirmProductionCards {
        game_id: String,
        card_ids: Vec<String>,
    },
    /// Resolves the starting-card selection (one corporation id plus any
    /// number of project ids from the dealt pool).
    SelectStartingCards {
        game_id: String,
        card_ids: Vec<String>,
    },
    /// Resolves a pending tile placement.
    SelectTile {
        game_id: String,
        coordinate: HexCoordinate,
    },
}

impl ClientFrame {
    /// The game the frame addresses.
    pub fn game_id(&self) -> &str {
        match self {
            ClientFrame::PlayerConnect { game_id, .. }
            | ClientFrame::PlayAction { game_id, .. }
            | ClientFrame::ConfirmCardDraw { game_id, .. }
            | ClientFrame::ConfirmProductionCards { game_id, .. }
            | ClientFrame::SelectStartingCards { game_id, .. }
            | ClientFrame::SelectTile { game_id, .. } => game_id,
        }
    }
}

/// Every frame the server may send.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerFrame {
    PlayerConnected { player_id: String, game: GameDto },
    PlayerReconnected { player_id: String, game: GameDto },
    GameUpdated { game: GameDto },
    FullState { game: GameDto },
    ActionSuccess { action: String, success: bool },
    Error { error: String },
}

impl ServerFrame {
    pub fn error(message: impl Into<String>) -> ServerFrame {
        ServerFrame::Error {
            error: message.into(),
        }
    }
}

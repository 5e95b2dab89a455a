//! The message router: parses inbound frames, runs the connection
//! lifecycle, and dispatches gameplay frames to the engine orchestrators
//! under the owning game's write lock. Failures answer the originating
//! connection only; successful actions broadcast a personalized snapshot
//! to everyone in the game.

use std::sync::Arc;

use engine::error::ErrorKind;
use engine::game::GameStatus;
use engine::{ActionError, PlayerId, actions, view};
use protocol::frames::{ClientFrame, ServerFrame};

use crate::hub::ConnectionId;
use crate::state::AppState;

/// What the read pump should do after a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Close,
}

pub async fn handle_frame(
    state: &Arc<AppState>,
    connection_id: ConnectionId,
    raw: &str,
) -> Control {
    let frame: ClientFrame = match serde_json::from_str(raw) {
        Ok(frame) => frame,
        Err(error) => {
            tracing::warn!(connection = %connection_id, %error, "malformed frame");
            state
                .hub
                .send(&connection_id, ServerFrame::error("malformed frame"))
                .await;
            return Control::Close;
        }
    };

    match frame {
        ClientFrame::PlayerConnect {
            game_id,
            player_name,
            player_id,
        } => {
            handle_player_connect(state, connection_id, &game_id, player_name, player_id).await
        }
        other => handle_game_frame(state, connection_id, other).await,
    }
}

/// The new-or-reconnect flow: prior id wins, then name match, then a
/// fresh join while the game is still in the lobby.
async fn handle_player_connect(
    state: &Arc<AppState>,
    connection_id: ConnectionId,
    game_id: &str,
    player_name: String,
    prior_id: Option<String>,
) -> Control {
    let Some(game_lock) = state.game(game_id).await else {
        state
            .hub
            .send(&connection_id, ServerFrame::error("game not found"))
            .await;
        return Control::Continue;
    };

    enum Outcome {
        Reconnected(PlayerId),
        Joined(PlayerId),
    }

    let outcome = {
        let mut game = game_lock.write().await;
        let known_prior = prior_id
            .map(|id| PlayerId(id))
            .filter(|id| game.players.contains_key(id));
        let by_name = known_prior
            .clone()
            .or_else(|| game.player_by_name(&player_name).map(|p| p.id.clone()));
        match by_name {
            Some(id) => {
                if let Ok(player) = game.player_mut(&id) {
                    player.connected = true;
                }
                game.touch();
                Outcome::Reconnected(id)
            }
            None => match game.join(player_name) {
                Ok(id) => Outcome::Joined(id),
                Err(error) => {
                    drop(game);
                    state
                        .hub
                        .send(&connection_id, ServerFrame::error(error.to_string()))
                        .await;
                    return Control::Continue;
                }
            },
        }
    };

    let (player_id, reconnected) = match outcome {
        Outcome::Reconnected(id) => (id, true),
        Outcome::Joined(id) => (id, false),
    };
    state.hub.assign(connection_id, game_id, &player_id).await;
    tracing::info!(
        game = game_id,
        player = %player_id,
        reconnected,
        "player connected"
    );

    let snapshot = {
        let game = game_lock.read().await;
        view::project(&game, Some(&player_id))
    };
    let frame = if reconnected {
        ServerFrame::PlayerReconnected {
            player_id: player_id.to_string(),
            game: snapshot,
        }
    } else {
        ServerFrame::PlayerConnected {
            player_id: player_id.to_string(),
            game: snapshot,
        }
    };
    state.hub.send(&connection_id, frame).await;
    broadcast_game(state, game_id).await;
    Control::Continue
}

/// Every frame except `player-connect` needs an assigned identity, and
/// the frame must address the game the connection belongs to.
async fn handle_game_frame(
    state: &Arc<AppState>,
    connection_id: ConnectionId,
    frame: ClientFrame,
) -> Control {
    let Some((assigned_game, player_id)) = state.hub.assignment(&connection_id).await else {
        state
            .hub
            .send(
                &connection_id,
                ServerFrame::error("connect to a game first"),
            )
            .await;
        return Control::Continue;
    };
    if frame.game_id() != assigned_game {
        state
            .hub
            .send(
                &connection_id,
                ServerFrame::error("connection is assigned to a different game"),
            )
            .await;
        return Control::Continue;
    }
    let Some(game_lock) = state.game(&assigned_game).await else {
        state
            .hub
            .send(&connection_id, ServerFrame::error("game not found"))
            .await;
        return Control::Continue;
    };

    let result = {
        let mut game = game_lock.write().await;
        match &frame {
            ClientFrame::PlayAction { action_request, .. } => {
                actions::dispatch(&mut game, &state.bus, &player_id, action_request)
            }
            ClientFrame::ConfirmCardDraw {
                cards_to_take,
                cards_to_buy,
                ..
            } => actions::confirm_card_draw(
                &mut game,
                &state.bus,
                &player_id,
                cards_to_take,
                cards_to_buy,
            )
            .map(|_| "confirm-card-draw"),
            ClientFrame::ConfirmProductionCards { card_ids, .. } => {
                actions::confirm_production_cards(&mut game, &state.bus, &player_id, card_ids)
                    .map(|_| "confirm-production-cards")
            }
            ClientFrame::SelectStartingCards { card_ids, .. } => {
                actions::select_starting_cards(&mut game, &state.bus, &player_id, card_ids)
                    .map(|_| "select-starting-cards")
            }
            ClientFrame::SelectTile { coordinate, .. } => {
                if !coordinate.is_valid() {
                    Err(ActionError::InvalidCoordinate)
                } else {
                    actions::select_tile(&mut game, &state.bus, &player_id, coordinate)
                        .map(|_| "select-tile")
                }
            }
            ClientFrame::PlayerConnect { .. } => unreachable!("handled by the caller"),
        }
    };

    match result {
        Ok(action) => {
            state
                .hub
                .send(
                    &connection_id,
                    ServerFrame::ActionSuccess {
                        action: action.to_owned(),
                        success: true,
                    },
                )
                .await;
            broadcast_game(state, &assigned_game).await;
            Control::Continue
        }
        Err(error) => {
            tracing::debug!(
                game = assigned_game,
                player = %player_id,
                %error,
                "action rejected"
            );
            state
                .hub
                .send(&connection_id, ServerFrame::error(error.to_string()))
                .await;
            match error.kind() {
                // Internal failures must not leave a wedged connection
                // talking to a game in an unknown state.
                ErrorKind::Internal => Control::Close,
                _ => Control::Continue,
            }
        }
    }
}

/// Snapshots the game under a read lock and offers one personalized
/// frame to every connection in it.
pub async fn broadcast_game(state: &Arc<AppState>, game_id: &str) {
    let Some(game_lock) = state.game(game_id).await else {
        return;
    };
    let game = game_lock.read().await;
    state
        .hub
        .broadcast_to_game(game_id, |player_id| ServerFrame::GameUpdated {
            game: view::project(&game, Some(player_id)),
        })
        .await;
}

/// Read-pump teardown: flips the player's connection flag and tells the
/// peers. The player record stays; the slot awaits reconnection.
pub async fn mark_disconnected(state: &Arc<AppState>, game_id: &str, player_id: &PlayerId) {
    let Some(game_lock) = state.game(game_id).await else {
        return;
    };
    {
        let mut game = game_lock.write().await;
        if let Ok(player) = game.player_mut(player_id) {
            player.connected = false;
        }
        if game.status != GameStatus::Completed {
            game.touch();
        }
    }
    tracing::info!(game = game_id, player = %player_id, "player disconnected");
    broadcast_game(state, game_id).await;
}

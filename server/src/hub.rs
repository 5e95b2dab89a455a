//! The session hub: connection registry, per-game membership, identity
//! assignment with displacement, and personalized broadcast. Two indices
//! behind one lock; the write pumps own the sockets, the hub only ever
//! touches the bounded outbound queues.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;
use tokio::sync::mpsc;
use uuid::Uuid;

use engine::PlayerId;
use protocol::frames::ServerFrame;

pub type ConnectionId = Uuid;

struct ConnectionEntry {
    sender: mpsc::Sender<ServerFrame>,
    assignment: Option<(String, PlayerId)>,
}

#[derive(Default)]
struct HubInner {
    by_conn: HashMap<ConnectionId, ConnectionEntry>,
    by_game: HashMap<String, HashSet<ConnectionId>>,
}

impl HubInner {
    fn detach(&mut self, id: &ConnectionId) -> Option<(String, PlayerId)> {
        let entry = self.by_conn.remove(id)?;
        let assignment = entry.assignment;
        if let Some((game_id, _)) = &assignment {
            if let Some(members) = self.by_game.get_mut(game_id) {
                members.remove(id);
                if members.is_empty() {
                    self.by_game.remove(game_id);
                }
            }
        }
        // Dropping the entry closes its queue; the write pump sees the
        // closed channel and shuts the socket down gracefully.
        assignment
    }
}

pub struct SessionHub {
    inner: RwLock<HubInner>,
}

impl SessionHub {
    pub fn new() -> SessionHub {
        SessionHub {
            inner: RwLock::new(HubInner::default()),
        }
    }

    pub async fn register(&self, id: ConnectionId, sender: mpsc::Sender<ServerFrame>) {
        let mut inner = self.inner.write().await;
        inner.by_conn.insert(
            id,
            ConnectionEntry {
                sender,
                assignment: None,
            },
        );
    }

    /// Binds a connection to a (game, player) identity. Idempotent; any
    /// other live connection holding the same identity is displaced:
    /// removed from both indices and closed, while the new connection
    /// inherits the identity. This is the reconnection rule.
    pub async fn assign(&self, id: ConnectionId, game_id: &str, player_id: &PlayerId) {
        let mut inner = self.inner.write().await;
        let displaced: Vec<ConnectionId> = inner
            .by_conn
            .iter()
            .filter(|(other, entry)| {
                **other != id
                    && entry
                        .assignment
                        .as_ref()
                        .is_some_and(|(g, p)| g == game_id && p == player_id)
            })
            .map(|(other, _)| *other)
            .collect();
        for other in displaced {
            tracing::info!(connection = %other, player = %player_id, "displacing prior connection");
            inner.detach(&other);
        }

        if let Some(entry) = inner.by_conn.get_mut(&id) {
            entry.assignment = Some((game_id.to_owned(), player_id.clone()));
        } else {
            return;
        }
        inner
            .by_game
            .entry(game_id.to_owned())
            .or_default()
            .insert(id);
    }

    pub async fn assignment(&self, id: &ConnectionId) -> Option<(String, PlayerId)> {
        self.inner
            .read()
            .await
            .by_conn
            .get(id)
            .and_then(|entry| entry.assignment.clone())
    }

    /// Removes a connection, returning the identity it held.
    pub async fn remove(&self, id: &ConnectionId) -> Option<(String, PlayerId)> {
        self.inner.write().await.detach(id)
    }

    /// Non-blocking send to one connection. A full queue marks the
    /// connection stale and drops it from the indices.
    pub async fn send(&self, id: &ConnectionId, frame: ServerFrame) -> bool {
        let sender = {
            let inner = self.inner.read().await;
            match inner.by_conn.get(id) {
                Some(entry) => entry.sender.clone(),
                None => return false,
            }
        };
        if sender.try_send(frame).is_ok() {
            return true;
        }
        tracing::warn!(connection = %id, "outbound queue full or closed, dropping connection");
        self.inner.write().await.detach(id);
        false
    }

    /// Computes one personalized frame per assigned connection in the
    /// game and offers it without blocking. Slow consumers get dropped,
    /// never waited on.
    pub async fn broadcast_to_game<F>(&self, game_id: &str, personalize: F)
    where
        F: Fn(&PlayerId) -> ServerFrame,
    {
        let targets: Vec<(ConnectionId, PlayerId, mpsc::Sender<ServerFrame>)> = {
            let inner = self.inner.read().await;
            let Some(members) = inner.by_game.get(game_id) else {
                return;
            };
            members
                .iter()
                .filter_map(|id| {
                    let entry = inner.by_conn.get(id)?;
                    let (_, player_id) = entry.assignment.as_ref()?;
                    Some((*id, player_id.clone(), entry.sender.clone()))
                })
                .collect()
        };

        let mut stale = Vec::new();
        for (id, player_id, sender) in targets {
            if sender.try_send(personalize(&player_id)).is_err() {
                stale.push(id);
            }
        }
        if !stale.is_empty() {
            let mut inner = self.inner.write().await;
            for id in stale {
                tracing::warn!(connection = %id, game = game_id, "slow consumer dropped during broadcast");
                inner.detach(&id);
            }
        }
    }

    pub async fn connections_in_game(&self, game_id: &str) -> usize {
        self.inner
            .read()
            .await
            .by_game
            .get(game_id)
            .map(|members| members.len())
            .unwrap_or(0)
    }
}

impl Default for SessionHub {
    fn default() -> SessionHub {
        SessionHub::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> ServerFrame {
        ServerFrame::ActionSuccess {
            action: "test".into(),
            success: true,
        }
    }

    #[tokio::test]
    async fn assign_displaces_prior_holder_of_the_identity() {
        let hub = SessionHub::new();
        let player = PlayerId::from("p1");
        let (tx_a, _rx_a) = mpsc::channel(4);
        let (tx_b, _rx_b) = mpsc::channel(4);
        let conn_a = Uuid::new_v4();
        let conn_b = Uuid::new_v4();
        hub.register(conn_a, tx_a).await;
        hub.register(conn_b, tx_b).await;

        hub.assign(conn_a, "g1", &player).await;
        hub.assign(conn_b, "g1", &player).await;

        assert!(hub.assignment(&conn_a).await.is_none());
        assert_eq!(
            Some(("g1".to_owned(), player.clone())),
            hub.assignment(&conn_b).await
        );
        assert_eq!(1, hub.connections_in_game("g1").await);
    }

    #[tokio::test]
    async fn broadcast_personalizes_per_player() {
        let hub = SessionHub::new();
        let (tx_a, mut rx_a) = mpsc::channel(4);
        let (tx_b, mut rx_b) = mpsc::channel(4);
        let conn_a = Uuid::new_v4();
        let conn_b = Uuid::new_v4();
        hub.register(conn_a, tx_a).await;
        hub.register(conn_b, tx_b).await;
        hub.assign(conn_a, "g1", &PlayerId::from("alice")).await;
        hub.assign(conn_b, "g1", &PlayerId::from("bob")).await;

        hub.broadcast_to_game("g1", |player| ServerFrame::ActionSuccess {
            action: player.to_string(),
            success: true,
        })
        .await;

        let ServerFrame::ActionSuccess { action, .. } = rx_a.recv().await.unwrap() else {
            panic!("wrong frame");
        };
        assert_eq!("alice", action);
        let ServerFrame::ActionSuccess { action, .. } = rx_b.recv().await.unwrap() else {
            panic!("wrong frame");
        };
        assert_eq!("bob", action);
    }

    #[tokio::test]
    async fn full_queue_drops_the_connection() {
        let hub = SessionHub::new();
        let (tx, _rx) = mpsc::channel(1);
        let conn = Uuid::new_v4();
        hub.register(conn, tx).await;
        hub.assign(conn, "g1", &PlayerId::from("p")).await;

        assert!(hub.send(&conn, frame()).await);
        // Queue capacity is one; the second offer fails and removes it.
        assert!(!hub.send(&conn, frame()).await);
        assert!(hub.assignment(&conn).await.is_none());
        assert_eq!(0, hub.connections_in_game("g1").await);
    }
}

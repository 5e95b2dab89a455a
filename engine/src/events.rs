//! Typed in-process event fan-out. Orchestrators push events onto a
//! queue while they mutate; the bus then drains the queue synchronously,
//! so every reactive mutation lands before the enclosing action returns
//! and before any broadcast is taken.

use std::collections::VecDeque;
use std::sync::Arc;

use protocol::hex::HexCoordinate;

use crate::board::TileKind;
use crate::cards::Tag;
use crate::error::ActionError;
use crate::game::GameState;
use crate::ids::{CardId, PlayerId};

/// Hard cap on one action's event cascade. Reactive chains converge
/// quickly because the global parameters clamp; hitting the cap means a
/// listener cycle and is reported as an internal error.
const MAX_CASCADE: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    GameStarted,
    CardPlayed {
        player: PlayerId,
        card: CardId,
    },
    TagsPlayed {
        player: PlayerId,
        tags: Vec<Tag>,
    },
    TemperatureChanged {
        player: PlayerId,
        steps: u32,
    },
    OxygenChanged {
        player: PlayerId,
        steps: u32,
    },
    OceansChanged {
        player: PlayerId,
        count: u32,
    },
    TilePlaced {
        player: PlayerId,
        tile: TileKind,
        coordinate: HexCoordinate,
    },
    GenerationEnded {
        generation: u32,
    },
    GameCompleted,
}

/// Events accumulated during one action.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<GameEvent>,
}

impl EventQueue {
    pub fn publish(&mut self, event: GameEvent) {
        self.events.push_back(event);
    }

    fn pop(&mut self) -> Option<GameEvent> {
        self.events.pop_front()
    }
}

/// One reactive subscriber. Handlers mutate through the store API and may
/// publish follow-up events; they must never block.
pub trait Listener: Send + Sync {
    fn name(&self) -> &'static str;

    fn handle(
        &self,
        state: &mut GameState,
        event: &GameEvent,
        queue: &mut EventQueue,
    ) -> Result<(), ActionError>;
}

/// The registry. Built once at startup; delivery iterates a snapshot of
/// the subscriber list, so registration during delivery is impossible by
/// construction.
#[derive(Clone)]
pub struct EventBus {
    listeners: Arc<Vec<Arc<dyn Listener>>>,
}

impl EventBus {
    pub fn new(listeners: Vec<Arc<dyn Listener>>) -> EventBus {
        EventBus {
            listeners: Arc::new(listeners),
        }
    }

    /// The production wiring: starting-card dealing, reactive card
    /// effects, and the greenery/oxygen rule.
    pub fn standard() -> EventBus {
        EventBus::new(vec![
            Arc::new(crate::listeners::StartingCards),
            Arc::new(crate::listeners::CardEffects),
            Arc::new(crate::listeners::GreeneryRule),
        ])
    }

    /// Drains the queue, delivering each event to every listener.
    /// Listener failures are logged and swallowed; they never fail the
    /// initiating action.
    pub fn deliver(&self, state: &mut GameState, queue: &mut EventQueue) {
        let listeners = Arc::clone(&self.listeners);
        let mut delivered = 0usize;
        while let Some(event) = queue.pop() {
            delivered += 1;
            if delivered > MAX_CASCADE {
                tracing::error!(game = %state.id, "event cascade exceeded limit, dropping rest");
                return;
            }
            for listener in listeners.iter() {
                if let Err(error) = listener.handle(state, &event, queue) {
                    tracing::warn!(
                        game = %state.id,
                        listener = listener.name(),
                        %error,
                        "listener failed, continuing"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::catalog::CardCatalog;
    use std::sync::Mutex;

    struct Recorder(Mutex<Vec<&'static str>>);

    impl Listener for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn handle(
            &self,
            _state: &mut GameState,
            event: &GameEvent,
            queue: &mut EventQueue,
        ) -> Result<(), ActionError> {
            match event {
                GameEvent::GameStarted => {
                    self.0.lock().unwrap().push("started");
                    queue.publish(GameEvent::GameCompleted);
                    Ok(())
                }
                GameEvent::GameCompleted => {
                    self.0.lock().unwrap().push("completed");
                    Ok(())
                }
                _ => Err(ActionError::Internal("unexpected".into())),
            }
        }
    }

    #[test]
    fn deliver_drains_follow_up_events_in_order() {
        let recorder = Arc::new(Recorder(Mutex::new(vec![])));
        let bus = EventBus::new(vec![recorder.clone()]);
        let mut state = GameState::new("g".into(), 2, Arc::new(CardCatalog::standard()));
        let mut queue = EventQueue::default();
        queue.publish(GameEvent::GameStarted);
        bus.deliver(&mut state, &mut queue);
        assert_eq!(vec!["started", "completed"], *recorder.0.lock().unwrap());
    }

    #[test]
    fn listener_errors_are_swallowed() {
        let recorder = Arc::new(Recorder(Mutex::new(vec![])));
        let bus = EventBus::new(vec![recorder]);
        let mut state = GameState::new("g".into(), 2, Arc::new(CardCatalog::standard()));
        let mut queue = EventQueue::default();
        queue.publish(GameEvent::GenerationEnded { generation: 1 });
        bus.deliver(&mut state, &mut queue);
    }
}

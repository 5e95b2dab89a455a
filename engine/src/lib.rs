//! The authoritative game rules: stores, card catalog, effect engine,
//! action orchestrators, and event fan-out. Everything here is
//! synchronous; the server serializes access per game and broadcasts the
//! projections from [`view`].

pub mod actions;
pub mod board;
pub mod cards;
pub mod effects;
pub mod error;
pub mod events;
pub mod game;
pub mod ids;
pub mod listeners;
pub mod params;
pub mod player;
pub mod production;
pub mod resources;
pub mod scoring;
pub mod view;

pub use cards::catalog::CardCatalog;
pub use error::{ActionError, ErrorKind};
pub use events::EventBus;
pub use game::GameState;
pub use ids::{CardId, PlayerId, new_game_id};

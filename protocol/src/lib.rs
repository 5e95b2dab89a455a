//! Wire types shared between the game server and its clients.
//! Everything on the socket is a JSON text frame: inbound frames are
//! [`frames::ClientFrame`], outbound frames are [`frames::ServerFrame`].
//! The structs in [`dto`] are the personalized projections the server
//! broadcasts; they never expose another player's hand.

pub mod actions;
pub mod dto;
pub mod frames;
pub mod hex;

pub use actions::{ActionRequest, Payment};
pub use dto::GameDto;
pub use frames::{ClientFrame, ServerFrame};
pub use hex::HexCoordinate;

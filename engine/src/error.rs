//! Typed results for every orchestrator. The router maps [`ErrorKind`] to
//! the wire behavior: precondition and not-found failures answer the
//! originating connection only, internal failures additionally close it.

use thiserror::Error;

use crate::game::Phase;
use crate::resources::Resource;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("game not found")]
    GameNotFound,
    #[error("player {0} is not in this game")]
    PlayerNotFound(String),
    #[error("unknown card {0}")]
    CardNotFound(String),
    #[error("card {0} is not in your hand")]
    CardNotInHand(String),
    #[error("action not available in phase {0:?}")]
    WrongPhase(Phase),
    #[error("not your turn")]
    NotYourTurn,
    #[error("only the host may do that")]
    NotHost,
    #[error("a game needs at least {0} players")]
    NotEnoughPlayers(usize),
    #[error("game is full")]
    GameFull,
    #[error("game is not open for joining")]
    NotJoinable,
    #[error("not enough {0}")]
    InsufficientResources(Resource),
    #[error("requirement not met: {0}")]
    RequirementNotMet(String),
    #[error("payment does not match the card cost")]
    BadPayment,
    #[error("no pending selection of that kind")]
    NoPendingSelection,
    #[error("a selection is already pending")]
    SelectionPending,
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
    #[error("hex {0} is not a legal placement")]
    IllegalHex(String),
    #[error("coordinate violates q+r+s=0")]
    InvalidCoordinate,
    #[error("this card needs a choice index")]
    ChoiceRequired,
    #[error("choice index out of range")]
    ChoiceOutOfRange,
    #[error("that behavior is not an available action")]
    UnknownAction,
    #[error("action already used this generation")]
    ActionExhausted,
    #[error("this output needs a storage target card")]
    StorageTargetRequired,
    #[error("invalid storage target {0}")]
    StorageTargetInvalid(String),
    #[error("milestone or award {0} is not available")]
    MilestoneUnavailable(String),
    #[error("global parameter already at maximum")]
    ParameterAtMax,
    #[error("internal error: {0}")]
    Internal(String),
}

/// The abstract error classes of the wire contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Precondition,
    Internal,
}

impl ActionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::GameNotFound
            | ActionError::PlayerNotFound(_)
            | ActionError::CardNotFound(_) => ErrorKind::NotFound,
            ActionError::Internal(_) => ErrorKind::Internal,
            _ => ErrorKind::Precondition,
        }
    }
}

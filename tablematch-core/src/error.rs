/// Errors from the event session and signal book.
///
/// The engine itself never fails; these cover admin actions that don't fit
/// the current event state.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("person {0} is already registered")]
    DuplicatePerson(String),

    #[error("unknown person: {0}")]
    UnknownPerson(String),

    #[error("no rounds remaining")]
    NoRoundsRemaining,

    /// Swap before the first round was seated.
    #[error("no round is active")]
    NoActiveRound,

    #[error("person {0} is not seated this round")]
    NotSeated(String),

    #[error("{0} and {1} already share a table")]
    SameTable(String, String),

    #[error("no round to undo")]
    NothingToUndo,

    #[error("person {0} cannot signal themselves")]
    SelfSignal(String),

    /// A stored history entry without the `:` between two ids.
    #[error("malformed pair key: {0:?}")]
    MalformedPairKey(String),
}

pub type Result<T> = std::result::Result<T, EventError>;

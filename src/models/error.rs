//! Errors reported by every competition, round and group operation.

use std::fmt;
use thiserror::Error;

/// Which aggregate an invalid transition was attempted on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Entity {
    Competition,
    Round,
    Group,
    Participant,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Competition => write!(f, "competition"),
            Entity::Round => write!(f, "round"),
            Entity::Group => write!(f, "group"),
            Entity::Participant => write!(f, "participant"),
        }
    }
}

/// Errors that can occur during competition operations.
///
/// Guards are evaluated before any write, so an error always means nothing changed.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CompetitionError {
    /// The operation is not allowed from the entity's current status.
    #[error("cannot {operation} {entity} while it is {status}")]
    InvalidStateTransition {
        entity: Entity,
        operation: &'static str,
        status: String,
    },

    /// The status allows the operation but a guard failed (capacity, window, roster size).
    #[error("{0}")]
    PreconditionNotMet(String),

    /// Round cannot be completed yet.
    #[error("round {round_number} is not ready: {reason}")]
    RoundNotReady { round_number: u32, reason: String },

    /// Every planned round has already been played.
    #[error("no pending round left to advance to")]
    NoNextRound,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    Duplicate(String),

    /// `generate_groups` was called on a round that already has groups.
    #[error("groups already exist for round {round_number}")]
    GroupsAlreadyExist { round_number: u32 },

    /// The bracket planner cannot plan for this many participants.
    #[error("cannot plan a {format} bracket for {participants} participant(s)")]
    InvalidPlan { format: String, participants: usize },

    /// Settings document with unknown keys or values outside the allowed set.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// The five error kinds callers branch on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidStateTransition,
    PreconditionNotMet,
    NotFound,
    Duplicate,
    InvalidPlan,
}

impl CompetitionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompetitionError::InvalidStateTransition { .. } => ErrorKind::InvalidStateTransition,
            CompetitionError::PreconditionNotMet(_)
            | CompetitionError::RoundNotReady { .. }
            | CompetitionError::NoNextRound
            | CompetitionError::InvalidSettings(_) => ErrorKind::PreconditionNotMet,
            CompetitionError::NotFound(_) => ErrorKind::NotFound,
            CompetitionError::Duplicate(_) | CompetitionError::GroupsAlreadyExist { .. } => {
                ErrorKind::Duplicate
            }
            CompetitionError::InvalidPlan { .. } => ErrorKind::InvalidPlan,
        }
    }

    pub(crate) fn transition(
        entity: Entity,
        operation: &'static str,
        status: impl fmt::Display,
    ) -> Self {
        CompetitionError::InvalidStateTransition {
            entity,
            operation,
            status: status.to_string(),
        }
    }

    pub(crate) fn precondition(reason: impl Into<String>) -> Self {
        CompetitionError::PreconditionNotMet(reason.into())
    }
}

pub type CompetitionResult<T> = Result<T, CompetitionError>;

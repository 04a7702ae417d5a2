//! Data structures for competitions: participants, rounds, groups, standings and settings.

mod competition;
mod error;
mod group;
mod participant;
mod round;
mod settings;
mod standing;

pub use competition::{
    slugify, Competition, CompetitionFormat, CompetitionId, CompetitionStatus, CompetitionType,
    RegistrationStatus,
};
pub use error::{CompetitionError, CompetitionResult, Entity, ErrorKind};
pub use group::{Group, GroupId, GroupParticipant, GroupStatus};
pub use participant::{
    Identity, MatchStatistics, Participant, ParticipantId, ParticipantRole, ParticipantStatus,
};
pub use round::{Round, RoundId, RoundStatus};
pub use settings::{
    AdvancementCriteria, BracketSide, CompetitionSettings, GroupSettings, PairingMethod,
    PointSystem, RoundSettings, ScoringSystem, Tiebreaker, TimeLimits,
};
pub use standing::{Standing, StatLine};

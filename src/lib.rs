//! Competition progression and standings engine: bracket planning, round/group state
//! machines, standings and an in-memory store for the web binary.

pub mod config;
pub mod logic;
pub mod models;
pub mod store;

pub use config::{ConfigError, ServerConfig};
pub use logic::{
    calculate_standings, identities_from_csv, plan_bracket, BracketPlan, ImportError,
    PairingStrategy, RoundSpec, Shuffled, StandingsOrder,
};
pub use models::{
    Competition, CompetitionError, CompetitionFormat, CompetitionId, CompetitionResult,
    CompetitionStatus, ErrorKind, Group, GroupStatus, Identity, MatchStatistics, Participant,
    ParticipantId, Round, RoundStatus, Standing,
};
pub use store::CompetitionStore;

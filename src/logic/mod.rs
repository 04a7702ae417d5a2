//! Competition business logic: bracket planning, standings, the round/group/competition
//! state machines, Swiss pairing and roster import.

mod competition;
mod group;
mod import;
mod pairing;
mod planner;
mod round;
mod standings;

pub use group::MIN_GROUP_PLAYERS;
pub use import::{identities_from_csv, ImportError};
pub use pairing::{PairingStrategy, Shuffled, StandingsOrder};
pub use planner::{elimination_round_name, plan_bracket, BracketPlan, RoundSpec, MAX_SWISS_ROUNDS};
pub use round::group_name;
pub use standings::{calculate_standings, win_percentage};

//! Swiss pairing strategies.
//!
//! A strategy only decides the order of the entrants; the round then cuts that order into
//! consecutive groups of two (the last group absorbs an odd player out).

use crate::models::{Identity, Standing};
use rand::seq::SliceRandom;

pub trait PairingStrategy: Send + Sync {
    /// Order the entrants of the next Swiss round, given the current leaderboard.
    fn order(&self, leaderboard: &[Standing]) -> Vec<Identity>;
}

fn identity(standing: &Standing) -> Identity {
    Identity::new(standing.participant_id, standing.name.clone())
}

/// Score-based pairing: 1st meets 2nd, 3rd meets 4th, and so on.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandingsOrder;

impl PairingStrategy for StandingsOrder {
    fn order(&self, leaderboard: &[Standing]) -> Vec<Identity> {
        leaderboard.iter().map(identity).collect()
    }
}

/// Random pairing, ignoring the leaderboard.
#[derive(Clone, Copy, Debug, Default)]
pub struct Shuffled;

impl PairingStrategy for Shuffled {
    fn order(&self, leaderboard: &[Standing]) -> Vec<Identity> {
        let mut entrants: Vec<Identity> = leaderboard.iter().map(identity).collect();
        entrants.shuffle(&mut rand::thread_rng());
        entrants
    }
}

//! Group lifecycle: roster management, result recording, standings refresh and advancement.

use crate::logic::standings::calculate_standings;
use crate::models::{
    CompetitionError, CompetitionResult, Entity, Group, GroupParticipant, GroupStatus, Identity,
    MatchStatistics, ParticipantId, StatLine,
};
use chrono::{DateTime, Utc};

/// Minimum roster size before a group can start.
pub const MIN_GROUP_PLAYERS: usize = 2;

impl Group {
    fn ensure_editable(&self, operation: &'static str) -> CompetitionResult<()> {
        match self.status {
            GroupStatus::Pending | GroupStatus::Active => Ok(()),
            GroupStatus::Completed | GroupStatus::Cancelled => {
                Err(CompetitionError::transition(Entity::Group, operation, self.status))
            }
        }
    }

    fn roster_index(&self, id: ParticipantId) -> CompetitionResult<usize> {
        self.roster
            .iter()
            .position(|p| p.participant_id == id)
            .ok_or_else(|| {
                CompetitionError::NotFound(format!("participant {} in {}", id, self.name))
            })
    }

    /// Regenerate the standings snapshot from the roster.
    pub(crate) fn refresh_standings(&mut self) {
        let lines: Vec<StatLine> = self.roster.iter().map(GroupParticipant::stat_line).collect();
        self.standings = calculate_standings(&lines);
        log::debug!("{}: standings refreshed ({} rows)", self.name, self.standings.len());
    }

    /// Seat a participant. Position is the next free slot; stats start at zero.
    pub fn add_participant(
        &mut self,
        identity: Identity,
        seed: Option<u32>,
        now: DateTime<Utc>,
    ) -> CompetitionResult<()> {
        self.ensure_editable("add a participant to")?;
        if self.is_full() {
            return Err(CompetitionError::precondition(format!(
                "{} is full ({} players)",
                self.name, self.max_players
            )));
        }
        if self.contains(identity.id) {
            return Err(CompetitionError::Duplicate(format!(
                "participant {} in {}",
                identity.id, self.name
            )));
        }
        let position = self.roster.len() as u32 + 1;
        self.roster.push(GroupParticipant::new(identity, position, seed, now));
        self.updated_at = now;
        self.refresh_standings();
        Ok(())
    }

    pub fn remove_participant(&mut self, id: ParticipantId, now: DateTime<Utc>) -> CompetitionResult<()> {
        self.ensure_editable("remove a participant from")?;
        let idx = self.roster_index(id)?;
        self.roster.remove(idx);
        self.updated_at = now;
        self.refresh_standings();
        Ok(())
    }

    /// Merge externally reported results into the participant's totals.
    pub fn record_result(
        &mut self,
        id: ParticipantId,
        stats: &MatchStatistics,
        now: DateTime<Utc>,
    ) -> CompetitionResult<()> {
        self.ensure_editable("record a result in")?;
        let idx = self.roster_index(id)?;
        let totals = self.roster[idx]
            .statistics()
            .checked_add(stats)
            .ok_or_else(|| {
                CompetitionError::precondition(format!(
                    "results for {} in {} would overflow",
                    self.roster[idx].name, self.name
                ))
            })?;
        let p = &mut self.roster[idx];
        p.wins = totals.wins;
        p.losses = totals.losses;
        p.draws = totals.draws;
        p.points = totals.points;
        p.points_for = totals.points_for;
        p.points_against = totals.points_against;
        self.updated_at = now;
        self.refresh_standings();
        Ok(())
    }

    /// Pending with at least two players.
    pub fn can_start(&self) -> bool {
        self.status == GroupStatus::Pending && self.roster.len() >= MIN_GROUP_PLAYERS
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> CompetitionResult<()> {
        if self.status != GroupStatus::Pending {
            return Err(CompetitionError::transition(Entity::Group, "start", self.status));
        }
        if !self.can_start() {
            return Err(CompetitionError::precondition(format!(
                "{} needs at least {} players, has {}",
                self.name,
                MIN_GROUP_PLAYERS,
                self.roster.len()
            )));
        }
        self.activate(now);
        Ok(())
    }

    /// Unguarded activation used when a round starts all of its groups at once.
    pub(crate) fn activate(&mut self, now: DateTime<Utc>) {
        self.status = GroupStatus::Active;
        if self.start_date.is_none() {
            self.start_date = Some(now.date_naive());
        }
        self.updated_at = now;
        log::info!("{} started", self.name);
    }

    /// Complete the group. With `advancement = Some(k)` the top `k` of the fresh standings
    /// are flagged as advanced; nobody is eliminated here.
    pub fn complete(&mut self, advancement: Option<u32>, now: DateTime<Utc>) -> CompetitionResult<()> {
        if self.status != GroupStatus::Active {
            return Err(CompetitionError::transition(Entity::Group, "complete", self.status));
        }
        self.status = GroupStatus::Completed;
        if self.end_date.is_none() {
            self.end_date = Some(now.date_naive());
        }
        self.updated_at = now;
        self.refresh_standings();

        if let Some(k) = advancement {
            let count = (k as usize).min(self.standings.len());
            let advancing: Vec<ParticipantId> = self.standings[..count]
                .iter()
                .map(|s| s.participant_id)
                .collect();
            for p in self.roster.iter_mut().filter(|p| advancing.contains(&p.participant_id)) {
                p.advanced = true;
            }
        }
        log::info!("{} completed", self.name);
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> CompetitionResult<()> {
        self.ensure_editable("cancel")?;
        self.status = GroupStatus::Cancelled;
        self.updated_at = now;
        log::info!("{} cancelled", self.name);
        Ok(())
    }

    /// Flag a participant as advanced by hand.
    pub fn advance_participant(&mut self, id: ParticipantId, now: DateTime<Utc>) -> CompetitionResult<()> {
        let idx = self.roster_index(id)?;
        self.roster[idx].advanced = true;
        self.updated_at = now;
        Ok(())
    }

    pub fn eliminate_participant(&mut self, id: ParticipantId, now: DateTime<Utc>) -> CompetitionResult<()> {
        let idx = self.roster_index(id)?;
        self.roster[idx].eliminated = true;
        self.updated_at = now;
        Ok(())
    }
}

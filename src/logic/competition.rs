//! Competition lifecycle: registration, start, round sequencing, completion and cancellation.
//!
//! Every operation checks all of its guards before writing anything, so a failed call leaves
//! the aggregate exactly as it was.

use crate::logic::pairing::{PairingStrategy, Shuffled, StandingsOrder};
use crate::logic::planner::plan_bracket;
use crate::logic::standings::calculate_standings;
use crate::models::{
    BracketSide, Competition, CompetitionError, CompetitionFormat, CompetitionResult,
    CompetitionStatus, Entity, GroupParticipant, Identity, MatchStatistics, PairingMethod,
    Participant, ParticipantId, ParticipantRole, ParticipantStatus, RegistrationStatus, Round,
    RoundStatus, Standing, StatLine,
};
use chrono::{DateTime, Utc};

impl Competition {
    fn participant_index(&self, id: ParticipantId) -> CompetitionResult<usize> {
        self.participants
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CompetitionError::NotFound(format!("participant {}", id)))
    }

    fn round_index(&self, round_number: u32) -> CompetitionResult<usize> {
        self.rounds
            .iter()
            .position(|r| r.round_number == round_number)
            .ok_or_else(|| CompetitionError::NotFound(format!("round {}", round_number)))
    }

    fn ensure_not_terminal(&self, operation: &'static str) -> CompetitionResult<()> {
        if self.status.is_terminal() {
            return Err(CompetitionError::transition(Entity::Competition, operation, self.status));
        }
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    // ---- registration ----

    /// Draft → open.
    pub fn open_registration(&mut self, now: DateTime<Utc>) -> CompetitionResult<()> {
        if self.status != CompetitionStatus::Draft {
            return Err(CompetitionError::transition(
                Entity::Competition,
                "open registration for",
                self.status,
            ));
        }
        self.status = CompetitionStatus::Open;
        self.touch(now);
        log::info!("{}: registration opened", self.name);
        Ok(())
    }

    fn within_registration_window(&self, now: DateTime<Utc>) -> bool {
        let today = now.date_naive();
        if self.registration_start.is_some_and(|start| today < start) {
            return false;
        }
        if self.registration_end.is_some_and(|end| today > end) {
            return false;
        }
        true
    }

    /// Open, and `now` falls inside the registration window when one is set.
    pub fn is_registration_open(&self, now: DateTime<Utc>) -> bool {
        self.status == CompetitionStatus::Open && self.within_registration_window(now)
    }

    pub fn registration_status(&self, now: DateTime<Utc>) -> RegistrationStatus {
        if !self.is_registration_open(now) {
            return match self.status {
                CompetitionStatus::Draft => RegistrationStatus::NotYetOpen,
                CompetitionStatus::InProgress => RegistrationStatus::InProgress,
                CompetitionStatus::Completed => RegistrationStatus::Completed,
                CompetitionStatus::Open | CompetitionStatus::Cancelled => RegistrationStatus::Closed,
            };
        }
        if self.is_full() {
            return RegistrationStatus::Full;
        }
        RegistrationStatus::Open
    }

    /// Register an already-vetted identity as a player.
    pub fn register_participant(&mut self, identity: Identity, now: DateTime<Utc>) -> CompetitionResult<()> {
        if self.status != CompetitionStatus::Open {
            return Err(CompetitionError::transition(Entity::Competition, "register for", self.status));
        }
        if !self.within_registration_window(now) {
            return Err(CompetitionError::precondition(format!(
                "registration window for {} is closed",
                self.name
            )));
        }
        if self.is_full() {
            return Err(CompetitionError::precondition(format!(
                "{} is full ({} confirmed)",
                self.name,
                self.participant_count()
            )));
        }
        if self.participant(identity.id).is_some() {
            return Err(CompetitionError::Duplicate(format!("registration of {}", identity.id)));
        }
        log::info!("{}: registered {}", self.name, identity.name);
        self.participants
            .push(Participant::register(identity, self.entry_fee, now));
        self.touch(now);
        Ok(())
    }

    /// Registered → confirmed. Confirmed players fill the capacity.
    pub fn confirm_participant(&mut self, id: ParticipantId, now: DateTime<Utc>) -> CompetitionResult<()> {
        self.ensure_not_terminal("confirm a participant in")?;
        let idx = self.participant_index(id)?;
        let status = self.participants[idx].status;
        if status != ParticipantStatus::Registered {
            return Err(CompetitionError::transition(Entity::Participant, "confirm", status));
        }
        if self.participants[idx].is_player() && self.is_full() {
            return Err(CompetitionError::precondition(format!("{} is full", self.name)));
        }
        let p = &mut self.participants[idx];
        p.status = ParticipantStatus::Confirmed;
        p.confirmed_at = Some(now);
        p.updated_at = now;
        self.touch(now);
        Ok(())
    }

    /// Registered/confirmed → withdrawn, with an optional reason.
    pub fn withdraw_participant(
        &mut self,
        id: ParticipantId,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> CompetitionResult<()> {
        self.ensure_not_terminal("withdraw a participant from")?;
        let idx = self.participant_index(id)?;
        let status = self.participants[idx].status;
        if !matches!(status, ParticipantStatus::Registered | ParticipantStatus::Confirmed) {
            return Err(CompetitionError::transition(Entity::Participant, "withdraw", status));
        }
        let p = &mut self.participants[idx];
        p.status = ParticipantStatus::Withdrawn;
        p.withdrawn_at = Some(now);
        p.withdrawal_reason = reason;
        p.updated_at = now;
        self.touch(now);
        Ok(())
    }

    /// Confirmed → eliminated. Also flags the participant in their group of the active round.
    pub fn eliminate_participant(&mut self, id: ParticipantId, now: DateTime<Utc>) -> CompetitionResult<()> {
        self.ensure_not_terminal("eliminate a participant from")?;
        let idx = self.participant_index(id)?;
        let status = self.participants[idx].status;
        if status != ParticipantStatus::Confirmed {
            return Err(CompetitionError::transition(Entity::Participant, "eliminate", status));
        }
        if let Some(round) = self.rounds.iter_mut().find(|r| r.status == RoundStatus::Active) {
            if let Some(group_number) = round.group_of(id).map(|g| g.group_number) {
                round.eliminate_group_participant(group_number, id, now)?;
            }
        }
        let p = &mut self.participants[idx];
        p.status = ParticipantStatus::Eliminated;
        p.updated_at = now;
        self.touch(now);
        Ok(())
    }

    pub fn disqualify_participant(&mut self, id: ParticipantId, now: DateTime<Utc>) -> CompetitionResult<()> {
        self.ensure_not_terminal("disqualify a participant from")?;
        let idx = self.participant_index(id)?;
        let status = self.participants[idx].status;
        if matches!(status, ParticipantStatus::Withdrawn | ParticipantStatus::Disqualified) {
            return Err(CompetitionError::transition(Entity::Participant, "disqualify", status));
        }
        let p = &mut self.participants[idx];
        p.status = ParticipantStatus::Disqualified;
        p.updated_at = now;
        self.touch(now);
        Ok(())
    }

    /// Make `identity` a confirmed admin, upgrading an existing record if there is one.
    pub fn add_admin(&mut self, identity: Identity, now: DateTime<Utc>) -> CompetitionResult<()> {
        self.ensure_not_terminal("add an admin to")?;
        self.add_official(identity, ParticipantRole::Admin, now);
        Ok(())
    }

    /// Same as [`Competition::add_admin`] with the organizer role.
    pub fn add_organizer(&mut self, identity: Identity, now: DateTime<Utc>) -> CompetitionResult<()> {
        self.ensure_not_terminal("add an organizer to")?;
        self.add_official(identity, ParticipantRole::Organizer, now);
        Ok(())
    }

    fn add_official(&mut self, identity: Identity, role: ParticipantRole, now: DateTime<Utc>) {
        match self.participants.iter_mut().find(|p| p.id == identity.id) {
            Some(p) => {
                p.role = role;
                p.status = ParticipantStatus::Confirmed;
                p.updated_at = now;
            }
            None => {
                let mut p = Participant::register(identity, None, now);
                p.role = role;
                p.status = ParticipantStatus::Confirmed;
                p.confirmed_at = Some(now);
                p.fee_paid = true;
                self.participants.push(p);
            }
        }
        self.touch(now);
    }

    pub fn set_seed(&mut self, id: ParticipantId, seed: Option<u32>, now: DateTime<Utc>) -> CompetitionResult<()> {
        self.ensure_not_terminal("seed a participant in")?;
        let idx = self.participant_index(id)?;
        self.participants[idx].seed = seed;
        self.participants[idx].updated_at = now;
        self.touch(now);
        Ok(())
    }

    // ---- standings ----

    /// Competition-wide table over confirmed players, in registration order before sorting.
    pub fn leaderboard(&self) -> Vec<Standing> {
        let lines: Vec<StatLine> = self
            .confirmed_players()
            .map(|p| StatLine {
                participant_id: p.id,
                name: p.name.clone(),
                wins: p.wins,
                losses: p.losses,
                draws: p.draws,
                points: p.points,
                points_for: None,
                points_against: None,
            })
            .collect();
        calculate_standings(&lines)
    }

    /// Copy leaderboard positions into `current_ranking`.
    pub fn refresh_rankings(&mut self) {
        let board = self.leaderboard();
        for standing in board {
            if let Some(p) = self.participants.iter_mut().find(|p| p.id == standing.participant_id) {
                p.current_ranking = Some(standing.position);
            }
        }
    }

    /// Report results for a participant in a group: updates the group pivot, the
    /// competition-wide totals and the rankings.
    pub fn record_result(
        &mut self,
        round_number: u32,
        group_number: u32,
        id: ParticipantId,
        stats: &MatchStatistics,
        now: DateTime<Utc>,
    ) -> CompetitionResult<()> {
        self.ensure_not_terminal("record a result in")?;
        let ri = self.round_index(round_number)?;
        let totals = match self.participants.iter().position(|p| p.id == id) {
            Some(pi) => {
                let p = &self.participants[pi];
                let merged = p.statistics().checked_add(stats).ok_or_else(|| {
                    CompetitionError::precondition(format!("results for {} would overflow", p.name))
                })?;
                Some((pi, merged))
            }
            None => None,
        };
        self.rounds[ri].record_group_result(group_number, id, stats, now)?;
        if let Some((pi, merged)) = totals {
            self.participants[pi].set_statistics(&merged, now);
        }
        self.refresh_rankings();
        self.touch(now);
        Ok(())
    }

    // ---- lifecycle ----

    /// Open → in progress once enough players are confirmed. Plans the rounds if none exist.
    pub fn start(&mut self, now: DateTime<Utc>) -> CompetitionResult<()> {
        if self.status != CompetitionStatus::Open {
            return Err(CompetitionError::transition(Entity::Competition, "start", self.status));
        }
        let confirmed = self.participant_count();
        if confirmed < self.min_participants as usize {
            return Err(CompetitionError::precondition(format!(
                "{} needs at least {} confirmed participants, has {}",
                self.name, self.min_participants, confirmed
            )));
        }

        if self.rounds.is_empty() {
            let plan = plan_bracket(self.format, confirmed, &self.settings)?;
            self.rounds = plan.rounds.iter().map(|spec| spec.materialize(now)).collect();
            self.total_rounds = plan.total_rounds;
            log::info!(
                "{}: planned {} round(s) for {} participants",
                self.name,
                self.rounds.len(),
                confirmed
            );
        }

        self.status = CompetitionStatus::InProgress;
        if self.start_date.is_none() {
            self.start_date = Some(now.date_naive());
        }
        self.touch(now);
        log::info!("{}: started", self.name);
        Ok(())
    }

    /// Pairing strategy picked by the round's settings.
    fn strategy_for(round: &Round) -> Box<dyn PairingStrategy> {
        match round.settings.pairing_method {
            Some(PairingMethod::Random) => Box::new(Shuffled),
            Some(PairingMethod::ScoreBased) | None => Box::new(StandingsOrder),
        }
    }

    /// Activate the next pending round, populating its groups first when it has none.
    pub fn advance_round(&mut self, now: DateTime<Utc>) -> CompetitionResult<()> {
        let strategy: Box<dyn PairingStrategy> = match self.next_round() {
            Some(round) => Self::strategy_for(round),
            None => Box::new(StandingsOrder),
        };
        self.advance_round_with(strategy.as_ref(), now)
    }

    /// As [`Competition::advance_round`], with an explicit Swiss pairing strategy.
    pub fn advance_round_with(
        &mut self,
        strategy: &dyn PairingStrategy,
        now: DateTime<Utc>,
    ) -> CompetitionResult<()> {
        if self.status != CompetitionStatus::InProgress {
            return Err(CompetitionError::transition(Entity::Competition, "advance", self.status));
        }
        if let Some(active) = self.current_round() {
            return Err(CompetitionError::RoundNotReady {
                round_number: active.round_number,
                reason: "round is still active".to_string(),
            });
        }
        let next_number = self
            .next_round()
            .map(|r| r.round_number)
            .ok_or(CompetitionError::NoNextRound)?;
        let ri = self.round_index(next_number)?;

        let mut next = self.rounds[ri].clone();
        if next.groups().is_empty() {
            let entrants = self.entrants_for(&next, strategy);
            next.generate_groups(&entrants, now)?;
        }
        next.start(now)?;

        self.rounds[ri] = next;
        self.rounds_completed = self.count_completed_rounds();
        self.touch(now);
        log::info!(
            "{}: advanced to round {} ({} completed)",
            self.name,
            next_number,
            self.rounds_completed
        );
        Ok(())
    }

    /// In progress → completed once the final round is completed.
    pub fn complete(&mut self, now: DateTime<Utc>) -> CompetitionResult<()> {
        if self.status != CompetitionStatus::InProgress {
            return Err(CompetitionError::transition(Entity::Competition, "complete", self.status));
        }
        let final_number = self
            .final_round_number()
            .ok_or_else(|| CompetitionError::precondition(format!("{} has no rounds", self.name)))?;
        let final_round = self.round(final_number).ok_or_else(|| {
            CompetitionError::precondition(format!("final round {} has not been created", final_number))
        })?;
        if final_round.status != RoundStatus::Completed {
            return Err(CompetitionError::precondition(format!(
                "final round {} is {}",
                final_number, final_round.status
            )));
        }

        self.status = CompetitionStatus::Completed;
        self.rounds_completed = self.count_completed_rounds();
        if self.end_date.is_none() {
            self.end_date = Some(now.date_naive());
        }
        self.refresh_rankings();
        self.touch(now);
        log::info!("{}: completed", self.name);
        Ok(())
    }

    /// Any non-terminal state → cancelled. Unfinished rounds are cancelled with it.
    pub fn cancel(&mut self, reason: Option<String>, now: DateTime<Utc>) -> CompetitionResult<()> {
        self.ensure_not_terminal("cancel")?;
        for round in self
            .rounds
            .iter_mut()
            .filter(|r| matches!(r.status, RoundStatus::Pending | RoundStatus::Active))
        {
            round.cancel(now)?;
        }
        self.status = CompetitionStatus::Cancelled;
        self.cancellation_reason = reason;
        self.touch(now);
        log::info!("{}: cancelled", self.name);
        Ok(())
    }

    // ---- rounds ----

    fn count_completed_rounds(&self) -> u32 {
        self.rounds
            .iter()
            .filter(|r| r.status == RoundStatus::Completed)
            .count() as u32
    }

    /// The active round, if any.
    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.iter().find(|r| r.status == RoundStatus::Active)
    }

    /// Lowest-numbered pending round.
    pub fn next_round(&self) -> Option<&Round> {
        self.rounds
            .iter()
            .filter(|r| r.status == RoundStatus::Pending)
            .min_by_key(|r| r.round_number)
    }

    pub fn next_round_after(&self, round_number: u32) -> Option<&Round> {
        self.rounds
            .iter()
            .filter(|r| r.round_number > round_number)
            .min_by_key(|r| r.round_number)
    }

    pub fn previous_round_before(&self, round_number: u32) -> Option<&Round> {
        self.rounds
            .iter()
            .filter(|r| r.round_number < round_number)
            .max_by_key(|r| r.round_number)
    }

    /// `total_rounds`, or the highest round number for open-ended formats.
    pub fn final_round_number(&self) -> Option<u32> {
        self.total_rounds
            .or_else(|| self.rounds.iter().map(|r| r.round_number).max())
    }

    pub fn is_final_round(&self, round_number: u32) -> bool {
        self.final_round_number() == Some(round_number)
    }

    /// Add a hand-built round (formats whose groups are configured externally).
    pub fn add_round(&mut self, round: Round, now: DateTime<Utc>) -> CompetitionResult<()> {
        self.ensure_not_terminal("add a round to")?;
        if self.round(round.round_number).is_some() {
            return Err(CompetitionError::Duplicate(format!("round {}", round.round_number)));
        }
        self.rounds.push(round);
        self.rounds.sort_by_key(|r| r.round_number);
        if self.total_rounds.is_some() || self.format != CompetitionFormat::Ladder {
            self.total_rounds = Some(self.rounds.len() as u32);
        }
        self.touch(now);
        Ok(())
    }

    /// Run `op` against one round, refusing once the competition has finished.
    fn with_round<T>(
        &mut self,
        round_number: u32,
        operation: &'static str,
        now: DateTime<Utc>,
        op: impl FnOnce(&mut Round) -> CompetitionResult<T>,
    ) -> CompetitionResult<T> {
        self.ensure_not_terminal(operation)?;
        let ri = self.round_index(round_number)?;
        let out = op(&mut self.rounds[ri])?;
        self.touch(now);
        Ok(out)
    }

    pub fn generate_groups(
        &mut self,
        round_number: u32,
        participants: &[Identity],
        now: DateTime<Utc>,
    ) -> CompetitionResult<()> {
        self.with_round(round_number, "generate groups in", now, |r| {
            r.generate_groups(participants, now)
        })
    }

    pub fn start_round(&mut self, round_number: u32, now: DateTime<Utc>) -> CompetitionResult<()> {
        self.with_round(round_number, "start a round in", now, |r| r.start(now))
    }

    pub fn complete_round(&mut self, round_number: u32, now: DateTime<Utc>) -> CompetitionResult<()> {
        self.with_round(round_number, "complete a round in", now, |r| r.complete(now))
    }

    pub fn cancel_round(&mut self, round_number: u32, now: DateTime<Utc>) -> CompetitionResult<()> {
        self.with_round(round_number, "cancel a round in", now, |r| r.cancel(now))
    }

    pub fn start_group(&mut self, round_number: u32, group_number: u32, now: DateTime<Utc>) -> CompetitionResult<()> {
        self.with_round(round_number, "start a group in", now, |r| r.start_group(group_number, now))
    }

    pub fn complete_group(
        &mut self,
        round_number: u32,
        group_number: u32,
        now: DateTime<Utc>,
    ) -> CompetitionResult<()> {
        self.with_round(round_number, "complete a group in", now, |r| {
            r.complete_group(group_number, now)
        })
    }

    pub fn cancel_group(&mut self, round_number: u32, group_number: u32, now: DateTime<Utc>) -> CompetitionResult<()> {
        self.with_round(round_number, "cancel a group in", now, |r| r.cancel_group(group_number, now))
    }

    pub fn add_group_participant(
        &mut self,
        round_number: u32,
        group_number: u32,
        identity: Identity,
        seed: Option<u32>,
        now: DateTime<Utc>,
    ) -> CompetitionResult<()> {
        self.with_round(round_number, "add a group participant in", now, |r| {
            r.add_group_participant(group_number, identity, seed, now)
        })
    }

    pub fn remove_group_participant(
        &mut self,
        round_number: u32,
        group_number: u32,
        id: ParticipantId,
        now: DateTime<Utc>,
    ) -> CompetitionResult<()> {
        self.with_round(round_number, "remove a group participant in", now, |r| {
            r.remove_group_participant(group_number, id, now)
        })
    }

    // ---- entrants ----

    /// Confirmed players by seed (unseeded last), ties in registration order.
    pub fn seeded_entrants(&self) -> Vec<Identity> {
        let mut players: Vec<&Participant> = self.confirmed_players().collect();
        players.sort_by_key(|p| (p.seed.is_none(), p.seed));
        players
            .into_iter()
            .map(|p| Identity::new(p.id, p.name.clone()))
            .collect()
    }

    /// Who plays in `round` when its groups have not been generated yet.
    fn entrants_for(&self, round: &Round, strategy: &dyn PairingStrategy) -> Vec<Identity> {
        let Some(previous) = self.previous_round_before(round.round_number) else {
            return self.seeded_entrants();
        };
        match round.bracket() {
            BracketSide::Swiss => strategy.order(&self.leaderboard()),
            BracketSide::Losers => self.losers_bracket_entrants(round),
            BracketSide::Main | BracketSide::Winners | BracketSide::GroupStage => {
                roster_identities(previous, |p| p.advanced)
            }
        }
    }

    /// Losers round i: the non-advanced players of winners round i, then the advanced
    /// players of losers round i - 1.
    fn losers_bracket_entrants(&self, round: &Round) -> Vec<Identity> {
        let winners_rounds = self
            .rounds
            .iter()
            .filter(|r| r.bracket() == BracketSide::Winners)
            .count() as u32;
        let index = round.round_number.saturating_sub(winners_rounds);

        let mut entrants = self
            .round(index)
            .map(|w| roster_identities(w, |p| !p.advanced))
            .unwrap_or_default();
        if index > 1 {
            if let Some(previous) = self.round(round.round_number - 1) {
                entrants.extend(roster_identities(previous, |p| p.advanced));
            }
        }
        entrants
    }
}

fn roster_identities(
    round: &Round,
    keep: impl Fn(&GroupParticipant) -> bool,
) -> Vec<Identity> {
    round
        .groups()
        .iter()
        .flat_map(|g| g.roster().iter())
        .filter(|p| keep(p))
        .map(|p| Identity::new(p.participant_id, p.name.clone()))
        .collect()
}

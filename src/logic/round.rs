//! Round lifecycle: group generation, start/complete/cancel and per-group operations.

use crate::models::{
    CompetitionError, CompetitionResult, Entity, Group, GroupStatus, Identity, MatchStatistics,
    ParticipantId, Round, RoundStatus,
};
use chrono::{DateTime, Utc};

const GROUP_LETTERS: [char; 12] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L'];

/// "Group A".."Group L" for up to 12 groups, "Group N" beyond.
pub fn group_name(group_number: u32, total_groups: u32) -> String {
    if total_groups as usize <= GROUP_LETTERS.len() {
        let letter = (group_number as usize)
            .checked_sub(1)
            .and_then(|index| GROUP_LETTERS.get(index));
        if let Some(letter) = letter {
            return format!("Group {}", letter);
        }
    }
    format!("Group {}", group_number)
}

impl Round {
    pub(crate) fn group_mut(&mut self, group_number: u32) -> CompetitionResult<&mut Group> {
        let round_number = self.round_number;
        self.groups
            .iter_mut()
            .find(|g| g.group_number == group_number)
            .ok_or_else(|| {
                CompetitionError::NotFound(format!("group {} in round {}", group_number, round_number))
            })
    }

    /// Split `participants` into `total_groups` groups, in input order.
    ///
    /// Each group gets floor(n / total_groups) players and room for one more; the last
    /// group also takes the leftover players. Seeds are the 1-based position within the
    /// group. Only one generation per round: a second call fails with `GroupsAlreadyExist`.
    pub fn generate_groups(&mut self, participants: &[Identity], now: DateTime<Utc>) -> CompetitionResult<()> {
        if !self.groups.is_empty() {
            return Err(CompetitionError::GroupsAlreadyExist {
                round_number: self.round_number,
            });
        }
        if self.status != RoundStatus::Pending {
            return Err(CompetitionError::transition(Entity::Round, "generate groups for", self.status));
        }
        if self.total_groups == 0 {
            return Err(CompetitionError::precondition(format!(
                "round {} has no planned groups",
                self.round_number
            )));
        }

        let total = self.total_groups as usize;
        let group_size = participants.len() / total;
        let leftover = participants.len() % total;

        let mut groups = Vec::with_capacity(total);
        for i in 0..total {
            let is_last = i + 1 == total;
            let start = i * group_size;
            let end = if is_last { participants.len() } else { start + group_size };
            let max_players = if is_last {
                group_size + leftover.max(1)
            } else {
                group_size + 1
            };
            let group_number = i as u32 + 1;
            let mut group = Group::new(
                group_number,
                group_name(group_number, self.total_groups),
                max_players as u32,
                now,
            );
            for (index, identity) in participants[start..end].iter().enumerate() {
                group.add_participant(identity.clone(), Some(index as u32 + 1), now)?;
            }
            groups.push(group);
        }

        self.groups = groups;
        self.updated_at = now;
        log::info!(
            "{}: generated {} group(s) for {} participant(s)",
            self.name,
            total,
            participants.len()
        );
        Ok(())
    }

    /// Pending, and every planned group exists with at least one participant.
    pub fn can_start(&self) -> bool {
        let populated = self
            .groups
            .iter()
            .filter(|g| g.participant_count() > 0)
            .count();
        self.status == RoundStatus::Pending && populated == self.total_groups as usize
    }

    /// Start the round and every pending group in it.
    pub fn start(&mut self, now: DateTime<Utc>) -> CompetitionResult<()> {
        if self.status != RoundStatus::Pending {
            return Err(CompetitionError::transition(Entity::Round, "start", self.status));
        }
        if !self.can_start() {
            return Err(CompetitionError::precondition(format!(
                "{}: not every one of its {} group(s) has participants",
                self.name, self.total_groups
            )));
        }
        self.status = RoundStatus::Active;
        if self.start_date.is_none() {
            self.start_date = Some(now.date_naive());
        }
        self.updated_at = now;
        for group in self.groups.iter_mut().filter(|g| g.status == GroupStatus::Pending) {
            group.activate(now);
        }
        log::info!("{} started", self.name);
        Ok(())
    }

    /// Complete the round once it is active and all of its groups are completed.
    pub fn complete(&mut self, now: DateTime<Utc>) -> CompetitionResult<()> {
        if self.status != RoundStatus::Active {
            return Err(CompetitionError::RoundNotReady {
                round_number: self.round_number,
                reason: format!("round is {}", self.status),
            });
        }
        let completed = self.completed_groups();
        if completed != self.total_groups as usize {
            return Err(CompetitionError::RoundNotReady {
                round_number: self.round_number,
                reason: format!("{} of {} group(s) completed", completed, self.total_groups),
            });
        }
        self.status = RoundStatus::Completed;
        if self.end_date.is_none() {
            self.end_date = Some(now.date_naive());
        }
        self.updated_at = now;
        log::info!("{} completed", self.name);
        Ok(())
    }

    /// Cancel the round and its unfinished groups.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> CompetitionResult<()> {
        if !matches!(self.status, RoundStatus::Pending | RoundStatus::Active) {
            return Err(CompetitionError::transition(Entity::Round, "cancel", self.status));
        }
        self.status = RoundStatus::Cancelled;
        self.updated_at = now;
        for group in self
            .groups
            .iter_mut()
            .filter(|g| matches!(g.status, GroupStatus::Pending | GroupStatus::Active))
        {
            group.cancel(now)?;
        }
        log::info!("{} cancelled", self.name);
        Ok(())
    }

    pub fn start_group(&mut self, group_number: u32, now: DateTime<Utc>) -> CompetitionResult<()> {
        self.group_mut(group_number)?.start(now)
    }

    /// Complete one group, applying this round's advancement rule.
    pub fn complete_group(&mut self, group_number: u32, now: DateTime<Utc>) -> CompetitionResult<()> {
        let advancement = self.advancement();
        self.group_mut(group_number)?.complete(advancement, now)
    }

    pub fn cancel_group(&mut self, group_number: u32, now: DateTime<Utc>) -> CompetitionResult<()> {
        self.group_mut(group_number)?.cancel(now)
    }

    pub fn add_group_participant(
        &mut self,
        group_number: u32,
        identity: Identity,
        seed: Option<u32>,
        now: DateTime<Utc>,
    ) -> CompetitionResult<()> {
        if let Some(other) = self.groups.iter().find(|g| g.contains(identity.id)) {
            if other.group_number != group_number {
                return Err(CompetitionError::Duplicate(format!(
                    "participant {} in {} of round {}",
                    identity.id, other.name, self.round_number
                )));
            }
        }
        self.group_mut(group_number)?.add_participant(identity, seed, now)
    }

    pub fn remove_group_participant(
        &mut self,
        group_number: u32,
        id: ParticipantId,
        now: DateTime<Utc>,
    ) -> CompetitionResult<()> {
        self.group_mut(group_number)?.remove_participant(id, now)
    }

    pub fn record_group_result(
        &mut self,
        group_number: u32,
        id: ParticipantId,
        stats: &MatchStatistics,
        now: DateTime<Utc>,
    ) -> CompetitionResult<()> {
        self.group_mut(group_number)?.record_result(id, stats, now)
    }

    pub fn eliminate_group_participant(
        &mut self,
        group_number: u32,
        id: ParticipantId,
        now: DateTime<Utc>,
    ) -> CompetitionResult<()> {
        self.group_mut(group_number)?.eliminate_participant(id, now)
    }

    /// The group a participant plays in during this round, if any.
    pub fn group_of(&self, id: ParticipantId) -> Option<&Group> {
        self.groups.iter().find(|g| g.contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_names_use_letters_up_to_twelve() {
        assert_eq!(group_name(1, 4), "Group A");
        assert_eq!(group_name(12, 12), "Group L");
        assert_eq!(group_name(1, 13), "Group 1");
        assert_eq!(group_name(13, 13), "Group 13");
    }
}

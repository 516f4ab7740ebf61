//! Single-elimination bracket
//!
//! Rounds are numbered from 1. Winners of round k matches 2i and 2i+1 meet in
//! round k+1 match i.

use serde::{Deserialize, Serialize};

use super::types::{MatchStatus, ParticipantId};
use crate::error::{ConfigError, TournamentError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    /// "r{round}_m{number}"
    pub id: String,
    pub round: u32,
    pub number: usize,
    pub slots: [Option<ParticipantId>; 2],
    pub scores: [u32; 2],
    pub winner: Option<ParticipantId>,
    pub status: MatchStatus,
    /// Seconds of live play, when the match was played rather than simulated
    pub elapsed: Option<f64>,
}

impl BracketMatch {
    fn new(round: u32, number: usize, slots: [Option<ParticipantId>; 2]) -> Self {
        Self {
            id: format!("r{}_m{}", round, number),
            round,
            number,
            slots,
            scores: [0, 0],
            winner: None,
            status: MatchStatus::Pending,
            elapsed: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.slots[0].is_some() && self.slots[1].is_some()
    }

    pub fn involves(&self, id: ParticipantId) -> bool {
        self.slots.contains(&Some(id))
    }

    /// The participant that lost, once decided
    pub fn loser(&self) -> Option<ParticipantId> {
        let winner = self.winner?;
        self.slots.iter().flatten().copied().find(|&p| p != winner)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    rounds: Vec<Vec<BracketMatch>>,
}

impl Bracket {
    /// Pair `seeded` in order into round one and pre-allocate later rounds
    pub fn generate(seeded: &[ParticipantId], rounds: u32) -> Result<Self, ConfigError> {
        let count = seeded.len();
        if count < 2 || !count.is_power_of_two() {
            return Err(ConfigError::ParticipantCount(count));
        }
        if count != 1usize << rounds {
            return Err(ConfigError::RoundMismatch {
                participants: count,
                rounds,
            });
        }

        let first = seeded
            .chunks(2)
            .enumerate()
            .map(|(i, pair)| BracketMatch::new(1, i, [Some(pair[0]), Some(pair[1])]))
            .collect();

        let mut all = vec![first];
        for round in 2..=rounds {
            let matches = count >> round;
            all.push(
                (0..matches)
                    .map(|i| BracketMatch::new(round, i, [None, None]))
                    .collect(),
            );
        }

        Ok(Self { rounds: all })
    }

    pub fn rounds(&self) -> &[Vec<BracketMatch>] {
        &self.rounds
    }

    pub fn total_rounds(&self) -> u32 {
        self.rounds.len() as u32
    }

    pub fn total_matches(&self) -> usize {
        self.rounds.iter().map(Vec::len).sum()
    }

    pub fn round_len(&self, round: u32) -> usize {
        self.round(round).map(Vec::len).unwrap_or(0)
    }

    pub fn get(&self, round: u32, number: usize) -> Option<&BracketMatch> {
        self.round(round)?.get(number)
    }

    fn get_mut(&mut self, round: u32, number: usize) -> Option<&mut BracketMatch> {
        let index = (round as usize).checked_sub(1)?;
        self.rounds.get_mut(index)?.get_mut(number)
    }

    fn round(&self, round: u32) -> Option<&Vec<BracketMatch>> {
        let index = (round as usize).checked_sub(1)?;
        self.rounds.get(index)
    }

    pub fn set_status(&mut self, round: u32, number: usize, status: MatchStatus) {
        if let Some(m) = self.get_mut(round, number) {
            m.status = status;
        }
    }

    /// Decide a match and move its winner into the next round.
    ///
    /// The bracket is left untouched on error.
    pub fn record(
        &mut self,
        round: u32,
        number: usize,
        scores: [u32; 2],
        elapsed: Option<f64>,
    ) -> Result<ParticipantId, TournamentError> {
        let total_rounds = self.total_rounds();
        let m = self
            .get_mut(round, number)
            .ok_or(TournamentError::NoActiveTournament)?;

        if m.status == MatchStatus::Completed {
            return Err(TournamentError::AlreadyCompleted);
        }
        let [Some(first), Some(second)] = m.slots else {
            return Err(TournamentError::MatchNotReady(m.id.clone()));
        };
        if scores[0] == scores[1] {
            return Err(TournamentError::TieScore(scores[0]));
        }

        let winner = if scores[0] > scores[1] { first } else { second };
        m.scores = scores;
        m.winner = Some(winner);
        m.status = MatchStatus::Completed;
        m.elapsed = elapsed;

        if round < total_rounds {
            let slot = number % 2;
            if let Some(next) = self.get_mut(round + 1, number / 2) {
                next.slots[slot] = Some(winner);
            }
        }

        Ok(winner)
    }

    /// Winner of the final, once played
    pub fn champion(&self) -> Option<ParticipantId> {
        self.rounds.last()?.first()?.winner
    }

    /// Round in which `id` was knocked out, if they were
    pub fn round_lost(&self, id: ParticipantId) -> Option<u32> {
        self.rounds
            .iter()
            .flatten()
            .find(|m| m.loser() == Some(id))
            .map(|m| m.round)
    }

    /// Final standing: 1 for the champion, 2 for the runner-up, then 4, 8...
    pub fn placement(&self, id: ParticipantId) -> u32 {
        match self.round_lost(id) {
            Some(round) => 1 << (self.total_rounds() - round + 1),
            None => 1,
        }
    }

    /// Every decided match so far, in round order
    pub fn completed(&self) -> impl Iterator<Item = &BracketMatch> {
        self.rounds
            .iter()
            .flatten()
            .filter(|m| m.status == MatchStatus::Completed)
    }
}

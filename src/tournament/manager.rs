//! Tournament lifecycle: creation, progression, completion
//!
//! The cursor always points at the first undecided match of the earliest
//! unfinished round. AI-only matches in that round are simulated by
//! [`TournamentManager::auto_progress`], so the cursor comes to rest on the
//! human's match.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bracket::{Bracket, BracketMatch};
use super::history::{HistoryEntry, PlayerProfile, TournamentHistory};
use super::types::{
    MatchStatus, Participant, ParticipantId, ROSTER, TournamentConfig, TournamentKind,
    TournamentStatus,
};
use crate::error::TournamentError;

/// One tournament in progress or just finished
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: String,
    pub kind: TournamentKind,
    pub player_name: String,
    pub participants: Vec<Participant>,
    pub bracket: Bracket,
    /// 1-based
    pub current_round: u32,
    /// 0-based within the current round
    pub current_match: usize,
    pub status: TournamentStatus,
    pub champion: Option<ParticipantId>,
    /// Human's final standing, set on completion
    pub placement: Option<u32>,
    /// Seconds of live play reported for the human's matches
    pub play_time: f64,
}

impl Tournament {
    pub fn config(&self) -> TournamentConfig {
        self.kind.config()
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn human(&self) -> Option<&Participant> {
        self.participants.iter().find(|p| p.is_human())
    }

    pub fn is_complete(&self) -> bool {
        self.status == TournamentStatus::Completed
    }

    /// Match under the cursor; `None` once the tournament is decided
    pub fn current_match(&self) -> Option<&BracketMatch> {
        if self.is_complete() {
            return None;
        }
        self.bracket.get(self.current_round, self.current_match)
    }

    /// Whether the match has a human in either slot
    pub fn involves_human(&self, m: &BracketMatch) -> bool {
        m.slots
            .iter()
            .flatten()
            .any(|&id| self.participant(id).is_some_and(Participant::is_human))
    }

    fn advance_cursor(&mut self) {
        let next = self
            .bracket
            .rounds()
            .iter()
            .flatten()
            .find(|m| m.status != MatchStatus::Completed)
            .map(|m| (m.round, m.number));
        if let Some((round, number)) = next {
            if round != self.current_round {
                log::info!("Tournament {} enters round {}", self.id, round);
            }
            self.current_round = round;
            self.current_match = number;
        }
    }

    fn participant_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }
}

/// Read-only bracket for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketView {
    pub id: String,
    pub kind: TournamentKind,
    pub name: String,
    pub status: TournamentStatus,
    pub current_round: u32,
    pub total_rounds: u32,
    pub rounds: Vec<Vec<BracketMatch>>,
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentSummary {
    pub kind: TournamentKind,
    pub round: u32,
    pub total_rounds: u32,
    pub status: TournamentStatus,
    pub player_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentStats {
    pub current: Option<CurrentSummary>,
    pub profile: PlayerProfile,
    pub history: Vec<HistoryEntry>,
}

/// Scores for a match nobody watches.
///
/// Each side rolls its tier plus 0-2; the higher roll takes the match at
/// `score_limit`, the loser trails by the roll gap plus one. Equal rolls go
/// to the second side.
pub fn simulate_scores<R: Rng>(rng: &mut R, tiers: [u32; 2], score_limit: u32) -> [u32; 2] {
    let first = tiers[0] + rng.random_range(0..3);
    let second = tiers[1] + rng.random_range(0..3);
    let loser = score_limit.saturating_sub(first.abs_diff(second) + 1);
    if first > second {
        [score_limit, loser]
    } else {
        [loser, score_limit]
    }
}

/// Owns the active tournament, the player profile and the history
#[derive(Debug, Clone)]
pub struct TournamentManager {
    current: Option<Tournament>,
    profile: PlayerProfile,
    history: TournamentHistory,
    rng: Pcg32,
}

impl TournamentManager {
    pub fn new(seed: u64) -> Self {
        Self::with_records(PlayerProfile::default(), TournamentHistory::new(), seed)
    }

    pub fn with_records(profile: PlayerProfile, history: TournamentHistory, seed: u64) -> Self {
        Self {
            current: None,
            profile,
            history,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn tournament(&self) -> Option<&Tournament> {
        self.current.as_ref()
    }

    /// A tournament exists and is not yet decided
    pub fn is_active(&self) -> bool {
        self.current.as_ref().is_some_and(|t| !t.is_complete())
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn history(&self) -> &TournamentHistory {
        &self.history
    }

    /// Create from a type key such as "quick"
    pub fn create_from_key(
        &mut self,
        key: &str,
        player_name: &str,
    ) -> Result<&Tournament, TournamentError> {
        let kind = TournamentKind::from_str(key).inspect_err(|e| log::error!("{}", e))?;
        self.create_tournament(kind, player_name)
    }

    /// New tournament: the human plus opponents drawn from the shuffled roster
    pub fn create_tournament(
        &mut self,
        kind: TournamentKind,
        player_name: &str,
    ) -> Result<&Tournament, TournamentError> {
        let participants = self.generate_participants(kind, player_name);
        self.create_with_participants(kind, player_name, participants)
    }

    /// New tournament over an explicit field, seeded in random order
    pub fn create_with_participants(
        &mut self,
        kind: TournamentKind,
        player_name: &str,
        participants: Vec<Participant>,
    ) -> Result<&Tournament, TournamentError> {
        let config = kind.config();
        let mut seeded: Vec<ParticipantId> = participants.iter().map(|p| p.id).collect();
        seeded.shuffle(&mut self.rng);
        let bracket = Bracket::generate(&seeded, config.rounds)
            .inspect_err(|e| log::error!("Cannot create {}: {}", config.name, e))?;

        let id = format!("tournament_{:016x}", self.rng.random::<u64>());
        log::info!(
            "Created {} '{}' with {} participants",
            config.name,
            id,
            participants.len()
        );
        if let Some(old) = self.current.as_ref().filter(|t| !t.is_complete()) {
            log::warn!("Replacing unfinished tournament {}", old.id);
        }
        self.profile.name = player_name.to_string();

        let tournament = Tournament {
            id,
            kind,
            player_name: player_name.to_string(),
            participants,
            bracket,
            current_round: 1,
            current_match: 0,
            status: TournamentStatus::Ready,
            champion: None,
            placement: None,
            play_time: 0.0,
        };
        let created: &Tournament = self.current.insert(tournament);
        Ok(created)
    }

    fn generate_participants(&mut self, kind: TournamentKind, player_name: &str) -> Vec<Participant> {
        let mut roster = ROSTER;
        roster.shuffle(&mut self.rng);

        let count = kind.config().participants;
        let mut participants = Vec::with_capacity(count);
        participants.push(Participant::human(player_name));
        for i in 0..count - 1 {
            participants.push(Participant::from_roster(i as u32, &roster[i % roster.len()]));
        }
        participants
    }

    /// Match under the cursor, if any
    pub fn current_match(&self) -> Option<&BracketMatch> {
        self.current.as_ref()?.current_match()
    }

    /// Mark the current match as being played
    pub fn start_current_match(&mut self) -> Result<&BracketMatch, TournamentError> {
        let t = self.active_mut()?;
        let (round, number) = (t.current_round, t.current_match);
        let m = t
            .bracket
            .get(round, number)
            .ok_or(TournamentError::NoActiveTournament)?;
        if !m.is_ready() {
            return Err(TournamentError::MatchNotReady(m.id.clone()));
        }

        t.bracket.set_status(round, number, MatchStatus::InProgress);
        t.status = TournamentStatus::InProgress;
        let m = t
            .bracket
            .get(round, number)
            .ok_or(TournamentError::NoActiveTournament)?;
        log::info!("Match {} started", m.id);
        Ok(m)
    }

    /// Decide the current match. Scores are in bracket slot order and must
    /// not tie.
    pub fn complete_match(
        &mut self,
        score_a: u32,
        score_b: u32,
    ) -> Result<ParticipantId, TournamentError> {
        self.record_current([score_a, score_b], None)
    }

    /// As [`Self::complete_match`], also crediting `elapsed` seconds of play
    pub fn complete_played_match(
        &mut self,
        score_a: u32,
        score_b: u32,
        elapsed: f64,
    ) -> Result<ParticipantId, TournamentError> {
        self.record_current([score_a, score_b], Some(elapsed))
    }

    fn record_current(
        &mut self,
        scores: [u32; 2],
        elapsed: Option<f64>,
    ) -> Result<ParticipantId, TournamentError> {
        let t = self.active_mut()?;
        let (round, number) = (t.current_round, t.current_match);
        let winner = t
            .bracket
            .record(round, number, scores, elapsed)
            .inspect_err(|e| log::error!("Rejected result {}-{}: {}", scores[0], scores[1], e))?;
        let loser = t.bracket.get(round, number).and_then(BracketMatch::loser);

        if let Some(p) = t.participant_mut(winner) {
            p.wins += 1;
        }
        if let Some(p) = loser.and_then(|id| t.participant_mut(id)) {
            p.losses += 1;
        }
        if let Some(secs) = elapsed {
            t.play_time += secs;
        }
        t.status = TournamentStatus::InProgress;
        log::debug!(
            "r{}_m{} won by {} ({}-{})",
            round,
            number,
            winner,
            scores[0],
            scores[1]
        );

        t.advance_cursor();
        if t.bracket.champion().is_some() {
            self.finish();
        }
        Ok(winner)
    }

    fn active_mut(&mut self) -> Result<&mut Tournament, TournamentError> {
        match self.current.as_mut() {
            None => Err(TournamentError::NoActiveTournament),
            Some(t) if t.is_complete() => Err(TournamentError::AlreadyCompleted),
            Some(t) => Ok(t),
        }
    }

    fn finish(&mut self) {
        let Some(t) = self.current.as_mut() else {
            return;
        };
        let champion = t.bracket.champion();
        t.status = TournamentStatus::Completed;
        t.champion = champion;

        let Some(human) = t.human().cloned() else {
            log::info!("Tournament {} complete", t.id);
            return;
        };
        let placement = t.bracket.placement(human.id);
        let won = champion == Some(human.id);
        t.placement = Some(placement);

        self.profile
            .record_tournament(won, human.wins, human.losses, t.play_time);
        self.history.push(HistoryEntry {
            id: t.id.clone(),
            kind: t.kind,
            won,
            placement,
            duration: t.play_time,
        });
        log::info!(
            "Tournament {} complete: {} placed {}",
            t.id,
            human.name,
            placement
        );
    }

    /// Scores for an AI-only match under the current tournament's limit
    pub fn simulate_ai_match(&mut self, a: &Participant, b: &Participant) -> Option<[u32; 2]> {
        let limit = self.current.as_ref()?.config().score_limit;
        Some(simulate_scores(&mut self.rng, [a.tier(), b.tier()], limit))
    }

    /// Resolve every ready AI-only match of the current round, round after
    /// round, until a human match (or the end) is reached. Returns how many
    /// matches were simulated.
    pub fn auto_progress(&mut self) -> usize {
        let mut simulated = 0;
        while let Some((number, pair)) = self.next_ai_match() {
            let Some(scores) = self.simulate_ai_match(&pair[0], &pair[1]) else {
                break;
            };
            let Some(t) = self.current.as_mut() else {
                break;
            };
            // Point the cursor at the simulated match, then let it settle
            t.current_match = number;
            if let Err(e) = self.record_current(scores, None) {
                log::error!("Auto-progress stopped: {}", e);
                break;
            }
            simulated += 1;
        }
        if simulated > 0 {
            log::debug!("Auto-progressed {} AI matches", simulated);
        }
        simulated
    }

    /// First ready, undecided, AI-only match in the current round
    fn next_ai_match(&self) -> Option<(usize, [Participant; 2])> {
        let t = self.current.as_ref().filter(|t| !t.is_complete())?;
        let round = t.bracket.rounds().get((t.current_round as usize).checked_sub(1)?)?;
        round
            .iter()
            .filter(|m| m.status != MatchStatus::Completed && !t.involves_human(m))
            .find_map(|m| {
                let a = t.participant(m.slots[0]?)?.clone();
                let b = t.participant(m.slots[1]?)?.clone();
                Some((m.number, [a, b]))
            })
    }

    /// Human's final standing once the tournament is complete
    pub fn placement(&self) -> Option<u32> {
        self.current.as_ref()?.placement
    }

    pub fn bracket_view(&self) -> Option<BracketView> {
        let t = self.current.as_ref()?;
        Some(BracketView {
            id: t.id.clone(),
            kind: t.kind,
            name: t.config().name.to_string(),
            status: t.status,
            current_round: t.current_round,
            total_rounds: t.bracket.total_rounds(),
            rounds: t.bracket.rounds().to_vec(),
            participants: t.participants.clone(),
        })
    }

    pub fn stats(&self) -> TournamentStats {
        TournamentStats {
            current: self.current.as_ref().map(|t| CurrentSummary {
                kind: t.kind,
                round: t.current_round,
                total_rounds: t.bracket.total_rounds(),
                status: t.status,
                player_name: t.player_name.clone(),
            }),
            profile: self.profile.clone(),
            history: self.history.recent().to_vec(),
        }
    }

    /// Resume a saved tournament
    pub fn restore(&mut self, tournament: Tournament) {
        log::info!(
            "Restored tournament {} at round {}",
            tournament.id,
            tournament.current_round
        );
        self.current = Some(tournament);
    }

    /// Drop the current tournament without recording it
    pub fn abandon(&mut self) {
        if let Some(t) = self.current.take() {
            log::info!("Abandoned tournament {}", t.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiSelection, Difficulty, Personality};
    use crate::error::ConfigError;
    use proptest::prelude::*;

    fn ai(index: u32, difficulty: Difficulty) -> Participant {
        Participant::ai(
            index,
            &format!("Bot {}", index),
            AiSelection {
                difficulty,
                personality: Personality::Balanced,
            },
        )
    }

    /// Decide the human's current match in their favour (or not)
    fn play_human_match(mgr: &mut TournamentManager, human_wins: bool) -> ParticipantId {
        let m = mgr.current_match().expect("human match").clone();
        let human_first = m.slots[0] == Some(ParticipantId::Human);
        let (a, b) = if human_first == human_wins { (5, 2) } else { (2, 5) };
        mgr.start_current_match().unwrap();
        mgr.complete_played_match(a, b, 30.0).unwrap()
    }

    fn run_to_end(mgr: &mut TournamentManager, human_wins: bool) {
        for _ in 0..32 {
            mgr.auto_progress();
            if !mgr.is_active() {
                return;
            }
            play_human_match(mgr, human_wins);
        }
        panic!("tournament did not finish");
    }

    #[test]
    fn test_views_without_tournament() {
        let mut mgr = TournamentManager::new(1);
        assert!(mgr.bracket_view().is_none());
        assert!(mgr.current_match().is_none());
        assert!(mgr.stats().current.is_none());
        assert_eq!(mgr.complete_match(5, 3), Err(TournamentError::NoActiveTournament));
        assert_eq!(mgr.auto_progress(), 0);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let mut mgr = TournamentManager::new(1);
        let err = mgr.create_from_key("gauntlet", "Ada").unwrap_err();
        assert_eq!(
            err,
            TournamentError::Config(ConfigError::UnknownTournamentType("gauntlet".into()))
        );
        assert!(mgr.tournament().is_none());
    }

    #[test]
    fn test_wrong_field_size_is_rejected() {
        let mut mgr = TournamentManager::new(1);
        let field = vec![Participant::human("Ada"), ai(0, Difficulty::Easy), ai(1, Difficulty::Hard)];
        assert!(matches!(
            mgr.create_with_participants(TournamentKind::Quick, "Ada", field),
            Err(TournamentError::Config(ConfigError::ParticipantCount(3)))
        ));
    }

    #[test]
    fn test_generated_field() {
        let mut mgr = TournamentManager::new(7);
        let t = mgr.create_tournament(TournamentKind::Standard, "Ada").unwrap();
        assert_eq!(t.participants.len(), 8);
        assert_eq!(t.participants.iter().filter(|p| p.is_human()).count(), 1);
        assert_eq!(t.human().map(|h| h.name.as_str()), Some("Ada"));
        assert_eq!(t.status, TournamentStatus::Ready);
        assert!(t.id.starts_with("tournament_"));
    }

    #[test]
    fn test_auto_progress_stops_at_human_match() {
        let mut mgr = TournamentManager::new(3);
        mgr.create_tournament(TournamentKind::Standard, "Ada").unwrap();
        let simulated = mgr.auto_progress();
        assert_eq!(simulated, 3);

        let t = mgr.tournament().unwrap();
        let current = t.current_match().unwrap();
        assert!(t.involves_human(current));
        assert_eq!(current.status, MatchStatus::Pending);
        assert_eq!(t.current_round, 1);
    }

    #[test]
    fn test_tie_is_rejected_without_side_effects() {
        let mut mgr = TournamentManager::new(3);
        mgr.create_tournament(TournamentKind::Quick, "Ada").unwrap();
        mgr.auto_progress();
        let before = mgr.tournament().cloned();
        assert_eq!(mgr.complete_match(4, 4), Err(TournamentError::TieScore(4)));
        assert_eq!(mgr.tournament().cloned(), before);
    }

    #[test]
    fn test_start_marks_in_progress() {
        let mut mgr = TournamentManager::new(3);
        mgr.create_tournament(TournamentKind::Quick, "Ada").unwrap();
        mgr.auto_progress();
        let m = mgr.start_current_match().unwrap();
        assert_eq!(m.status, MatchStatus::InProgress);
        assert_eq!(mgr.tournament().unwrap().status, TournamentStatus::InProgress);
    }

    #[test]
    fn test_champion_run_updates_profile_and_history() {
        let mut mgr = TournamentManager::new(11);
        mgr.create_tournament(TournamentKind::Quick, "Ada").unwrap();
        run_to_end(&mut mgr, true);

        let t = mgr.tournament().unwrap();
        assert!(t.is_complete());
        assert_eq!(t.champion, Some(ParticipantId::Human));
        assert_eq!(mgr.placement(), Some(1));
        assert!((t.play_time - 60.0).abs() < 1e-9);

        let profile = mgr.profile();
        assert_eq!(profile.tournaments_played, 1);
        assert_eq!(profile.tournaments_won, 1);
        assert_eq!(profile.wins, 2);
        assert_eq!(profile.losses, 0);
        assert_eq!(profile.best_time, Some(60.0));
        assert_eq!(mgr.history().len(), 1);
        assert_eq!(mgr.stats().history[0].placement, 1);

        assert_eq!(mgr.complete_match(5, 1), Err(TournamentError::AlreadyCompleted));
        assert!(mgr.current_match().is_none());
    }

    #[test]
    fn test_first_round_exit_finishes_without_human() {
        let mut mgr = TournamentManager::new(5);
        mgr.create_tournament(TournamentKind::Championship, "Ada").unwrap();
        run_to_end(&mut mgr, false);

        let t = mgr.tournament().unwrap();
        assert!(t.is_complete());
        assert_eq!(t.bracket.completed().count(), 15);
        assert_eq!(mgr.placement(), Some(16));
        assert_eq!(mgr.profile().losses, 1);
        assert!(!mgr.history().entries[0].won);
    }

    #[test]
    fn test_simulated_scores_never_tie() {
        let mut rng = Pcg32::seed_from_u64(0);
        for _ in 0..500 {
            let [a, b] = simulate_scores(&mut rng, [1, 4], 7);
            assert_ne!(a, b);
            assert_eq!(a.max(b), 7);
        }
    }

    #[test]
    fn test_restore_resumes() {
        let mut mgr = TournamentManager::new(2);
        mgr.create_tournament(TournamentKind::Quick, "Ada").unwrap();
        mgr.auto_progress();
        let saved = mgr.tournament().cloned().unwrap();

        let mut other = TournamentManager::new(99);
        other.restore(saved.clone());
        assert_eq!(other.tournament(), Some(&saved));
        run_to_end(&mut other, true);
        assert_eq!(other.placement(), Some(1));
    }

    proptest! {
        #[test]
        fn prop_bracket_has_one_undefeated_champion(seed in any::<u64>(), kind_index in 0usize..3, human_wins in any::<bool>()) {
            let kind = TournamentKind::ALL[kind_index];
            let config = kind.config();
            let mut mgr = TournamentManager::new(seed);
            mgr.create_tournament(kind, "Ada").unwrap();
            run_to_end(&mut mgr, human_wins);

            let t = mgr.tournament().unwrap();
            prop_assert_eq!(t.bracket.completed().count(), config.participants - 1);
            let undefeated: Vec<&Participant> =
                t.participants.iter().filter(|p| p.losses == 0).collect();
            prop_assert_eq!(undefeated.len(), 1);
            prop_assert_eq!(Some(undefeated[0].id), t.champion);
            prop_assert_eq!(undefeated[0].wins, config.rounds);
            for p in t.participants.iter().filter(|p| p.losses > 0) {
                prop_assert_eq!(p.losses, 1);
            }
        }

        #[test]
        fn prop_placement_is_monotonic(seed in any::<u64>()) {
            let mut mgr = TournamentManager::new(seed);
            mgr.create_tournament(TournamentKind::Championship, "Ada").unwrap();
            run_to_end(&mut mgr, false);

            let t = mgr.tournament().unwrap();
            for a in &t.participants {
                for b in &t.participants {
                    let (ra, rb) = (t.bracket.round_lost(a.id), t.bracket.round_lost(b.id));
                    if let (Some(ra), Some(rb)) = (ra, rb) {
                        if ra < rb {
                            prop_assert!(t.bracket.placement(a.id) > t.bracket.placement(b.id));
                        }
                    }
                }
            }
        }
    }
}

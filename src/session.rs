//! Game session: the object graph that owns everything
//!
//! One `GameSession` is built at startup and driven by the host's frame
//! callback. It owns the settings, the running match, the tournament manager
//! and the collaborators; nothing lives in globals.

use serde::{Deserialize, Serialize};

use crate::ai::{AiSelection, AiStatus};
use crate::error::TournamentError;
use crate::persistence::{self, MemoryStore, Store, keys};
use crate::platform::{AudioMixer, AudioSink, InputSource, NoInput, NullRenderer, RenderSink};
use crate::settings::MatchSettings;
use crate::sim::{Controller, MatchController, MatchResult, Side};
use crate::tournament::{
    PlayerProfile, Tournament, TournamentHistory, TournamentKind, TournamentManager,
};

/// Lifetime record of standalone matches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchStats {
    pub games_played: u32,
    pub wins: u32,
    /// Seconds
    pub total_play_time: f64,
    pub high_score: u32,
}

impl MatchStats {
    pub fn record(&mut self, won: bool, score: u32, elapsed: f64) {
        self.games_played += 1;
        if won {
            self.wins += 1;
        }
        self.total_play_time += elapsed;
        self.high_score = self.high_score.max(score);
    }
}

/// Everything outside the simulation
pub struct Collaborators {
    pub input: Box<dyn InputSource>,
    pub renderer: Box<dyn RenderSink>,
    /// `None` runs silently
    pub audio: Option<Box<dyn AudioSink>>,
    pub store: Box<dyn Store>,
}

impl Collaborators {
    /// No input, no output, in-memory storage
    pub fn headless() -> Self {
        Self {
            input: Box::new(NoInput),
            renderer: Box::new(NullRenderer),
            audio: None,
            store: Box::new(MemoryStore::new()),
        }
    }
}

/// What a call to [`GameSession::frame`] did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameStatus {
    /// No match loaded
    Idle,
    Playing,
    /// The match ended on this frame; reported once
    Finished(MatchResult),
    /// Ended on an earlier frame, still on screen
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchMode {
    Standalone,
    /// Bracket slot the human occupies in the current tournament match
    Tournament { human_slot: usize },
}

struct ActiveMatch {
    controller: MatchController,
    mode: MatchMode,
    reported: bool,
}

/// Human always plays the left paddle
const HUMAN_SIDE: Side = Side::Left;

pub struct GameSession {
    settings: MatchSettings,
    seed: u64,
    matches_started: u64,
    active: Option<ActiveMatch>,
    tournament: TournamentManager,
    stats: MatchStats,
    input: Box<dyn InputSource>,
    renderer: Box<dyn RenderSink>,
    audio: AudioMixer,
    store: Box<dyn Store>,
}

impl GameSession {
    /// Build the session, restoring whatever the store holds
    pub fn new(mut settings: MatchSettings, collaborators: Collaborators, seed: u64) -> Self {
        let Collaborators {
            input,
            renderer,
            audio,
            store,
        } = collaborators;

        let store_ref = store.as_ref();
        if let Ok(Some(selection)) = persistence::load::<AiSelection>(store_ref, keys::AI_SELECTION) {
            settings.difficulty = selection.difficulty;
            settings.personality = selection.personality;
        }
        let profile: PlayerProfile = persistence::load_or_default(store_ref, keys::PLAYER_PROFILE);
        let history: TournamentHistory =
            persistence::load_or_default(store_ref, keys::TOURNAMENT_HISTORY);
        let stats: MatchStats = persistence::load_or_default(store_ref, keys::MATCH_STATS);

        let mut tournament = TournamentManager::with_records(profile, history, seed.wrapping_add(1));
        match persistence::load::<Tournament>(store_ref, keys::CURRENT_TOURNAMENT) {
            Ok(Some(saved)) if !saved.is_complete() => tournament.restore(saved),
            Ok(_) => {}
            Err(e) => log::warn!("Ignoring saved tournament: {}", e),
        }

        log::info!(
            "Session ready (AI {} / {})",
            settings.difficulty.as_str(),
            settings.personality.as_str()
        );

        Self {
            settings,
            seed,
            matches_started: 0,
            active: None,
            tournament,
            stats,
            input,
            renderer,
            audio: AudioMixer::new(audio),
            store,
        }
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut MatchSettings {
        &mut self.settings
    }

    pub fn audio_mut(&mut self) -> &mut AudioMixer {
        &mut self.audio
    }

    pub fn tournament(&self) -> &TournamentManager {
        &self.tournament
    }

    pub fn stats(&self) -> &MatchStats {
        &self.stats
    }

    pub fn match_controller(&self) -> Option<&MatchController> {
        self.active.as_ref().map(|a| &a.controller)
    }

    /// Debug view of the computer opponent in the running match
    pub fn ai_status(&self) -> Option<AiStatus> {
        self.match_controller()
            .map(|c| c.opponent(HUMAN_SIDE.opponent()).status())
    }

    /// Change the opponent for future standalone matches and remember it
    pub fn set_ai_selection(&mut self, selection: AiSelection) {
        self.settings.difficulty = selection.difficulty;
        self.settings.personality = selection.personality;
        persist(self.store.as_mut(), keys::AI_SELECTION, &selection);
    }

    /// Human (left) against the configured AI (right)
    pub fn start_standalone(&mut self) {
        let settings = self.settings.clone();
        self.launch(settings, MatchMode::Standalone);
    }

    /// Create a tournament and play out its opening AI-only matches
    pub fn start_tournament(
        &mut self,
        kind: TournamentKind,
        player_name: &str,
    ) -> Result<(), TournamentError> {
        self.drop_match();
        self.tournament.create_tournament(kind, player_name)?;
        self.tournament.auto_progress();
        self.save_tournament();
        Ok(())
    }

    /// Load the human's current bracket match into a live match
    pub fn start_next_tournament_match(&mut self) -> Result<(), TournamentError> {
        self.tournament.auto_progress();

        let t = self
            .tournament
            .tournament()
            .ok_or(TournamentError::NoActiveTournament)?;
        if t.is_complete() {
            return Err(TournamentError::AlreadyCompleted);
        }
        let m = t.current_match().ok_or(TournamentError::NoActiveTournament)?;
        let not_ready = || TournamentError::MatchNotReady(m.id.clone());

        let human_slot = m
            .slots
            .iter()
            .position(|slot| slot.and_then(|id| t.participant(id)).is_some_and(|p| p.is_human()))
            .ok_or_else(not_ready)?;
        let opponent = m.slots[1 - human_slot]
            .and_then(|id| t.participant(id))
            .ok_or_else(not_ready)?;
        let selection = opponent.selection().ok_or_else(not_ready)?;
        log::info!("Next up: {} vs {}", t.player_name, opponent.name);

        let settings = self.settings.for_opponent(
            t.config().score_limit,
            selection.difficulty,
            selection.personality,
        );

        self.tournament.start_current_match()?;
        self.save_tournament();
        self.launch(settings, MatchMode::Tournament { human_slot });
        Ok(())
    }

    fn launch(&mut self, settings: MatchSettings, mode: MatchMode) {
        self.drop_match();
        self.matches_started += 1;
        let seed = self.seed ^ self.matches_started.wrapping_mul(0x9E37_79B9_7F4A_7C15);

        let mut controller =
            MatchController::with_controllers(settings, [Controller::Human, Controller::Ai], seed);
        let events = controller.start();
        for cue in events.iter().filter_map(|e| e.sound()) {
            self.audio.play(cue);
        }
        self.renderer.present(&controller.snapshot(), &events);

        self.active = Some(ActiveMatch {
            controller,
            mode,
            reported: false,
        });
    }

    /// Advance one frame: input, simulation, audio, render, and the result
    /// once the match ends
    pub fn frame(&mut self, dt: f32) -> FrameStatus {
        let Some(active) = self.active.as_mut() else {
            return FrameStatus::Idle;
        };
        if active.reported {
            self.renderer.present(&active.controller.snapshot(), &[]);
            return FrameStatus::Over;
        }

        let input = self.input.poll();
        let events = active.controller.tick(&input, dt);
        for cue in events.iter().filter_map(|e| e.sound()) {
            self.audio.play(cue);
        }
        self.renderer.present(&active.controller.snapshot(), &events);

        let Some(result) = active.controller.result() else {
            return FrameStatus::Playing;
        };
        active.reported = true;
        let mode = active.mode;
        self.report(result, mode);
        FrameStatus::Finished(result)
    }

    fn report(&mut self, result: MatchResult, mode: MatchMode) {
        let human = result.scores.get(HUMAN_SIDE);
        let opponent = result.scores.get(HUMAN_SIDE.opponent());

        match mode {
            MatchMode::Standalone => {
                self.stats
                    .record(result.winner == HUMAN_SIDE, human, result.elapsed);
                persist(self.store.as_mut(), keys::MATCH_STATS, &self.stats);
            }
            MatchMode::Tournament { human_slot } => {
                let (a, b) = if human_slot == 0 {
                    (human, opponent)
                } else {
                    (opponent, human)
                };
                match self.tournament.complete_played_match(a, b, result.elapsed) {
                    Ok(_) => {
                        self.tournament.auto_progress();
                    }
                    Err(e) => log::error!("Could not record tournament match: {}", e),
                }
                self.save_tournament();
                persist(
                    self.store.as_mut(),
                    keys::PLAYER_PROFILE,
                    self.tournament.profile(),
                );
                persist(
                    self.store.as_mut(),
                    keys::TOURNAMENT_HISTORY,
                    self.tournament.history(),
                );
            }
        }
    }

    /// Leave the match. Pending serves and effect reverts are cancelled.
    pub fn return_to_menu(&mut self) {
        self.drop_match();
    }

    fn drop_match(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.controller.abandon();
        }
    }

    fn save_tournament(&mut self) {
        match self.tournament.tournament() {
            Some(t) if !t.is_complete() => persist(self.store.as_mut(), keys::CURRENT_TOURNAMENT, t),
            _ => {
                if let Err(e) = self.store.remove(keys::CURRENT_TOURNAMENT) {
                    log::warn!("Failed to clear saved tournament: {}", e);
                }
            }
        }
    }
}

/// Save, logging instead of failing
fn persist<T: Serialize>(store: &mut dyn Store, key: &str, value: &T) {
    if let Err(e) = persistence::save(store, key, value) {
        log::warn!("Failed to save '{}': {}", key, e);
    }
}

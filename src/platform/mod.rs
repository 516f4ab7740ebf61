//! Platform abstraction layer
//!
//! The simulation talks to the outside world only through these traits:
//! - Input: per-tick paddle state for human paddles
//! - Render: the read-only snapshot plus this tick's events (visual hints)
//! - Audio: fire-and-forget named cues
//!
//! Null and recording implementations cover headless runs and tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::sim::{GameEvent, GameSnapshot, PaddleInput, Side, SoundCue, TickInput};

/// Supplies input once per tick
pub trait InputSource {
    fn poll(&mut self) -> TickInput;
}

/// Receives one frame per tick; never feeds anything back
pub trait RenderSink {
    fn present(&mut self, snapshot: &GameSnapshot, events: &[GameEvent]);
}

/// Plays named cues without blocking the caller
pub trait AudioSink {
    /// `volume` is 0-1 after master/effects scaling
    fn play(&mut self, cue: SoundCue, volume: f32);
}

/// No keys pressed, ever
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll(&mut self) -> TickInput {
        TickInput::default()
    }
}

/// Hands the given paddles to the AI (attract mode, headless runs)
#[derive(Debug, Clone, Copy)]
pub struct AutopilotInput {
    pub sides: [bool; 2],
}

impl AutopilotInput {
    pub fn for_side(side: Side) -> Self {
        let mut sides = [false; 2];
        sides[side.index()] = true;
        Self { sides }
    }
}

impl InputSource for AutopilotInput {
    fn poll(&mut self) -> TickInput {
        TickInput {
            autopilot: self.sides,
            ..Default::default()
        }
    }
}

/// Replays queued inputs, then idles
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    queue: VecDeque<TickInput>,
}

impl ScriptedInput {
    pub fn new(inputs: impl IntoIterator<Item = TickInput>) -> Self {
        Self {
            queue: inputs.into_iter().collect(),
        }
    }

    /// Hold one paddle direction for `ticks` ticks
    pub fn hold(side: Side, input: PaddleInput, ticks: usize) -> Self {
        Self::new(std::iter::repeat_n(TickInput::for_side(side, input), ticks))
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> TickInput {
        self.queue.pop_front().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl RenderSink for NullRenderer {
    fn present(&mut self, _snapshot: &GameSnapshot, _events: &[GameEvent]) {}
}

/// What a [`RecordingRenderer`] saw
#[derive(Debug, Clone, Default)]
pub struct FrameLog {
    pub frames: usize,
    pub last: Option<GameSnapshot>,
    pub events: Vec<GameEvent>,
}

/// Keeps the frame count, last snapshot and every event, shared with the test
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    log: Rc<RefCell<FrameLog>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Rc<RefCell<FrameLog>> {
        Rc::clone(&self.log)
    }
}

impl RenderSink for RecordingRenderer {
    fn present(&mut self, snapshot: &GameSnapshot, events: &[GameEvent]) {
        let mut log = self.log.borrow_mut();
        log.frames += 1;
        log.last = Some(snapshot.clone());
        log.events.extend_from_slice(events);
    }
}

/// Collects cues for inspection
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    cues: Rc<RefCell<Vec<SoundCue>>>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> Rc<RefCell<Vec<SoundCue>>> {
        Rc::clone(&self.cues)
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: SoundCue, _volume: f32) {
        self.cues.borrow_mut().push(cue);
    }
}

/// Volume and mute in front of an optional backend.
///
/// A missing backend is not an error: cues are dropped and the game goes on.
pub struct AudioMixer {
    backend: Option<Box<dyn AudioSink>>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioMixer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AudioMixer {
    pub fn new(backend: Option<Box<dyn AudioSink>>) -> Self {
        if backend.is_none() {
            log::warn!("No audio backend - audio disabled");
        }
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set effects volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn play(&mut self, cue: SoundCue) {
        let volume = self.effective_volume();
        if volume <= 0.0 {
            return;
        }
        if let Some(backend) = self.backend.as_mut() {
            backend.play(cue, volume);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_input_drains_then_idles() {
        let up = PaddleInput {
            up: true,
            down: false,
        };
        let mut input = ScriptedInput::hold(Side::Left, up, 2);
        assert_eq!(input.poll().paddles[0], up);
        assert_eq!(input.poll().paddles[0], up);
        assert_eq!(input.remaining(), 0);
        assert_eq!(input.poll().paddles[0], PaddleInput::default());
    }

    #[test]
    fn test_autopilot_marks_side() {
        let mut input = AutopilotInput::for_side(Side::Right);
        assert_eq!(input.poll().autopilot, [false, true]);
    }

    #[test]
    fn test_mixer_mutes_and_forwards() {
        let audio = RecordingAudio::new();
        let cues = audio.cues();
        let mut mixer = AudioMixer::new(Some(Box::new(audio)));

        mixer.play(SoundCue::PaddleHit);
        mixer.set_muted(true);
        mixer.play(SoundCue::WallHit);
        mixer.set_muted(false);
        mixer.set_master_volume(0.0);
        mixer.play(SoundCue::Score);
        mixer.set_master_volume(1.0);
        mixer.play(SoundCue::GameOver);

        assert_eq!(*cues.borrow(), vec![SoundCue::PaddleHit, SoundCue::GameOver]);
    }

    #[test]
    fn test_mixer_without_backend_is_inert() {
        let mut mixer = AudioMixer::default();
        assert!(!mixer.is_enabled());
        mixer.play(SoundCue::GameStart);
    }
}

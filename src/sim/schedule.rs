//! Deferred effects on the match clock
//!
//! Powerup reverts and the post-point serve are queued here instead of
//! captured in callbacks. Every entry carries the generation it was queued
//! in; `cancel_all` bumps the generation so anything queued earlier is
//! discarded instead of firing against a reset or abandoned match.

use serde::{Deserialize, Serialize};

use super::physics::EffectSlot;

/// Work to perform when an entry comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deferred {
    /// Restore the value captured when the effect in `slot` was applied
    RevertEffect { slot: EffectSlot, token: u64 },
    /// Put the ball back in play after a point
    Serve,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Entry {
    due: f64,
    generation: u64,
    action: Deferred,
}

/// Queue of deferred actions keyed by match time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    generation: u64,
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Queue `action` to run `delay` seconds after `now`
    pub fn schedule(&mut self, now: f64, delay: f32, action: Deferred) {
        self.entries.push(Entry {
            due: now + f64::from(delay),
            generation: self.generation,
            action,
        });
    }

    /// Invalidate everything queued so far
    pub fn cancel_all(&mut self) {
        self.generation += 1;
    }

    /// Remove and return the live actions due at `now`, earliest first
    pub fn take_due(&mut self, now: f64) -> Vec<Deferred> {
        let generation = self.generation;
        self.entries.retain(|e| e.generation == generation);

        let mut due: Vec<Entry> = Vec::new();
        self.entries.retain(|e| {
            if e.due <= now {
                due.push(e.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due.total_cmp(&b.due));
        due.into_iter().map(|e| e.action).collect()
    }

    /// Live entries still waiting
    pub fn pending(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.generation == self.generation)
            .count()
    }

    /// Whether a live entry with this action is waiting
    pub fn is_pending(&self, action: Deferred) -> bool {
        self.entries
            .iter()
            .any(|e| e.generation == self.generation && e.action == action)
    }
}

//! Press-and-hold completion gate.
//!
//! Like the timer engine it is modelled on, the gate has no thread of its
//! own: the caller passes the current time (milliseconds on any monotonic
//! clock) to every input and calls `tick()` each frame.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Holding -> Committed -> Idle   (held for the full duration)
//! Idle -> Holding -> Idle                (released early)
//! ```

use serde::{Deserialize, Serialize};

/// One-shot deadline that can be cancelled at any time.
///
/// Cancelling a timer that already fired, or was already cancelled, does
/// nothing. `poll` reports the firing exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionTimer {
    deadline_ms: Option<u64>,
}

impl CompletionTimer {
    pub fn arm(&mut self, now_ms: u64, duration_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(duration_ms));
    }

    /// Returns true if a pending deadline was dropped.
    pub fn cancel(&mut self) -> bool {
        self.deadline_ms.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// True exactly once, on the first poll at or after the deadline.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum HoldState {
    Idle,
    Holding { since_ms: u64 },
    /// Deadline reached while still pressed; waiting for the release.
    Committed { since_ms: u64 },
}

/// Transitions reported by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HoldEvent {
    Started,
    Canceled { held_ms: u64 },
    /// The habit behind the card must be toggled.
    Committed { held_ms: u64 },
    /// Finger lifted after a commit.
    Released,
}

/// Gate for a single card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldGate {
    state: HoldState,
    timer: CompletionTimer,
    complete_ms: u64,
    /// Return to `Idle` at commit instead of waiting for the release.
    relax_on_commit: bool,
}

impl HoldGate {
    pub fn new(complete_ms: u64) -> Self {
        Self {
            state: HoldState::Idle,
            timer: CompletionTimer::default(),
            complete_ms,
            relax_on_commit: false,
        }
    }

    pub fn relax_on_commit(mut self, relax: bool) -> Self {
        self.relax_on_commit = relax;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> HoldState {
        self.state
    }

    pub fn complete_ms(&self) -> u64 {
        self.complete_ms
    }

    /// Whether the card should show pressed visuals.
    pub fn is_pressed(&self) -> bool {
        !matches!(self.state, HoldState::Idle)
    }

    /// 0.0 .. 1.0 share of the hold duration elapsed.
    pub fn progress(&self, now_ms: u64) -> f32 {
        match self.state {
            HoldState::Idle => 0.0,
            HoldState::Committed { .. } => 1.0,
            HoldState::Holding { since_ms } => {
                if self.complete_ms == 0 {
                    return 1.0;
                }
                let held = now_ms.saturating_sub(since_ms);
                (held as f32 / self.complete_ms as f32).min(1.0)
            }
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a hold. Ignored unless the card is the centered one and idle.
    pub fn press_start(&mut self, now_ms: u64, is_current: bool) -> Option<HoldEvent> {
        if !is_current || self.state != HoldState::Idle {
            return None;
        }
        self.state = HoldState::Holding { since_ms: now_ms };
        self.timer.arm(now_ms, self.complete_ms);
        Some(HoldEvent::Started)
    }

    /// Finger lifted.
    ///
    /// A deadline that has already passed wins over the release: the commit
    /// is reported and the gate goes back to idle in the same call.
    pub fn press_end(&mut self, now_ms: u64) -> Option<HoldEvent> {
        if let Some(committed) = self.tick(now_ms) {
            self.state = HoldState::Idle;
            return Some(committed);
        }

        match self.state {
            HoldState::Holding { since_ms } => {
                self.timer.cancel();
                self.state = HoldState::Idle;
                Some(HoldEvent::Canceled {
                    held_ms: now_ms.saturating_sub(since_ms),
                })
            }
            HoldState::Committed { .. } => {
                self.state = HoldState::Idle;
                Some(HoldEvent::Released)
            }
            HoldState::Idle => None,
        }
    }

    /// Call every frame. Returns `Committed` once when the deadline passes.
    pub fn tick(&mut self, now_ms: u64) -> Option<HoldEvent> {
        let HoldState::Holding { since_ms } = self.state else {
            return None;
        };
        if !self.timer.poll(now_ms) {
            return None;
        }
        self.state = if self.relax_on_commit {
            HoldState::Idle
        } else {
            HoldState::Committed { since_ms }
        };
        Some(HoldEvent::Committed {
            held_ms: now_ms.saturating_sub(since_ms),
        })
    }

    /// Drop any hold without reporting it (card scrolled away, list rebuilt).
    pub fn reset(&mut self) {
        self.timer.cancel();
        self.state = HoldState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: u64 = 3000;

    #[test]
    fn timer_fires_once_and_cancel_is_idempotent() {
        let mut timer = CompletionTimer::default();
        assert!(!timer.cancel());
        timer.arm(100, 50);
        assert!(!timer.poll(149));
        assert!(timer.poll(150));
        assert!(!timer.poll(151));
        assert!(!timer.cancel());

        timer.arm(0, 10);
        assert!(timer.cancel());
        assert!(!timer.cancel());
        assert!(!timer.poll(1000));
    }

    #[test]
    fn early_release_cancels() {
        let mut gate = HoldGate::new(T);
        assert_eq!(gate.press_start(0, true), Some(HoldEvent::Started));
        assert_eq!(gate.tick(2999), None);
        assert_eq!(
            gate.press_end(2999),
            Some(HoldEvent::Canceled { held_ms: 2999 })
        );
        assert_eq!(gate.state(), HoldState::Idle);
        assert_eq!(gate.tick(10_000), None);
    }

    #[test]
    fn full_hold_commits_once() {
        let mut gate = HoldGate::new(T);
        gate.press_start(1000, true);
        assert_eq!(
            gate.tick(4000),
            Some(HoldEvent::Committed { held_ms: 3000 })
        );
        assert_eq!(gate.tick(4100), None);
        assert!(gate.is_pressed());
        assert_eq!(gate.press_end(5000), Some(HoldEvent::Released));
        assert!(!gate.is_pressed());
    }

    #[test]
    fn release_on_deadline_frame_commits() {
        let mut gate = HoldGate::new(T);
        gate.press_start(0, true);
        // no tick ran at 3000; the release arrives first
        assert_eq!(
            gate.press_end(3000),
            Some(HoldEvent::Committed { held_ms: 3000 })
        );
        assert_eq!(gate.state(), HoldState::Idle);
        assert_eq!(gate.press_end(3001), None);
        assert_eq!(gate.tick(9000), None);
    }

    #[test]
    fn only_current_card_can_hold() {
        let mut gate = HoldGate::new(T);
        assert_eq!(gate.press_start(0, false), None);
        assert_eq!(gate.tick(T), None);
        assert_eq!(gate.press_end(T), None);
    }

    #[test]
    fn second_press_while_held_is_ignored() {
        let mut gate = HoldGate::new(T);
        gate.press_start(0, true);
        assert_eq!(gate.press_start(10, true), None);
        gate.tick(T);
        assert_eq!(gate.press_start(T + 10, true), None);
    }

    #[test]
    fn relax_on_commit_returns_to_idle() {
        let mut gate = HoldGate::new(T).relax_on_commit(true);
        gate.press_start(0, true);
        assert!(matches!(gate.tick(T), Some(HoldEvent::Committed { .. })));
        assert_eq!(gate.state(), HoldState::Idle);
        assert_eq!(gate.press_end(T + 100), None);
    }

    #[test]
    fn progress_tracks_elapsed_share() {
        let mut gate = HoldGate::new(T);
        assert_eq!(gate.progress(0), 0.0);
        gate.press_start(0, true);
        assert_eq!(gate.progress(1500), 0.5);
        gate.tick(T);
        assert_eq!(gate.progress(T + 1), 1.0);
    }
}

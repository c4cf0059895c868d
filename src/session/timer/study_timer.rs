//! Study timer state machine.
//!
//! Two states, idle and running, around a single second counter. In
//! pomodoro mode the counter measures progress through the current phase
//! and rolls over to zero when the phase length is reached.

use serde::{Deserialize, Serialize};

use crate::session::core::config::{TimerConfig, TimerMode};

/// Narrative appended when the timer starts.
pub const TIMER_STARTED_TEXT: &str =
    "Study timer started! Remember to take short breaks to stay fresh and focused.";

/// Pomodoro phase.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    /// Working block.
    #[default]
    Focus,
    /// Rest block.
    Break,
}

/// Observable timer state.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TimerState {
    /// Seconds counted while running.
    pub elapsed_seconds: u64,
    /// Whether the counter is advancing.
    pub running: bool,
    /// Current phase (always `Focus` in stopwatch mode).
    pub phase: TimerPhase,
}

/// Result of the start/pause toggle.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerTransition {
    /// Idle to running.
    Started,
    /// Running to idle, counter kept.
    Paused,
}

/// A countdown reached zero and the timer moved to the next phase.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PhaseChange {
    /// Phase that just finished.
    pub completed: TimerPhase,
    /// Phase that starts now.
    pub next: TimerPhase,
    /// Length of the phase that starts now.
    pub next_length_seconds: u64,
}

impl PhaseChange {
    /// Narrative announcing the change.
    #[must_use]
    pub fn narrative(&self) -> String {
        match self.completed {
            TimerPhase::Focus => format!(
                "Focus block complete! Take a break for {}.",
                format_duration(self.next_length_seconds)
            ),
            TimerPhase::Break => format!(
                "Break is over. Next focus block: {}.",
                format_duration(self.next_length_seconds)
            ),
        }
    }
}

/// Narrative appended on reset.
#[must_use]
pub fn session_ended_text(elapsed_seconds: u64) -> String {
    format!(
        "Study session ended. Total duration: {}. Great work!",
        format_duration(elapsed_seconds)
    )
}

/// Format seconds as `HH:MM:SS`. Hours are not capped at 24.
#[must_use]
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Elapsed-time counter with start/pause/reset.
#[derive(Clone, Debug)]
pub struct StudyTimer {
    mode: TimerMode,
    focus_seconds: u64,
    break_seconds: u64,
    /// Running seconds since the last reset, across phase changes.
    total_seconds: u64,
    state: TimerState,
}

impl StudyTimer {
    /// Create an idle timer.
    #[must_use]
    pub fn new(config: &TimerConfig) -> Self {
        Self {
            mode: config.mode,
            focus_seconds: config.focus_seconds.max(1),
            break_seconds: config.break_seconds.max(1),
            total_seconds: 0,
            state: TimerState::default(),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> TimerState {
        self.state
    }

    /// Whether the counter is advancing.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.state.running
    }

    /// Seconds left in the current countdown (pomodoro only).
    #[must_use]
    pub const fn remaining_seconds(&self) -> Option<u64> {
        match self.mode {
            TimerMode::Stopwatch => None,
            TimerMode::Pomodoro => Some(
                self.phase_length(self.state.phase)
                    .saturating_sub(self.state.elapsed_seconds),
            ),
        }
    }

    /// Flip between idle and running. The counter is never reset here.
    pub const fn toggle(&mut self) -> TimerTransition {
        if self.state.running {
            self.state.running = false;
            TimerTransition::Paused
        } else {
            self.state.running = true;
            TimerTransition::Started
        }
    }

    /// Advance by one second if running.
    pub const fn tick(&mut self) -> Option<PhaseChange> {
        if !self.state.running {
            return None;
        }
        self.state.elapsed_seconds = self.state.elapsed_seconds.saturating_add(1);
        self.total_seconds = self.total_seconds.saturating_add(1);

        if matches!(self.mode, TimerMode::Stopwatch) {
            return None;
        }

        let completed = self.state.phase;
        if self.state.elapsed_seconds < self.phase_length(completed) {
            return None;
        }

        let next = match completed {
            TimerPhase::Focus => TimerPhase::Break,
            TimerPhase::Break => TimerPhase::Focus,
        };
        self.state.elapsed_seconds = 0;
        self.state.phase = next;
        Some(PhaseChange {
            completed,
            next,
            next_length_seconds: self.phase_length(next),
        })
    }

    /// Stop, zero the counter and return to the focus phase.
    ///
    /// Returns the running seconds counted since the last reset. In pomodoro
    /// mode this spans every completed phase, not just the current one.
    pub const fn reset(&mut self) -> u64 {
        let total = self.total_seconds;
        self.total_seconds = 0;
        self.state = TimerState {
            elapsed_seconds: 0,
            running: false,
            phase: TimerPhase::Focus,
        };
        total
    }

    const fn phase_length(&self, phase: TimerPhase) -> u64 {
        match phase {
            TimerPhase::Focus => self.focus_seconds,
            TimerPhase::Break => self.break_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pomodoro(focus: u64, brk: u64) -> StudyTimer {
        StudyTimer::new(&TimerConfig {
            mode: TimerMode::Pomodoro,
            focus_seconds: focus,
            break_seconds: brk,
        })
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(59), "00:00:59");
        assert_eq!(format_duration(3_725), "01:02:05");
        assert_eq!(format_duration(90_000), "25:00:00");
    }

    #[test]
    fn test_idle_timer_does_not_count() {
        let mut timer = StudyTimer::new(&TimerConfig::default());
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.state().elapsed_seconds, 0);
    }

    #[test]
    fn test_pause_keeps_counter() {
        let mut timer = StudyTimer::new(&TimerConfig::default());
        assert_eq!(timer.toggle(), TimerTransition::Started);
        timer.tick();
        timer.tick();
        assert_eq!(timer.toggle(), TimerTransition::Paused);
        timer.tick();
        assert_eq!(timer.state().elapsed_seconds, 2);
        assert!(!timer.is_running());
        assert_eq!(timer.remaining_seconds(), None);
    }

    #[test]
    fn test_reset_returns_previous_value() {
        let mut timer = StudyTimer::new(&TimerConfig::default());
        timer.toggle();
        for _ in 0..75 {
            timer.tick();
        }
        assert_eq!(timer.reset(), 75);
        assert_eq!(timer.state(), TimerState::default());
        assert_eq!(session_ended_text(75), "Study session ended. Total duration: 00:01:15. Great work!");
    }

    #[test]
    fn test_pomodoro_rolls_over_and_keeps_running() {
        let mut timer = pomodoro(3, 2);
        timer.toggle();
        assert_eq!(timer.remaining_seconds(), Some(3));
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.tick(), None);

        let change = timer.tick().unwrap();
        assert_eq!(change.completed, TimerPhase::Focus);
        assert_eq!(change.next, TimerPhase::Break);
        assert_eq!(change.next_length_seconds, 2);
        assert_eq!(timer.state().elapsed_seconds, 0);
        assert_eq!(timer.state().phase, TimerPhase::Break);
        assert!(timer.is_running());

        timer.tick();
        let back = timer.tick().unwrap();
        assert_eq!(back.next, TimerPhase::Focus);
        assert_eq!(timer.remaining_seconds(), Some(3));
    }

    #[test]
    fn test_reset_returns_to_focus() {
        let mut timer = pomodoro(1, 5);
        timer.toggle();
        timer.tick();
        assert_eq!(timer.state().phase, TimerPhase::Break);
        timer.reset();
        assert_eq!(timer.state().phase, TimerPhase::Focus);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_pomodoro_reset_reports_time_across_phases() {
        let mut timer = pomodoro(4, 3);
        timer.toggle();
        for _ in 0..6 {
            timer.tick();
        }
        assert_eq!(timer.state().phase, TimerPhase::Break);
        assert_eq!(timer.state().elapsed_seconds, 2);

        assert_eq!(timer.reset(), 6);
        timer.toggle();
        timer.tick();
        assert_eq!(timer.reset(), 1);
    }

    #[test]
    fn test_phase_narratives() {
        let change = PhaseChange {
            completed: TimerPhase::Focus,
            next: TimerPhase::Break,
            next_length_seconds: 300,
        };
        assert!(change.narrative().contains("00:05:00"));
    }
}

//! Study timer: state machine plus tick scheduling.

pub mod study_timer;
pub mod ticker;

pub use study_timer::{
    PhaseChange, StudyTimer, TIMER_STARTED_TEXT, TimerPhase, TimerState, TimerTransition,
    format_duration, session_ended_text,
};
pub use ticker::{TickControl, Ticker};

use thiserror::Error;

use crate::timer::ScheduledTimer;
use crate::tracker::SessionState;

/// Event that does not apply to the current session state. These are
/// rejected without touching any state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("no modal is open (state: {0})")]
    NoModalOpen(SessionState),
    #[error("restart is only available while celebrating (state: {0})")]
    NotCelebrating(SessionState),
    #[error("clicks are ignored once every target is found (state: {0})")]
    DiscoveryClosed(SessionState),
    #[error("timer {0:?} is no longer live")]
    StaleTimer(ScheduledTimer),
}

/// Failure while reading an event script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("line {line}: unknown command {command:?}")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: {command} expects {expected}")]
    MissingArgument {
        line: usize,
        command: &'static str,
        expected: &'static str,
    },
    #[error("line {line}: invalid duration {value:?}")]
    InvalidDuration { line: usize, value: String },
}

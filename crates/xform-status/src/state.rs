//! Lifecycle states and the reduction rule
//!
//! `reduce` is commutative and associative with [`State::InProgress`] as the
//! absorbing element, so folding child states never depends on their order.

use crate::wire::WireName;
use std::fmt;

/// Lifecycle state of a sub-task or of a whole transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Still running
    InProgress,
    /// Finished with content
    Successful,
    /// Finished with a failure reason
    Failed,
    /// Name not recognized by this code
    Unknown,
}

impl State {
    /// All states
    pub const ALL: [State; 4] = [
        State::InProgress,
        State::Successful,
        State::Failed,
        State::Unknown,
    ];

    /// Combine two states into one
    ///
    /// 1. any `InProgress` gives `InProgress`
    /// 2. else any `Unknown` gives `Unknown`
    /// 3. else two `Successful` give `Successful`
    /// 4. else `Failed`
    #[must_use]
    pub const fn reduce(self, other: State) -> State {
        match (self, other) {
            (State::InProgress, _) | (_, State::InProgress) => State::InProgress,
            (State::Unknown, _) | (_, State::Unknown) => State::Unknown,
            (State::Successful, State::Successful) => State::Successful,
            _ => State::Failed,
        }
    }

    /// Fold any number of states; empty input is `InProgress`
    pub fn fold<I>(states: I) -> State
    where
        I: IntoIterator<Item = State>,
    {
        states
            .into_iter()
            .reduce(State::reduce)
            .unwrap_or(State::InProgress)
    }

    /// `Successful` or `Failed`
    #[inline]
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, State::Successful | State::Failed)
    }

    /// `Failed`
    #[inline]
    #[must_use]
    pub const fn has_failed(self) -> bool {
        matches!(self, State::Failed)
    }

    /// `Successful`
    #[inline]
    #[must_use]
    pub const fn was_successful(self) -> bool {
        matches!(self, State::Successful)
    }
}

impl WireName for State {
    const UNKNOWN: Self = State::Unknown;
    const VARIANTS: &'static [Self] = &State::ALL;

    fn name(self) -> &'static str {
        match self {
            State::InProgress => "IN_PROGRESS",
            State::Successful => "SUCCESSFUL",
            State::Failed => "FAILED",
            State::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

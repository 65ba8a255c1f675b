use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arena::Snapshot;

/// A primitive command sent back to the game server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Forward,
    TurnLeft,
    TurnRight,
    Fire,
}

impl Action {
    /// Single-character response code.
    pub fn code(self) -> &'static str {
        match self {
            Action::Forward => "F",
            Action::TurnLeft => "L",
            Action::TurnRight => "R",
            Action::Fire => "T",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of evaluating one behavioral state against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<S> {
    /// Terminal. The evaluated state stays current for the next tick.
    Act(Action),
    /// Terminal. The given state becomes current for the next tick.
    ActThen(Action, S),
    /// Not terminal. Evaluate the given state next, within the same tick.
    Transition(S),
}

/// A node of the decision state machine.
///
/// Implementations must be pure: the same state and snapshot always produce
/// the same decision.
pub trait Behavior: Sized {
    fn decide(&self, snapshot: &Snapshot) -> Decision<Self>;
}

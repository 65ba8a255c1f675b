use crate::arena::Snapshot;
use crate::decision::{Action, Behavior, Decision};

/// Default bound on `decide` evaluations within one tick.
pub const DEFAULT_MAX_TRANSITIONS: usize = 100;

/// Result of resolving one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome<S> {
    pub action: Action,
    /// State to commit as current for the next tick.
    pub state: S,
    /// Number of transitions followed before the action was produced.
    pub transitions: usize,
    /// True when the evaluation budget ran out and `action` is the fallback.
    pub capped: bool,
}

/// Follow transitions from `start` until a state produces an action.
///
/// At most `max_transitions` states are evaluated. When every one of them
/// transitions, the tick falls back to `Fire` and keeps the last state
/// reached.
pub fn run_tick<S: Behavior>(
    start: S,
    snapshot: &Snapshot,
    max_transitions: usize,
) -> TickOutcome<S> {
    let mut state = start;
    let mut transitions = 0;

    while transitions < max_transitions {
        match state.decide(snapshot) {
            Decision::Act(action) => {
                return TickOutcome {
                    action,
                    state,
                    transitions,
                    capped: false,
                };
            },
            Decision::ActThen(action, next) => {
                return TickOutcome {
                    action,
                    state: next,
                    transitions,
                    capped: false,
                };
            },
            Decision::Transition(next) => {
                state = next;
                transitions += 1;
            },
        }
    }

    tracing::warn!(
        max_transitions,
        "No action after {max_transitions} transitions, falling back to fire; the state graph may contain a cycle"
    );
    TickOutcome {
        action: Action::Fire,
        state,
        transitions,
        capped: true,
    }
}

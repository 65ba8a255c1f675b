use crate::arena::{Snapshot, can_reach_straight_line};
use crate::config::EngineConfig;
use crate::decision::Action;
use crate::driver::run_tick;
use crate::overlay::ReactiveOverlay;
use crate::state::BotState;

/// What one call to [`Agent::tick`] decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub action: Action,
    /// State the tick started from, after the overlay had its say.
    pub started_from: BotState,
    /// State committed for the next tick.
    pub state: BotState,
    pub transitions: usize,
    pub capped: bool,
}

/// The bot: its current state and the evasion overlay.
///
/// `tick` reads the current state, runs the overlay and the driver, and
/// commits the result. Callers sharing an agent between requests must hold
/// one lock across the whole call.
#[derive(Debug, Clone)]
pub struct Agent {
    state: BotState,
    overlay: ReactiveOverlay,
    config: EngineConfig,
}

impl Agent {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            state: BotState::FindOpponent,
            overlay: ReactiveOverlay::new(&config),
            config,
        }
    }

    pub fn state(&self) -> &BotState {
        &self.state
    }

    pub fn overlay(&self) -> &ReactiveOverlay {
        &self.overlay
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Back to looking for an opponent, dropping any evasion window.
    pub fn reset(&mut self) {
        tracing::info!(from = %self.state, "Resetting to FindOpponent");
        self.state = BotState::FindOpponent;
        self.overlay.clear();
    }

    /// Throw every tick until the next reset.
    pub fn force_fire(&mut self) {
        tracing::info!(from = %self.state, "Forcing JustThrow");
        self.state = BotState::JustThrow;
    }

    /// Decide the action for `snapshot` and commit the resulting state.
    pub fn tick(&mut self, snapshot: &Snapshot) -> TickReport {
        let current = std::mem::take(&mut self.state);
        let start = self.overlay.starting_state(snapshot.myself(), current);
        let outcome = run_tick(start.clone(), snapshot, self.config.max_transitions);

        if outcome.action == Action::Fire
            && let BotState::ThrowAt { target } = &outcome.state
            && !can_reach_straight_line(
                snapshot.myself().position,
                *target,
                self.config.strike_range,
            )
        {
            tracing::debug!(
                target = %target,
                range = self.config.strike_range,
                "Throwing without a straight line to the target"
            );
        }

        self.state = outcome.state.clone();
        TickReport {
            action: outcome.action,
            started_from: start,
            state: outcome.state,
            transitions: outcome.transitions,
            capped: outcome.capped,
        }
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{Facing, Point};
    use crate::test_helpers::{SnapshotBuilder, step};

    #[test]
    fn fresh_agent_starts_with_find_opponent() {
        let agent = Agent::default();
        assert_eq!(agent.state(), &BotState::FindOpponent);
    }

    #[test]
    fn tick_commits_plan() {
        let mut agent = Agent::default();
        let snap = SnapshotBuilder::new(10, 10)
            .me(0, 0, Facing::South)
            .opponent(0, 5)
            .build();
        let report = agent.tick(&snap);
        assert_eq!(report.action, Action::Forward);
        assert_eq!(report.started_from, BotState::FindOpponent);
        assert!(matches!(agent.state(), BotState::GoTo { target, .. } if *target == Point::new(0, 4)));
    }

    #[test]
    fn hit_commits_evasion_regardless_of_plan() {
        let mut agent = Agent::default();
        agent.force_fire();
        let snap = SnapshotBuilder::new(10, 10)
            .me(5, 5, Facing::North)
            .hit()
            .opponent(0, 0)
            .build();
        let report = agent.tick(&snap);
        assert_eq!(report.started_from, BotState::RunAway { steps: 5 });
        // Facing north with north open: turn is already done, step now.
        assert_eq!(report.action, Action::Forward);
        assert!(agent.overlay().is_evading());
        let BotState::SingleAction { next, .. } = agent.state() else {
            panic!("expected spent latch, got {}", agent.state());
        };
        assert_eq!(**next, BotState::RunAway { steps: 4 });
    }

    #[test]
    fn full_evasion_returns_to_hunting() {
        let mut agent = Agent::default();
        let mut snap = SnapshotBuilder::new(20, 20)
            .me(10, 10, Facing::North)
            .hit()
            .opponent(0, 19)
            .build();

        let mut saw_run_away = false;
        for _ in 0..40 {
            let report = agent.tick(&snap);
            if matches!(report.started_from, BotState::RunAway { .. }) {
                saw_run_away = true;
            }
            snap = step(&snap, report.action);
            if saw_run_away && !agent.overlay().is_evading() {
                break;
            }
        }
        assert!(saw_run_away);
        // Every step went north; five of them in total.
        assert_eq!(snap.myself().position, Point::new(10, 5));
    }

    #[test]
    fn reset_and_force_fire() {
        let mut agent = Agent::default();
        let snap = SnapshotBuilder::new(10, 10)
            .me(5, 5, Facing::North)
            .hit()
            .build();
        agent.tick(&snap);
        assert!(agent.overlay().is_evading());

        agent.force_fire();
        assert_eq!(agent.state(), &BotState::JustThrow);

        agent.reset();
        assert_eq!(agent.state(), &BotState::FindOpponent);
        assert!(!agent.overlay().is_evading());
    }

    #[test]
    fn just_throw_survives_ticks() {
        let mut agent = Agent::default();
        agent.force_fire();
        let snap = SnapshotBuilder::new(10, 10)
            .me(5, 5, Facing::North)
            .opponent(1, 1)
            .build();
        for _ in 0..3 {
            assert_eq!(agent.tick(&snap).action, Action::Fire);
        }
        assert_eq!(agent.state(), &BotState::JustThrow);
    }
}

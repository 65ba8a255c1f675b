use crate::arena::PlayerState;
use crate::config::EngineConfig;
use crate::state::BotState;

/// Tick-level reaction to being hit.
///
/// A hit outside an evasion window replaces the starting state with
/// `RunAway` and opens a cooldown; further hits during the cooldown are
/// ignored while the counter runs down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactiveOverlay {
    evasion_steps: i32,
    cooldown_ticks: u32,
    cooldown: u32,
}

impl ReactiveOverlay {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            evasion_steps: config.evasion_steps,
            cooldown_ticks: config.evasion_cooldown_ticks,
            cooldown: 0,
        }
    }

    /// Ticks left in the current evasion window.
    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn is_evading(&self) -> bool {
        self.cooldown > 0
    }

    pub fn clear(&mut self) {
        self.cooldown = 0;
    }

    /// Pick the state this tick starts from.
    pub fn starting_state(&mut self, myself: &PlayerState, current: BotState) -> BotState {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return current;
        }
        if myself.was_hit {
            self.cooldown = self.cooldown_ticks;
            tracing::info!(
                steps = self.evasion_steps,
                cooldown = self.cooldown,
                "Hit, starting evasion"
            );
            return BotState::RunAway {
                steps: self.evasion_steps,
            };
        }
        current
    }
}

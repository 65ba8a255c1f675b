use serde::{Deserialize, Serialize};

use crate::driver::DEFAULT_MAX_TRANSITIONS;

/// Tunables of the decision engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on state evaluations within one tick.
    pub max_transitions: usize,
    /// Steps granted to `RunAway` after a hit.
    pub evasion_steps: i32,
    /// Ticks during which further hits do not restart evasion.
    pub evasion_cooldown_ticks: u32,
    /// Throw range along a row or column, used for diagnostics.
    pub strike_range: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_transitions: DEFAULT_MAX_TRANSITIONS,
            evasion_steps: 5,
            evasion_cooldown_ticks: 5,
            strike_range: 3,
        }
    }
}

impl EngineConfig {
    /// Problems that make the configuration unusable.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.max_transitions == 0 {
            problems.push("engine.max_transitions must be > 0".to_string());
        }
        if self.evasion_steps < 0 {
            problems.push("engine.evasion_steps must be >= 0".to_string());
        }
        if self.strike_range <= 0 {
            problems.push("engine.strike_range must be > 0".to_string());
        }
        problems
    }
}

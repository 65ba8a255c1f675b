use serde::Serialize;

use crate::arena::Arena;

/// One analytics row: a player's state at one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRow {
    pub x: i32,
    pub y: i32,
    pub direction: String,
    pub was_hit: bool,
    pub score: i32,
    pub player: String,
    /// Epoch microseconds.
    pub timestamp: i64,
}

/// Rows for every player in `arena`, all stamped with `timestamp`.
pub fn rows(arena: &Arena, timestamp: i64) -> Vec<TelemetryRow> {
    arena
        .players
        .iter()
        .map(|(id, p)| TelemetryRow {
            x: p.position.x,
            y: p.position.y,
            direction: p.facing.code().to_string(),
            was_hit: p.was_hit,
            score: p.score,
            player: id.clone(),
            timestamp,
        })
        .collect()
}

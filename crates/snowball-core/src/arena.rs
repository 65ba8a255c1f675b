use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Player identifier. The game server uses the bot's public URL.
pub type PlayerId = String;

/// Integer grid coordinate. `y` grows southwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to `other`. Saturates instead of overflowing.
    pub fn distance(self, other: Point) -> u32 {
        self.x
            .abs_diff(other.x)
            .saturating_add(self.y.abs_diff(other.y))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal facing on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    North,
    South,
    East,
    West,
}

impl Facing {
    /// All facings, in evasion probe order.
    pub const PROBE_ORDER: [Facing; 4] = [Facing::North, Facing::South, Facing::West, Facing::East];

    /// Wire code used by the game server.
    pub fn code(self) -> char {
        match self {
            Facing::North => 'N',
            Facing::South => 'S',
            Facing::East => 'E',
            Facing::West => 'W',
        }
    }

    /// Parse a wire code. Anything but `N`, `S`, `E` or `W` is rejected.
    pub fn from_code(code: &str) -> Result<Self, EngineError> {
        match code {
            "N" => Ok(Facing::North),
            "S" => Ok(Facing::South),
            "E" => Ok(Facing::East),
            "W" => Ok(Facing::West),
            other => Err(EngineError::InvalidFacing(other.to_string())),
        }
    }

    /// Facing after a single left turn.
    pub fn turned_left(self) -> Facing {
        match self {
            Facing::North => Facing::West,
            Facing::West => Facing::South,
            Facing::South => Facing::East,
            Facing::East => Facing::North,
        }
    }

    /// Facing after a single right turn.
    pub fn turned_right(self) -> Facing {
        match self {
            Facing::North => Facing::East,
            Facing::East => Facing::South,
            Facing::South => Facing::West,
            Facing::West => Facing::North,
        }
    }

    pub fn opposite(self) -> Facing {
        match self {
            Facing::North => Facing::South,
            Facing::South => Facing::North,
            Facing::East => Facing::West,
            Facing::West => Facing::East,
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The cell adjacent to `position` in direction `facing`.
pub fn neighbor(position: Point, facing: Facing) -> Point {
    match facing {
        Facing::North => Point::new(position.x, position.y.saturating_sub(1)),
        Facing::South => Point::new(position.x, position.y.saturating_add(1)),
        Facing::East => Point::new(position.x.saturating_add(1), position.y),
        Facing::West => Point::new(position.x.saturating_sub(1), position.y),
    }
}

/// True when `a` and `b` share a row or column and are at most `max_range`
/// cells apart along it.
pub fn can_reach_straight_line(a: Point, b: Point, max_range: i32) -> bool {
    if a.x == b.x {
        (a.y - b.y).abs() <= max_range
    } else if a.y == b.y {
        (a.x - b.x).abs() <= max_range
    } else {
        false
    }
}

/// One participant as seen in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerState {
    pub position: Point,
    pub facing: Facing,
    pub score: i32,
    pub was_hit: bool,
}

/// The arena for one tick: bounds plus every player, ordered by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arena {
    pub width: i32,
    pub height: i32,
    pub players: BTreeMap<PlayerId, PlayerState>,
}

impl Arena {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            players: BTreeMap::new(),
        }
    }

    /// Whether `point` lies inside `[0, width) x [0, height)`.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0 && point.y >= 0 && point.x < self.width && point.y < self.height
    }

    /// Whether some player stands on `point`. Out-of-bounds points are never
    /// occupied.
    pub fn is_occupied(&self, point: Point) -> bool {
        self.contains(point) && self.players.values().any(|p| p.position == point)
    }

    /// In bounds and nobody standing there.
    pub fn is_free(&self, point: Point) -> bool {
        self.contains(point) && !self.is_occupied(point)
    }

    /// Nearest player other than `exclude_id` by Manhattan distance.
    ///
    /// Ties go to the first candidate in id order, so the result is stable for
    /// a given arena.
    pub fn find_nearest_other(
        &self,
        origin: Point,
        exclude_id: &str,
    ) -> Option<(&PlayerId, &PlayerState)> {
        self.players
            .iter()
            .filter(|(id, _)| id.as_str() != exclude_id)
            .min_by_key(|(_, p)| origin.distance(p.position))
    }
}

/// An arena together with the identity of the bot it was sent to.
///
/// Construction checks that the bot appears in the arena, so `myself` never
/// fails afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    arena: Arena,
    self_id: PlayerId,
}

impl Snapshot {
    pub fn new(arena: Arena, self_id: impl Into<PlayerId>) -> Result<Self, EngineError> {
        let self_id = self_id.into();
        if !arena.players.contains_key(&self_id) {
            return Err(EngineError::MissingSelf(self_id));
        }
        Ok(Self { arena, self_id })
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn self_id(&self) -> &str {
        &self.self_id
    }

    pub fn myself(&self) -> &PlayerState {
        // Presence is checked in `new` and the arena is never mutated afterwards.
        &self.arena.players[&self.self_id]
    }

    /// Nearest opponent to the bot, if any.
    pub fn nearest_opponent(&self) -> Option<(&PlayerId, &PlayerState)> {
        self.arena
            .find_nearest_other(self.myself().position, &self.self_id)
    }

    pub fn into_arena(self) -> Arena {
        self.arena
    }
}

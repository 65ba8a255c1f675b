//! JSON payload posted by the game server every tick.
//!
//! ```json
//! {
//!   "_links": { "self": { "href": "https://bot.example" } },
//!   "arena": {
//!     "dims": [12, 9],
//!     "state": {
//!       "https://bot.example": { "x": 0, "y": 3, "direction": "N", "score": 0, "wasHit": false }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::arena::{Arena, Facing, PlayerState, Point, Snapshot};
use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaUpdate {
    #[serde(rename = "_links")]
    pub links: Links,
    pub arena: ArenaMsg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: SelfLink,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfLink {
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaMsg {
    pub dims: Vec<i64>,
    pub state: BTreeMap<String, PlayerMsg>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMsg {
    pub x: i64,
    pub y: i64,
    pub direction: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub was_hit: bool,
}

fn to_i32(field: &'static str, value: i64) -> Result<i32, EngineError> {
    i32::try_from(value).map_err(|_| EngineError::OutOfRange { field, value })
}

impl TryFrom<&PlayerMsg> for PlayerState {
    type Error = EngineError;

    fn try_from(msg: &PlayerMsg) -> Result<Self, Self::Error> {
        Ok(PlayerState {
            position: Point::new(to_i32("x", msg.x)?, to_i32("y", msg.y)?),
            facing: Facing::from_code(&msg.direction)?,
            score: to_i32("score", msg.score)?,
            was_hit: msg.was_hit,
        })
    }
}

impl TryFrom<&ArenaUpdate> for Snapshot {
    type Error = EngineError;

    /// Validate the payload: two positive dimensions, known direction codes,
    /// every player on the board, and the bot's own id present in the state
    /// map.
    fn try_from(update: &ArenaUpdate) -> Result<Self, Self::Error> {
        let (width, height) = match update.arena.dims.as_slice() {
            [w, h] if *w > 0 && *h > 0 => (to_i32("width", *w)?, to_i32("height", *h)?),
            other => return Err(EngineError::InvalidDimensions(other.to_vec())),
        };

        let mut arena = Arena::new(width, height);
        for (id, msg) in &update.arena.state {
            let player = PlayerState::try_from(msg)?;
            if !arena.contains(player.position) {
                return Err(EngineError::OffBoard {
                    player: id.clone(),
                    x: player.position.x,
                    y: player.position.y,
                });
            }
            arena.players.insert(id.clone(), player);
        }
        Snapshot::new(arena, update.self_id())
    }
}

impl ArenaUpdate {
    pub fn self_id(&self) -> &str {
        &self.links.self_link.href
    }

    /// Build the payload the game server would send for `snapshot`.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let arena = snapshot.arena();
        let state = arena
            .players
            .iter()
            .map(|(id, p)| {
                (
                    id.clone(),
                    PlayerMsg {
                        x: i64::from(p.position.x),
                        y: i64::from(p.position.y),
                        direction: p.facing.code().to_string(),
                        score: i64::from(p.score),
                        was_hit: p.was_hit,
                    },
                )
            })
            .collect();
        ArenaUpdate {
            links: Links {
                self_link: SelfLink {
                    href: snapshot.self_id().to_string(),
                },
            },
            arena: ArenaMsg {
                dims: vec![i64::from(arena.width), i64::from(arena.height)],
                state,
            },
        }
    }
}

pub mod agent;
pub mod arena;
pub mod config;
pub mod decision;
pub mod driver;
pub mod error;
pub mod overlay;
pub mod state;
pub mod telemetry;
pub mod time;
pub mod wire;

pub use agent::{Agent, TickReport};
pub use arena::{Arena, Facing, PlayerState, Point, Snapshot};
pub use config::EngineConfig;
pub use decision::{Action, Behavior, Decision};
pub use driver::{TickOutcome, run_tick};
pub use error::EngineError;
pub use state::BotState;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::arena::{Arena, Facing, PlayerState, Point, Snapshot, neighbor};
    use crate::decision::Action;

    /// Id the builder gives the bot itself.
    pub const SELF_ID: &str = "https://self.example";

    /// Fluent builder for test snapshots.
    ///
    /// The bot defaults to (0, 0) facing north; opponents get ids
    /// `https://opponent-N.example` in insertion order.
    pub struct SnapshotBuilder {
        arena: Arena,
        me: PlayerState,
        opponents: usize,
    }

    impl SnapshotBuilder {
        pub fn new(width: i32, height: i32) -> Self {
            Self {
                arena: Arena::new(width, height),
                me: PlayerState {
                    position: Point::new(0, 0),
                    facing: Facing::North,
                    score: 0,
                    was_hit: false,
                },
                opponents: 0,
            }
        }

        pub fn me(mut self, x: i32, y: i32, facing: Facing) -> Self {
            self.me.position = Point::new(x, y);
            self.me.facing = facing;
            self
        }

        /// Mark the bot as hit this tick.
        pub fn hit(mut self) -> Self {
            self.me.was_hit = true;
            self
        }

        pub fn opponent(mut self, x: i32, y: i32) -> Self {
            let id = format!("https://opponent-{}.example", self.opponents);
            self.opponents += 1;
            self.arena.players.insert(
                id,
                PlayerState {
                    position: Point::new(x, y),
                    facing: Facing::South,
                    score: 0,
                    was_hit: false,
                },
            );
            self
        }

        pub fn build(mut self) -> Snapshot {
            self.arena.players.insert(SELF_ID.to_string(), self.me);
            Snapshot::new(self.arena, SELF_ID).expect("builder always inserts self")
        }
    }

    /// Play `action` for the bot and return the following snapshot.
    ///
    /// Forward only moves into a free in-bounds cell. The hit flag is
    /// cleared, everyone else stays put.
    pub fn step(snapshot: &Snapshot, action: Action) -> Snapshot {
        let self_id = snapshot.self_id().to_string();
        let arena = snapshot.arena();
        let mut me = *snapshot.myself();
        match action {
            Action::Forward => {
                let ahead = neighbor(me.position, me.facing);
                if arena.is_free(ahead) {
                    me.position = ahead;
                }
            },
            Action::TurnLeft => me.facing = me.facing.turned_left(),
            Action::TurnRight => me.facing = me.facing.turned_right(),
            Action::Fire => {},
        }
        me.was_hit = false;

        let mut arena = snapshot.clone().into_arena();
        arena.players.insert(self_id.clone(), me);
        Snapshot::new(arena, self_id).expect("self is reinserted")
    }
}

use std::fmt;

use serde::Serialize;

use crate::arena::{Arena, Facing, Point, Snapshot, neighbor};
use crate::decision::{Action, Behavior, Decision};

/// Behavioral state of the bot.
///
/// States nest through their `next` fields, so a single value describes a
/// whole plan such as "walk there, face that way, then throw". A state is
/// never mutated; deciding produces either an action or a replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BotState {
    /// Pick the nearest opponent and plan an attack on it.
    #[default]
    FindOpponent,
    /// Walk to `target`, closing the y-gap before the x-gap.
    GoTo { target: Point, next: Box<BotState> },
    /// Rotate left until facing `facing`.
    TurnTo { facing: Facing, next: Box<BotState> },
    /// Throw. Positioning is the job of the states before it.
    ThrowAt { target: Point },
    /// Step away from neighbours for `steps` more moves.
    RunAway { steps: i32 },
    /// Emit `action` once while armed, then continue with `next`.
    SingleAction {
        action: Action,
        next: Box<BotState>,
        armed: bool,
    },
    /// Throw every tick until reset.
    JustThrow,
}

impl BotState {
    pub fn go_to(target: Point, next: BotState) -> Self {
        BotState::GoTo {
            target,
            next: Box::new(next),
        }
    }

    pub fn turn_to(facing: Facing, next: BotState) -> Self {
        BotState::TurnTo {
            facing,
            next: Box::new(next),
        }
    }

    /// An armed one-shot latch around `action`.
    pub fn single_action(action: Action, next: BotState) -> Self {
        BotState::SingleAction {
            action,
            next: Box::new(next),
            armed: true,
        }
    }

    /// Short variant name for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            BotState::FindOpponent => "find_opponent",
            BotState::GoTo { .. } => "go_to",
            BotState::TurnTo { .. } => "turn_to",
            BotState::ThrowAt { .. } => "throw_at",
            BotState::RunAway { .. } => "run_away",
            BotState::SingleAction { .. } => "single_action",
            BotState::JustThrow => "just_throw",
        }
    }
}

/// Full attack plan against an opponent standing on `target`.
fn attack_plan(arena: &Arena, me: Point, target: Point) -> BotState {
    match approach_cell(arena, me, target) {
        Some((cell, facing)) => BotState::go_to(
            cell,
            BotState::turn_to(facing, BotState::ThrowAt { target }),
        ),
        // No usable side: walk straight at the target, GoTo throws once it
        // is directly ahead.
        None => BotState::go_to(target, BotState::ThrowAt { target }),
    }
}

/// Closest usable cell next to `target` and the facing that looks at the
/// target from it. Equal distances prefer south, north, east, west in that
/// order.
fn approach_cell(arena: &Arena, me: Point, target: Point) -> Option<(Point, Facing)> {
    [Facing::South, Facing::North, Facing::East, Facing::West]
        .into_iter()
        .map(|side| (neighbor(target, side), side.opposite()))
        .filter(|(cell, _)| *cell == me || arena.is_free(*cell))
        .min_by_key(|(cell, _)| me.distance(*cell))
}

impl Behavior for BotState {
    fn decide(&self, snapshot: &Snapshot) -> Decision<BotState> {
        let me = snapshot.myself();
        let arena = snapshot.arena();

        match self {
            BotState::FindOpponent => match snapshot.nearest_opponent() {
                Some((_, opponent)) => {
                    Decision::Transition(attack_plan(arena, me.position, opponent.position))
                },
                None => Decision::Act(Action::Fire),
            },

            BotState::GoTo { target, next } => {
                let desired = if me.position.y < target.y {
                    Facing::South
                } else if me.position.y > target.y {
                    Facing::North
                } else if me.position.x < target.x {
                    Facing::East
                } else if me.position.x > target.x {
                    Facing::West
                } else {
                    return Decision::Transition((**next).clone());
                };

                if me.facing != desired {
                    Decision::Transition(BotState::turn_to(desired, self.clone()))
                } else if arena.is_occupied(neighbor(me.position, desired)) {
                    Decision::Act(Action::Fire)
                } else {
                    Decision::Act(Action::Forward)
                }
            },

            BotState::TurnTo { facing, next } => {
                if me.facing == *facing {
                    Decision::Transition((**next).clone())
                } else {
                    Decision::Act(Action::TurnLeft)
                }
            },

            BotState::ThrowAt { .. } | BotState::JustThrow => Decision::Act(Action::Fire),

            BotState::RunAway { steps } => {
                if *steps <= 0 {
                    return Decision::Transition(BotState::FindOpponent);
                }
                let opening = Facing::PROBE_ORDER
                    .into_iter()
                    .find(|f| arena.is_free(neighbor(me.position, *f)));
                match opening {
                    Some(facing) => Decision::Transition(BotState::turn_to(
                        facing,
                        BotState::single_action(
                            Action::Forward,
                            BotState::RunAway { steps: steps - 1 },
                        ),
                    )),
                    // Cornered.
                    None => Decision::Act(Action::Fire),
                }
            },

            BotState::SingleAction {
                action,
                next,
                armed,
            } => {
                if *armed {
                    Decision::ActThen(
                        *action,
                        BotState::SingleAction {
                            action: *action,
                            next: next.clone(),
                            armed: false,
                        },
                    )
                } else {
                    Decision::Transition((**next).clone())
                }
            },
        }
    }
}

impl fmt::Display for BotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotState::FindOpponent => write!(f, "FindOpponent"),
            BotState::GoTo { target, next } => write!(f, "GoTo{target} -> {next}"),
            BotState::TurnTo { facing, next } => write!(f, "TurnTo({facing}) -> {next}"),
            BotState::ThrowAt { target } => write!(f, "ThrowAt{target}"),
            BotState::RunAway { steps } => write!(f, "RunAway({steps})"),
            BotState::SingleAction {
                action,
                next,
                armed,
            } => {
                let mark = if *armed { "" } else { "spent " };
                write!(f, "SingleAction({mark}{action}) -> {next}")
            },
            BotState::JustThrow => write!(f, "JustThrow"),
        }
    }
}

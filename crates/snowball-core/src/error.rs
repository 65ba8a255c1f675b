/// Reasons a tick cannot be decided at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The bot's own id is not a key of the arena state.
    MissingSelf(String),
    /// A direction code outside `N`, `S`, `E`, `W`.
    InvalidFacing(String),
    /// Arena dimensions must be exactly `[width, height]`, both positive.
    InvalidDimensions(Vec<i64>),
    /// A coordinate or score does not fit the engine's integer range.
    OutOfRange { field: &'static str, value: i64 },
    /// A player stands outside `[0, width) x [0, height)`.
    OffBoard { player: String, x: i32, y: i32 },
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSelf(id) => write!(f, "self player {id:?} not found in arena state"),
            Self::InvalidFacing(code) => write!(f, "invalid direction {code:?}"),
            Self::InvalidDimensions(dims) => write!(f, "invalid arena dimensions {dims:?}"),
            Self::OutOfRange { field, value } => write!(f, "{field} out of range: {value}"),
            Self::OffBoard { player, x, y } => {
                write!(f, "player {player:?} at ({x}, {y}) is outside the arena")
            },
        }
    }
}

impl std::error::Error for EngineError {}

//! Core identifiers and small value types shared by every menu module.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Index of a slot inside a menu container, counted row by row from the top-left.
pub type Slot = usize;

/// Number of slots in one container row.
pub const ROW_WIDTH: usize = 9;

/// Largest row count a container supports.
pub const MAX_ROWS: u8 = 6;

/// Unique identifier for a player connected to the game server.
///
/// Wraps a UUID so player ids cannot be confused with other ids in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Creates a new random player ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a player ID from a string representation.
    pub fn from_str(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The way a viewer clicked a slot, as normalized by the host adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickType {
    Left,
    Right,
    ShiftLeft,
    ShiftRight,
    Middle,
    Drop,
    Other,
}

impl ClickType {
    /// Command prefix marker selecting this click type, e.g. `[left]`.
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            ClickType::Left => Some("[left]"),
            ClickType::Right => Some("[right]"),
            ClickType::ShiftLeft => Some("[shift_left]"),
            ClickType::ShiftRight => Some("[shift_right]"),
            ClickType::Middle => Some("[middle]"),
            ClickType::Drop => Some("[drop]"),
            ClickType::Other => None,
        }
    }

    /// All click types that have a command marker.
    pub fn marked() -> [ClickType; 6] {
        [
            ClickType::Left,
            ClickType::Right,
            ClickType::ShiftLeft,
            ClickType::ShiftRight,
            ClickType::Middle,
            ClickType::Drop,
        ]
    }
}

/// Who a menu command is dispatched as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandSender {
    Console,
    Player(PlayerId),
}

/// A raw click delivered by the host for a viewer's open menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuClick {
    pub viewer: PlayerId,
    pub slot: Slot,
    pub click: ClickType,
}

/// A raw drag delivered by the host for a viewer's open menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuDrag {
    pub viewer: PlayerId,
    pub slots: Vec<Slot>,
}

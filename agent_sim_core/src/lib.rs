use serde::{Deserialize, Serialize};

pub mod agent;
pub mod environment;
pub mod error;
pub mod map;
pub mod program;
pub mod table;
pub mod vacuum;

/// Unique identifier for entities (agents, things).
pub type EntityId = usize;

/// Represents a 2D coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

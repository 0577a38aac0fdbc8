// Team domain module
// Contains the team aggregate root, its players, value objects, and query specifications

#![allow(clippy::module_inception)]

pub mod player;
pub mod specification;
pub mod team;
pub mod value_objects;

// Re-export main types for convenience
pub use player::Player;
pub use specification::{TeamCriterion, TeamSpecification};
pub use team::Team;
pub use value_objects::{Position, TeamSortField};

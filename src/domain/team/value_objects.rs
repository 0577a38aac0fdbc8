use serde::{Deserialize, Serialize};

/// Field position of a player
///
/// Stored as the `player_position` PostgreSQL enum and rendered on the wire
/// in upper case (`"GOALKEEPER"`, `"FORWARD"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "player_position", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    /// All positions, in line order from the goal outwards
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Goalkeeper => write!(f, "GOALKEEPER"),
            Position::Defender => write!(f, "DEFENDER"),
            Position::Midfielder => write!(f, "MIDFIELDER"),
            Position::Forward => write!(f, "FORWARD"),
        }
    }
}

/// Team fields a page of teams can be ordered by
///
/// Anything else is rejected by the persistence gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamSortField {
    Id,
    Name,
    Acronym,
    Budget,
}

impl TeamSortField {
    /// Resolves a sort property name as sent by clients
    ///
    /// # Example
    /// ```
    /// use soccer_api::domain::team::value_objects::TeamSortField;
    ///
    /// assert_eq!(TeamSortField::from_property("budget"), Some(TeamSortField::Budget));
    /// assert_eq!(TeamSortField::from_property("salary"), None);
    /// ```
    pub fn from_property(property: &str) -> Option<Self> {
        match property {
            "id" => Some(TeamSortField::Id),
            "name" => Some(TeamSortField::Name),
            "acronym" => Some(TeamSortField::Acronym),
            "budget" => Some(TeamSortField::Budget),
            _ => None,
        }
    }
}

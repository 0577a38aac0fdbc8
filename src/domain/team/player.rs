use super::value_objects::Position;
use crate::domain::errors::DomainError;

/// A player owned by a Team aggregate
///
/// Players have no lifecycle of their own: they are created through their
/// team's player list and removed with it. The parent link is kept as the
/// owning team's id and is `None` until the team has been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    id: Option<i64>,
    team_id: Option<i64>,
    name: String,
    position: Position,
}

impl Player {
    /// Creates a new, not yet persisted player
    ///
    /// # Errors
    /// Returns [`DomainError::BlankPlayerName`] if `name` is blank.
    pub fn new(name: impl Into<String>, position: Position) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::BlankPlayerName);
        }

        Ok(Self {
            id: None,
            team_id: None,
            name,
            position,
        })
    }

    /// Reconstructs a Player from a stored row
    pub fn from_persistence(id: i64, team_id: i64, name: String, position: Position) -> Self {
        Self {
            id: Some(id),
            team_id: Some(team_id),
            name,
            position,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Id of the owning team, once that team is persisted
    pub fn team_id(&self) -> Option<i64> {
        self.team_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    pub(crate) fn attach_to(&mut self, team_id: Option<i64>) {
        self.team_id = team_id;
    }
}

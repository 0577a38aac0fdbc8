// Wire representations of the Team aggregate and of result pages

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::pagination::Page;
use crate::domain::team::{Player, Position, Team};

#[derive(Debug, Clone, Serialize)]
pub struct PlayerResponse {
    pub id: Option<i64>,
    pub name: String,
    pub position: Position,
}

impl From<&Player> for PlayerResponse {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id(),
            name: player.name().to_string(),
            position: player.position(),
        }
    }
}

/// Response body for a team; the player back-reference is never serialized
#[derive(Debug, Clone, Serialize)]
pub struct TeamResponse {
    pub id: Option<i64>,
    pub name: String,
    pub acronym: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub budget: Decimal,
    pub players: Vec<PlayerResponse>,
}

impl From<&Team> for TeamResponse {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id(),
            name: team.name().to_string(),
            acronym: team.acronym().to_string(),
            budget: team.budget(),
            players: team.players().iter().map(PlayerResponse::from).collect(),
        }
    }
}

/// Page envelope
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u32,
    pub size: u32,
    pub number_of_elements: usize,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        let total_pages = page.total_pages();
        let first = page.is_first();
        let last = page.is_last();
        let number_of_elements = page.content.len();

        Self {
            empty: page.content.is_empty(),
            content: page.content,
            total_elements: page.total_elements,
            total_pages,
            number: page.number,
            size: page.size,
            number_of_elements,
            first,
            last,
        }
    }
}

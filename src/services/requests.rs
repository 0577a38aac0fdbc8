use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::team::Position;

/// Body of a team creation or full replacement
///
/// Every field is optional at the wire level so that a missing value shows
/// up as a validation failure on that field instead of an unreadable body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamRequest {
    pub name: Option<String>,
    pub acronym: Option<String>,
    pub budget: Option<Decimal>,
    pub players: Option<Vec<PlayerRequest>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerRequest {
    pub name: Option<String>,
    pub position: Option<Position>,
}

/// Body of a partial update; absent means unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamPartialUpdateRequest {
    pub name: Option<String>,
    pub budget: Option<Decimal>,
}

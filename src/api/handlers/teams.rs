use axum::{extract::State, http::StatusCode, Json};
use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

use crate::api::errors::{ApiError, ParameterViolation};
use crate::api::extract::{AppJson, AppPath, AppQuery, ValidatedJson};
use crate::api::middleware::BasicAuth;
use crate::api::responses::{PageResponse, TeamResponse};
use crate::api::state::AppState;
use crate::api::validation::Validate;
use crate::services::{TeamPartialUpdateRequest, TeamRequest};

const DEFAULT_PAGE: i64 = 0;
const DEFAULT_SIZE: i64 = 10;
const DEFAULT_SORT_BY: &str = "name";
const DEFAULT_DIRECTION: &str = "asc";

/// Reads an optional query value, treating `?key=` like an absent key
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

/// Query string of the team listing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTeamsParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub size: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort_by: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub direction: Option<String>,
}

impl ListTeamsParams {
    /// Applies defaults and checks `page >= 0`, `size >= 1`
    fn page_and_size(&self) -> Result<(u32, u32), ApiError> {
        let page = self.page.unwrap_or(DEFAULT_PAGE);
        let size = self.size.unwrap_or(DEFAULT_SIZE);

        let mut violations = Vec::new();
        if page < 0 {
            violations.push(ParameterViolation {
                property: "page".into(),
                invalid_value: Value::from(page),
                message: "must be greater than or equal to 0".into(),
            });
        }
        if size < 1 {
            violations.push(ParameterViolation {
                property: "size".into(),
                invalid_value: Value::from(size),
                message: "must be greater than or equal to 1".into(),
            });
        }
        if !violations.is_empty() {
            return Err(ApiError::invalid_parameters(violations));
        }

        Ok((
            u32::try_from(page).unwrap_or(u32::MAX),
            u32::try_from(size).unwrap_or(u32::MAX),
        ))
    }
}

/// Query string of the team filter
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterTeamsParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_budget: Option<Decimal>,
}

/// List teams with their players
///
/// GET /api/teams?page&size&sortBy&direction
pub async fn list_teams(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListTeamsParams>,
) -> Result<Json<PageResponse<TeamResponse>>, ApiError> {
    let (page, size) = params.page_and_size()?;
    let sort_by = params.sort_by.as_deref().unwrap_or(DEFAULT_SORT_BY);
    let direction = params.direction.as_deref().unwrap_or(DEFAULT_DIRECTION);

    let teams = state
        .teams
        .find_with_all_players(page, size, sort_by, direction)
        .await?;

    Ok(Json(PageResponse::from(teams.map(|team| TeamResponse::from(&team)))))
}

/// Filter teams by name fragment and minimum budget
///
/// GET /api/teams/filter?name&minBudget
pub async fn filter_teams(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<FilterTeamsParams>,
) -> Result<Json<PageResponse<TeamResponse>>, ApiError> {
    let teams = state
        .teams
        .filter_teams(params.name.as_deref(), params.min_budget)
        .await?;

    Ok(Json(PageResponse::from(teams.map(|team| TeamResponse::from(&team)))))
}

/// Create a new team
///
/// POST /api/teams
pub async fn create_team(
    BasicAuth(username): BasicAuth,
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<TeamRequest>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    tracing::info!(%username, "Creating new team");

    let team = state.teams.add_team(request).await?;

    tracing::info!(id = ?team.id(), "Team created");
    Ok((StatusCode::CREATED, Json(TeamResponse::from(&team))))
}

/// Partially update a team
///
/// PATCH /api/teams/:id
pub async fn update_team_partially(
    BasicAuth(username): BasicAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(patch): AppJson<TeamPartialUpdateRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    tracing::info!(%username, id, "Partially updating team");

    // An unknown team answers 404 whatever the body holds
    if let Err(fields) = patch.validate() {
        state.teams.ensure_team_exists(id).await?;
        return Err(ApiError::invalid_fields(fields));
    }

    let team = state.teams.update_team_partially(id, patch).await?;
    Ok(Json(TeamResponse::from(&team)))
}

/// Replace every field of a team, players included
///
/// PUT /api/teams/:id
pub async fn update_team_fully(
    BasicAuth(username): BasicAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    ValidatedJson(request): ValidatedJson<TeamRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    tracing::info!(%username, id, "Fully updating team");

    let team = state.teams.update_team_fully(id, request).await?;
    Ok(Json(TeamResponse::from(&team)))
}

/// Delete a team
///
/// DELETE /api/teams/:id
pub async fn delete_team(
    BasicAuth(username): BasicAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, ApiError> {
    tracing::info!(%username, id, "Deleting team");

    state.teams.delete_team(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

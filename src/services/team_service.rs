use std::sync::Arc;

use rust_decimal::Decimal;

use super::errors::{ServiceError, ServiceResult};
use super::requests::{PlayerRequest, TeamPartialUpdateRequest, TeamRequest};
use crate::domain::pagination::{Direction, Page, PageRequest, Sort};
use crate::domain::repositories::TeamRepository;
use crate::domain::team::specification::{
    budget_greater_than_or_equal_to, fetch_players, name_contains_ignore_case,
};
use crate::domain::team::{Player, Team};

/// Page size used by [`TeamService::filter_teams`]
pub const FILTER_PAGE_SIZE: u32 = 10;

const MISSING_FIELDS: &str = "Every field is required";

/// Business operations on the Team aggregate
///
/// Stateless apart from the shared repository handle, so it is cheap to
/// clone into every request.
#[derive(Clone)]
pub struct TeamService {
    repository: Arc<dyn TeamRepository>,
}

/// Mandatory team fields after the presence check
struct TeamDetails {
    name: String,
    acronym: String,
    budget: Decimal,
}

fn require_details(request: &TeamRequest) -> ServiceResult<TeamDetails> {
    match (&request.name, &request.acronym, request.budget) {
        (Some(name), Some(acronym), Some(budget))
            if !name.trim().is_empty() && !acronym.trim().is_empty() =>
        {
            Ok(TeamDetails {
                name: name.clone(),
                acronym: acronym.clone(),
                budget,
            })
        }
        _ => Err(ServiceError::InvalidArgument(MISSING_FIELDS.to_string())),
    }
}

fn build_players(requests: Option<&[PlayerRequest]>) -> ServiceResult<Vec<Player>> {
    requests
        .unwrap_or_default()
        .iter()
        .map(|request| match (&request.name, request.position) {
            (Some(name), Some(position)) => Ok(Player::new(name.clone(), position)?),
            _ => Err(ServiceError::InvalidArgument(MISSING_FIELDS.to_string())),
        })
        .collect()
}

impl TeamService {
    pub fn new(repository: Arc<dyn TeamRepository>) -> Self {
        Self { repository }
    }

    /// Returns one page of teams with their players
    ///
    /// `direction` is descending only for `"desc"` (any case). An unknown
    /// `sort_by` is rejected by the repository.
    pub async fn find_with_all_players(
        &self,
        page: u32,
        size: u32,
        sort_by: &str,
        direction: &str,
    ) -> ServiceResult<Page<Team>> {
        tracing::info!(
            page,
            size,
            sort_by,
            direction,
            "Fetching teams with players"
        );

        let sort = Sort::by(sort_by, Direction::parse_lenient(direction));
        let pageable = PageRequest::sorted(page, size, sort);
        let result = self.repository.find_all_with_players(&pageable).await?;

        tracing::info!(total = result.total_elements, "Found teams");
        Ok(result)
    }

    /// Returns the first page of teams matching the optional filters
    pub async fn filter_teams(
        &self,
        name: Option<&str>,
        min_budget: Option<Decimal>,
    ) -> ServiceResult<Page<Team>> {
        tracing::info!(?name, ?min_budget, "Filtering teams");

        let spec = fetch_players()
            .and(name_contains_ignore_case(name))
            .and(budget_greater_than_or_equal_to(min_budget));
        let result = self
            .repository
            .find_by_filter(&spec, &PageRequest::of(0, FILTER_PAGE_SIZE))
            .await?;

        tracing::info!(total = result.total_elements, "Found teams after filter");
        Ok(result)
    }

    /// Creates a team together with its players
    pub async fn add_team(&self, request: TeamRequest) -> ServiceResult<Team> {
        tracing::info!(?request, "Adding new team");

        let details = require_details(&request).inspect_err(|_| {
            tracing::info!("Team creation failed - missing mandatory fields");
        })?;
        let mut team = Team::new(details.name, details.acronym, details.budget)?;
        for player in build_players(request.players.as_deref())? {
            team.add_player(player);
        }

        let saved = self.repository.save(&team).await?;
        tracing::info!(id = ?saved.id(), "Team created");
        Ok(saved)
    }

    /// Applies the fields present in `patch`, leaving players untouched
    pub async fn update_team_partially(
        &self,
        id: i64,
        patch: TeamPartialUpdateRequest,
    ) -> ServiceResult<Team> {
        tracing::info!(id, ?patch, "Partially updating team");

        let mut tx = self.repository.begin().await?;
        let mut team = tx.find_by_id_for_update(id).await?.ok_or_else(|| {
            tracing::info!(id, "Team not found for partial update");
            ServiceError::TeamNotFound(id)
        })?;

        if let Some(name) = patch.name.filter(|name| !name.trim().is_empty()) {
            team.rename(name)?;
        }
        if let Some(budget) = patch.budget {
            team.change_budget(budget)?;
        }

        let updated = tx.save(&team).await?;
        tx.commit().await?;

        tracing::info!(id, "Team partially updated");
        Ok(updated)
    }

    /// Replaces every field of a team, rebuilding its player list
    ///
    /// Runs in one transaction: the current players are deleted and the
    /// deletion flushed before the requested players are inserted, so the
    /// stored list ends up exactly equal to the request's, with fresh ids.
    pub async fn update_team_fully(&self, id: i64, request: TeamRequest) -> ServiceResult<Team> {
        tracing::info!(id, ?request, "Fully updating team");

        let details = require_details(&request)?;
        let players = build_players(request.players.as_deref())?;

        let mut tx = self.repository.begin().await?;
        let mut team = tx
            .find_by_id_for_update(id)
            .await?
            .ok_or(ServiceError::TeamNotFound(id))?;

        team.replace_details(details.name, details.acronym, details.budget)?;

        let previous = team.clear_players();
        tx.delete_players(&previous).await?;
        tx.flush().await?;

        for player in players {
            team.add_player(player);
        }

        let rebuilt = tx.save(&team).await?;
        tx.commit().await?;

        tracing::info!(id, players = rebuilt.players().len(), "Team fully updated");
        Ok(rebuilt)
    }

    /// Fails with [`ServiceError::TeamNotFound`] unless the team is stored
    pub async fn ensure_team_exists(&self, id: i64) -> ServiceResult<()> {
        if self.repository.exists_by_id(id).await? {
            Ok(())
        } else {
            Err(ServiceError::TeamNotFound(id))
        }
    }

    /// Deletes a team and, by cascade, its players
    pub async fn delete_team(&self, id: i64) -> ServiceResult<()> {
        tracing::info!(id, "Deleting team");

        self.ensure_team_exists(id).await.inspect_err(|_| {
            tracing::info!(id, "Team not found for deletion");
        })?;

        self.repository.delete_by_id(id).await?;
        tracing::info!(id, "Team deleted");
        Ok(())
    }
}

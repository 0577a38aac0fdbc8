use async_trait::async_trait;
use thiserror::Error;

use crate::domain::pagination::{Page, PageRequest};
use crate::domain::team::{Player, Team, TeamSpecification};

/// Failures of the persistence gateway
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested sort property is not a sortable Team field
    #[error("No property '{0}' found for type 'Team'")]
    UnknownSortProperty(String),

    /// An update targeted a team row that does not exist
    #[error("Team not found with id {0}")]
    TeamNotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository trait for the Team aggregate
///
/// Defines the contract for persisting and retrieving teams together with
/// their players. Implementations own the mapping to storage rows and the
/// cascade rules between Team and Player.
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Find a page of teams, each with its players loaded
    async fn find_all_with_players(&self, pageable: &PageRequest) -> RepositoryResult<Page<Team>>;

    /// Find a page of teams matching a specification
    ///
    /// Players are loaded only when the specification asks for them.
    async fn find_by_filter(
        &self,
        spec: &TeamSpecification,
        pageable: &PageRequest,
    ) -> RepositoryResult<Page<Team>>;

    /// Find a team by its ID, players included
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Team>>;

    async fn exists_by_id(&self, id: i64) -> RepositoryResult<bool>;

    /// Save a team (insert or update), cascading to its players
    ///
    /// Players without an id are inserted; stored players missing from the
    /// team's list are deleted.
    async fn save(&self, team: &Team) -> RepositoryResult<Team>;

    /// Delete a team and all its players
    async fn delete_by_id(&self, id: i64) -> RepositoryResult<()>;

    /// Open a unit of work whose writes become visible only on commit
    async fn begin(&self) -> RepositoryResult<Box<dyn TeamTransaction>>;
}

/// A transactional scope over the team store
///
/// Dropping the transaction without calling [`TeamTransaction::commit`]
/// rolls back everything done through it.
#[async_trait]
pub trait TeamTransaction: Send {
    /// Load a team and lock it against concurrent writers until commit
    async fn find_by_id_for_update(&mut self, id: i64) -> RepositoryResult<Option<Team>>;

    /// Queue the given players for deletion
    async fn delete_players(&mut self, players: &[Player]) -> RepositoryResult<()>;

    /// Execute queued deletions so that later inserts see them
    async fn flush(&mut self) -> RepositoryResult<()>;

    /// Save a team within this transaction, same rules as [`TeamRepository::save`]
    async fn save(&mut self, team: &Team) -> RepositoryResult<Team>;

    /// Flush what is pending and make every write durable
    async fn commit(self: Box<Self>) -> RepositoryResult<()>;
}

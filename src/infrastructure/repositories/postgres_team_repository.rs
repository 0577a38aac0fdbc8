use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, Transaction};

use crate::domain::pagination::{Direction, Page, PageRequest, Sort};
use crate::domain::repositories::{
    RepositoryError, RepositoryResult, TeamRepository, TeamTransaction,
};
use crate::domain::team::specification::fetch_players;
use crate::domain::team::{
    Player, Position, Team, TeamCriterion, TeamSortField, TeamSpecification,
};

/// PostgreSQL implementation of TeamRepository
///
/// Teams live in `team`, players in `player` with an `ON DELETE CASCADE`
/// foreign key to their team. Filter queries are assembled with
/// [`QueryBuilder`] so only bound values reach the database.
#[derive(Clone)]
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    /// Creates a new PostgresTeamRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TeamRow {
    id: i64,
    name: String,
    acronym: String,
    budget: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct PlayerRow {
    id: i64,
    team_id: i64,
    name: String,
    position: Position,
}

/// One row of the team/player left join; player columns are NULL for a
/// team without players.
#[derive(Debug, sqlx::FromRow)]
struct TeamPlayerRow {
    team_id: i64,
    team_name: String,
    acronym: String,
    budget: Decimal,
    player_id: Option<i64>,
    player_name: Option<String>,
    position: Option<Position>,
}

impl From<TeamRow> for Team {
    fn from(row: TeamRow) -> Self {
        Team::from_persistence(row.id, row.name, row.acronym, row.budget, Vec::new())
    }
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Player::from_persistence(row.id, row.team_id, row.name, row.position)
    }
}

/// Builds the ORDER BY body for a page; ties always fall back to id
fn order_clause(sort: Option<&Sort>) -> RepositoryResult<String> {
    let Some(sort) = sort else {
        return Ok("t.id ASC".to_string());
    };

    let field = TeamSortField::from_property(&sort.property)
        .ok_or_else(|| RepositoryError::UnknownSortProperty(sort.property.clone()))?;
    let direction = match sort.direction {
        Direction::Asc => "ASC",
        Direction::Desc => "DESC",
    };

    Ok(match field {
        TeamSortField::Id => format!("t.id {direction}"),
        TeamSortField::Name => format!("t.name {direction}, t.id ASC"),
        TeamSortField::Acronym => format!("t.acronym {direction}, t.id ASC"),
        TeamSortField::Budget => format!("t.budget {direction}, t.id ASC"),
    })
}

/// Escapes LIKE metacharacters so the pattern is matched literally
fn like_pattern(pattern: &str) -> String {
    let escaped = pattern
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_criteria(builder: &mut QueryBuilder<'_, Postgres>, spec: &TeamSpecification) {
    for criterion in spec.criteria() {
        match criterion {
            TeamCriterion::NameContains(pattern) => {
                builder
                    .push(" AND LOWER(t.name) LIKE ")
                    .push_bind(like_pattern(pattern));
            }
            TeamCriterion::BudgetAtLeast(min) => {
                builder.push(" AND t.budget >= ").push_bind(*min);
            }
            TeamCriterion::Always | TeamCriterion::FetchPlayers => {}
        }
    }
}

/// Folds joined rows back into aggregates, one Team per distinct team id
fn collapse_rows(rows: Vec<TeamPlayerRow>) -> Vec<Team> {
    let mut teams: Vec<Team> = Vec::new();

    for row in rows {
        if teams.last().and_then(Team::id) != Some(row.team_id) {
            teams.push(Team::from_persistence(
                row.team_id,
                row.team_name,
                row.acronym,
                row.budget,
                Vec::new(),
            ));
        }

        if let (Some(id), Some(name), Some(position), Some(team)) = (
            row.player_id,
            row.player_name,
            row.position,
            teams.last_mut(),
        ) {
            team.add_player(Player::from_persistence(id, row.team_id, name, position));
        }
    }

    teams
}

async fn fetch_team(
    conn: &mut PgConnection,
    id: i64,
    for_update: bool,
) -> RepositoryResult<Option<Team>> {
    let sql = if for_update {
        "SELECT id, name, acronym, budget FROM team WHERE id = $1 FOR UPDATE"
    } else {
        "SELECT id, name, acronym, budget FROM team WHERE id = $1"
    };

    let row: Option<TeamRow> = sqlx::query_as(sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let players: Vec<PlayerRow> = sqlx::query_as(
        "SELECT id, team_id, name, position FROM player WHERE team_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let mut team = Team::from(row);
    for player in players {
        team.add_player(Player::from(player));
    }

    Ok(Some(team))
}

/// Inserts or updates a team row, removes orphaned players, and inserts
/// the players that have no id yet
///
/// The returned team carries the row as stored, so a budget rounded by the
/// `NUMERIC(38, 2)` column reads back the same way a later fetch does.
async fn write_team(conn: &mut PgConnection, team: &Team) -> RepositoryResult<Team> {
    let row: TeamRow = match team.id() {
        None => {
            sqlx::query_as(
                "INSERT INTO team (name, acronym, budget) VALUES ($1, $2, $3)
                 RETURNING id, name, acronym, budget",
            )
            .bind(team.name())
            .bind(team.acronym())
            .bind(team.budget())
            .fetch_one(&mut *conn)
            .await?
        }
        Some(id) => {
            let row: Option<TeamRow> = sqlx::query_as(
                "UPDATE team SET name = $2, acronym = $3, budget = $4 WHERE id = $1
                 RETURNING id, name, acronym, budget",
            )
            .bind(id)
            .bind(team.name())
            .bind(team.acronym())
            .bind(team.budget())
            .fetch_optional(&mut *conn)
            .await?;
            let row = row.ok_or(RepositoryError::TeamNotFound(id))?;

            let kept: Vec<i64> = team.players().iter().filter_map(Player::id).collect();
            sqlx::query("DELETE FROM player WHERE team_id = $1 AND NOT (id = ANY($2))")
                .bind(id)
                .bind(kept)
                .execute(&mut *conn)
                .await?;

            row
        }
    };

    let team_id = row.id;
    let mut saved = Team::from(row);

    for player in team.players() {
        let mut player = player.clone();
        if player.id().is_none() {
            let player_id: i64 = sqlx::query_scalar(
                "INSERT INTO player (name, position, team_id) VALUES ($1, $2, $3) RETURNING id",
            )
            .bind(player.name())
            .bind(player.position())
            .bind(team_id)
            .fetch_one(&mut *conn)
            .await?;

            player.assign_id(player_id);
        }
        saved.add_player(player);
    }

    Ok(saved)
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn find_all_with_players(&self, pageable: &PageRequest) -> RepositoryResult<Page<Team>> {
        self.find_by_filter(&TeamSpecification::from(fetch_players()), pageable)
            .await
    }

    async fn find_by_filter(
        &self,
        spec: &TeamSpecification,
        pageable: &PageRequest,
    ) -> RepositoryResult<Page<Team>> {
        let order = order_clause(pageable.sort.as_ref())?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM team t WHERE TRUE");
        push_criteria(&mut count, spec);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let teams = if spec.fetches_players() {
            // Page over teams first, then join, so LIMIT counts teams and not player rows
            let mut query = QueryBuilder::<Postgres>::new(
                "SELECT t.id AS team_id, t.name AS team_name, t.acronym, t.budget, \
                 p.id AS player_id, p.name AS player_name, p.position \
                 FROM (SELECT t.id, t.name, t.acronym, t.budget FROM team t WHERE TRUE",
            );
            push_criteria(&mut query, spec);
            query.push(format!(" ORDER BY {order} LIMIT "));
            query.push_bind(pageable.limit());
            query.push(" OFFSET ");
            query.push_bind(pageable.offset());
            query.push(format!(
                ") t LEFT JOIN player p ON p.team_id = t.id ORDER BY {order}, p.id ASC"
            ));

            let rows: Vec<TeamPlayerRow> = query.build_query_as().fetch_all(&self.pool).await?;
            collapse_rows(rows)
        } else {
            let mut query = QueryBuilder::<Postgres>::new(
                "SELECT t.id, t.name, t.acronym, t.budget FROM team t WHERE TRUE",
            );
            push_criteria(&mut query, spec);
            query.push(format!(" ORDER BY {order} LIMIT "));
            query.push_bind(pageable.limit());
            query.push(" OFFSET ");
            query.push_bind(pageable.offset());

            let rows: Vec<TeamRow> = query.build_query_as().fetch_all(&self.pool).await?;
            rows.into_iter().map(Team::from).collect()
        };

        Ok(Page::new(teams, pageable, u64::try_from(total).unwrap_or(0)))
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Team>> {
        let mut conn = self.pool.acquire().await?;
        fetch_team(&mut conn, id, false).await
    }

    async fn exists_by_id(&self, id: i64) -> RepositoryResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM team WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn save(&self, team: &Team) -> RepositoryResult<Team> {
        let mut tx = self.pool.begin().await?;
        let saved = write_team(&mut tx, team).await?;
        tx.commit().await?;

        Ok(saved)
    }

    async fn delete_by_id(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM team WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::TeamNotFound(id));
        }

        Ok(())
    }

    async fn begin(&self) -> RepositoryResult<Box<dyn TeamTransaction>> {
        let tx = self.pool.begin().await?;

        Ok(Box::new(PostgresTeamTransaction {
            tx,
            pending_player_deletes: Vec::new(),
        }))
    }
}

/// Unit of work over one PostgreSQL transaction
///
/// Rolled back by sqlx when dropped uncommitted, which also covers a request
/// being cancelled mid-flight.
pub struct PostgresTeamTransaction {
    tx: Transaction<'static, Postgres>,
    pending_player_deletes: Vec<i64>,
}

impl PostgresTeamTransaction {
    async fn flush_pending(&mut self) -> RepositoryResult<()> {
        if self.pending_player_deletes.is_empty() {
            return Ok(());
        }

        let ids = std::mem::take(&mut self.pending_player_deletes);
        sqlx::query("DELETE FROM player WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl TeamTransaction for PostgresTeamTransaction {
    async fn find_by_id_for_update(&mut self, id: i64) -> RepositoryResult<Option<Team>> {
        fetch_team(&mut self.tx, id, true).await
    }

    async fn delete_players(&mut self, players: &[Player]) -> RepositoryResult<()> {
        self.pending_player_deletes
            .extend(players.iter().filter_map(Player::id));
        Ok(())
    }

    async fn flush(&mut self) -> RepositoryResult<()> {
        self.flush_pending().await
    }

    async fn save(&mut self, team: &Team) -> RepositoryResult<Team> {
        write_team(&mut self.tx, team).await
    }

    async fn commit(mut self: Box<Self>) -> RepositoryResult<()> {
        self.flush_pending().await?;
        self.tx.commit().await?;
        Ok(())
    }
}

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::pagination::{Direction, Page, PageRequest, Sort};
use crate::domain::repositories::{
    RepositoryError, RepositoryResult, TeamRepository, TeamTransaction,
};
use crate::domain::team::specification::fetch_players;
use crate::domain::team::{Player, Team, TeamSortField, TeamSpecification};

/// Team store kept in process memory
///
/// Follows the same cascade and ordering rules as the PostgreSQL gateway.
/// Transactions hold the store lock until committed or dropped, so they
/// are fully serialised. Used by the test suites.
#[derive(Clone, Default)]
pub struct InMemoryTeamRepository {
    store: Arc<Mutex<Store>>,
}

impl InMemoryTeamRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default)]
struct Store {
    teams: BTreeMap<i64, Team>,
    last_team_id: i64,
    last_player_id: i64,
}

impl Store {
    fn persist(&mut self, team: &Team) -> RepositoryResult<Team> {
        let mut saved = team.clone();
        saved.round_budget_to_storage();

        match team.id() {
            Some(id) if !self.teams.contains_key(&id) => {
                return Err(RepositoryError::TeamNotFound(id));
            }
            Some(_) => {}
            None => {
                self.last_team_id += 1;
                saved.assign_id(self.last_team_id);
            }
        }

        for player in saved.players_mut() {
            if player.id().is_none() {
                self.last_player_id += 1;
                player.assign_id(self.last_player_id);
            }
        }

        if let Some(id) = saved.id() {
            self.teams.insert(id, saved.clone());
        }
        Ok(saved)
    }

    fn remove_players(&mut self, ids: &[i64]) {
        for team in self.teams.values_mut() {
            let kept: Vec<Player> = team
                .clear_players()
                .into_iter()
                .filter(|player| player.id().map_or(true, |id| !ids.contains(&id)))
                .collect();
            for player in kept {
                team.add_player(player);
            }
        }
    }
}

fn compare(a: &Team, b: &Team, sort: Option<(TeamSortField, Direction)>) -> Ordering {
    let by_id = a.id().cmp(&b.id());
    let Some((field, direction)) = sort else {
        return by_id;
    };

    let ordering = match field {
        TeamSortField::Id => a.id().cmp(&b.id()),
        TeamSortField::Name => a.name().cmp(b.name()),
        TeamSortField::Acronym => a.acronym().cmp(b.acronym()),
        TeamSortField::Budget => a.budget().cmp(&b.budget()),
    };
    let ordering = match direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    };

    ordering.then(by_id)
}

fn resolve_sort(sort: Option<&Sort>) -> RepositoryResult<Option<(TeamSortField, Direction)>> {
    sort.map(|sort| {
        TeamSortField::from_property(&sort.property)
            .map(|field| (field, sort.direction))
            .ok_or_else(|| RepositoryError::UnknownSortProperty(sort.property.clone()))
    })
    .transpose()
}

#[async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn find_all_with_players(&self, pageable: &PageRequest) -> RepositoryResult<Page<Team>> {
        let spec = TeamSpecification::from(fetch_players());
        self.find_by_filter(&spec, pageable).await
    }

    async fn find_by_filter(
        &self,
        spec: &TeamSpecification,
        pageable: &PageRequest,
    ) -> RepositoryResult<Page<Team>> {
        let sort = resolve_sort(pageable.sort.as_ref())?;
        let store = self.store.lock().await;

        let mut matching: Vec<&Team> = store
            .teams
            .values()
            .filter(|team| spec.matches(team))
            .collect();
        matching.sort_by(|a, b| compare(a, b, sort));

        let total = matching.len() as u64;
        let offset = usize::try_from(pageable.offset()).unwrap_or(usize::MAX);
        let content = matching
            .into_iter()
            .skip(offset)
            .take(pageable.size as usize)
            .map(|team| {
                let mut team = team.clone();
                if !spec.fetches_players() {
                    team.clear_players();
                }
                team
            })
            .collect();

        Ok(Page::new(content, pageable, total))
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Team>> {
        Ok(self.store.lock().await.teams.get(&id).cloned())
    }

    async fn exists_by_id(&self, id: i64) -> RepositoryResult<bool> {
        Ok(self.store.lock().await.teams.contains_key(&id))
    }

    async fn save(&self, team: &Team) -> RepositoryResult<Team> {
        self.store.lock().await.persist(team)
    }

    async fn delete_by_id(&self, id: i64) -> RepositoryResult<()> {
        self.store
            .lock()
            .await
            .teams
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::TeamNotFound(id))
    }

    async fn begin(&self) -> RepositoryResult<Box<dyn TeamTransaction>> {
        let guard = Arc::clone(&self.store).lock_owned().await;
        let working = (*guard).clone();

        Ok(Box::new(InMemoryTeamTransaction {
            guard,
            working,
            pending_player_deletes: Vec::new(),
        }))
    }
}

/// Works on a private copy of the store, written back on commit
pub struct InMemoryTeamTransaction {
    guard: OwnedMutexGuard<Store>,
    working: Store,
    pending_player_deletes: Vec<i64>,
}

#[async_trait]
impl TeamTransaction for InMemoryTeamTransaction {
    async fn find_by_id_for_update(&mut self, id: i64) -> RepositoryResult<Option<Team>> {
        Ok(self.working.teams.get(&id).cloned())
    }

    async fn delete_players(&mut self, players: &[Player]) -> RepositoryResult<()> {
        self.pending_player_deletes
            .extend(players.iter().filter_map(Player::id));
        Ok(())
    }

    async fn flush(&mut self) -> RepositoryResult<()> {
        let ids = std::mem::take(&mut self.pending_player_deletes);
        self.working.remove_players(&ids);
        Ok(())
    }

    async fn save(&mut self, team: &Team) -> RepositoryResult<Team> {
        self.working.persist(team)
    }

    async fn commit(mut self: Box<Self>) -> RepositoryResult<()> {
        self.flush().await?;
        *self.guard = std::mem::take(&mut self.working);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::team::Position;
    use rust_decimal::Decimal;

    fn team(name: &str, budget: i64) -> Team {
        Team::new(name, "ACR", Decimal::from(budget)).unwrap()
    }

    #[tokio::test]
    async fn save_assigns_ids_to_team_and_players() {
        let repo = InMemoryTeamRepository::new();
        let mut new_team = team("OM", 10);
        new_team.add_player(Player::new("Dimitri Payet", Position::Midfielder).unwrap());

        let saved = repo.save(&new_team).await.unwrap();

        assert_eq!(saved.id(), Some(1));
        assert_eq!(saved.players()[0].id(), Some(1));
        assert_eq!(saved.players()[0].team_id(), Some(1));
        assert!(repo.exists_by_id(1).await.unwrap());
    }

    #[tokio::test]
    async fn saved_budget_matches_what_is_read_back() {
        let repo = InMemoryTeamRepository::new();
        let new_team = Team::new("Nantes", "FCN", Decimal::new(1005, 3)).unwrap();

        let saved = repo.save(&new_team).await.unwrap();
        let found = repo.find_by_id(saved.id().unwrap()).await.unwrap().unwrap();

        assert_eq!(saved.budget(), Decimal::new(101, 2));
        assert_eq!(found.budget(), saved.budget());
    }

    #[tokio::test]
    async fn unknown_sort_property_is_rejected() {
        let repo = InMemoryTeamRepository::new();
        let pageable = PageRequest::sorted(0, 10, Sort::by("salary", Direction::Asc));

        let result = repo.find_all_with_players(&pageable).await;

        assert!(matches!(result, Err(RepositoryError::UnknownSortProperty(p)) if p == "salary"));
    }

    #[tokio::test]
    async fn pages_are_sorted_and_windowed() {
        let repo = InMemoryTeamRepository::new();
        for (name, budget) in [("B", 2), ("C", 3), ("A", 1)] {
            repo.save(&team(name, budget)).await.unwrap();
        }

        let pageable = PageRequest::sorted(0, 2, Sort::by("budget", Direction::Desc));
        let page = repo.find_all_with_players(&pageable).await.unwrap();

        let names: Vec<&str> = page.content.iter().map(Team::name).collect();
        assert_eq!(names, vec!["C", "B"]);
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages(), 2);
    }

    #[tokio::test]
    async fn dropped_transaction_discards_writes() {
        let repo = InMemoryTeamRepository::new();
        let saved = repo.save(&team("OL", 5)).await.unwrap();
        let id = saved.id().unwrap();

        {
            let mut tx = repo.begin().await.unwrap();
            let mut loaded = tx.find_by_id_for_update(id).await.unwrap().unwrap();
            loaded.rename("Changed").unwrap();
            tx.save(&loaded).await.unwrap();
        }

        let reloaded = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(reloaded.name(), "OL");
    }

    #[tokio::test]
    async fn flushed_player_deletions_are_committed() {
        let repo = InMemoryTeamRepository::new();
        let mut new_team = team("OL", 5);
        new_team.add_player(Player::new("Juninho", Position::Midfielder).unwrap());
        let saved = repo.save(&new_team).await.unwrap();
        let id = saved.id().unwrap();

        let mut tx = repo.begin().await.unwrap();
        let mut loaded = tx.find_by_id_for_update(id).await.unwrap().unwrap();
        let removed = loaded.clear_players();
        tx.delete_players(&removed).await.unwrap();
        tx.flush().await.unwrap();
        tx.save(&loaded).await.unwrap();
        tx.commit().await.unwrap();

        let reloaded = repo.find_by_id(id).await.unwrap().unwrap();
        assert!(reloaded.players().is_empty());
    }
}

use rust_decimal::Decimal;

use super::Team;

/// One clause of a team query
///
/// Clauses are combined with logical AND into a [`TeamSpecification`].
/// `Always` is the tautology produced when an optional filter is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamCriterion {
    Always,
    /// Lower-cased pattern the team name must contain
    NameContains(String),
    BudgetAtLeast(Decimal),
    /// Non-filtering: load each team's players and collapse join duplicates
    FetchPlayers,
}

/// Matches teams whose name contains `name`, ignoring case
///
/// An absent or blank name matches every team.
pub fn name_contains_ignore_case(name: Option<&str>) -> TeamCriterion {
    match name {
        Some(name) if !name.trim().is_empty() => TeamCriterion::NameContains(name.to_lowercase()),
        _ => TeamCriterion::Always,
    }
}

/// Matches teams whose budget is at least `min_budget` (inclusive)
pub fn budget_greater_than_or_equal_to(min_budget: Option<Decimal>) -> TeamCriterion {
    match min_budget {
        Some(min) => TeamCriterion::BudgetAtLeast(min),
        None => TeamCriterion::Always,
    }
}

/// Asks the gateway to return each team with its players
pub fn fetch_players() -> TeamCriterion {
    TeamCriterion::FetchPlayers
}

impl TeamCriterion {
    /// Starts a specification from this clause and `other`
    pub fn and(self, other: TeamCriterion) -> TeamSpecification {
        TeamSpecification::from(self).and(other)
    }

    /// Evaluates the clause against a team held in memory
    pub fn matches(&self, team: &Team) -> bool {
        match self {
            TeamCriterion::Always | TeamCriterion::FetchPlayers => true,
            TeamCriterion::NameContains(pattern) => team.name().to_lowercase().contains(pattern),
            TeamCriterion::BudgetAtLeast(min) => team.budget() >= *min,
        }
    }
}

/// Conjunction of [`TeamCriterion`] clauses
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use soccer_api::domain::team::specification::{
///     budget_greater_than_or_equal_to, fetch_players, name_contains_ignore_case,
/// };
///
/// let spec = fetch_players()
///     .and(name_contains_ignore_case(Some("OM")))
///     .and(budget_greater_than_or_equal_to(Some(Decimal::from(10))));
///
/// assert!(spec.fetches_players());
/// assert_eq!(spec.criteria().len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamSpecification {
    criteria: Vec<TeamCriterion>,
}

impl TeamSpecification {
    /// A specification matching every team, players not fetched
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, criterion: TeamCriterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    pub fn criteria(&self) -> &[TeamCriterion] {
        &self.criteria
    }

    pub fn fetches_players(&self) -> bool {
        self.criteria.contains(&TeamCriterion::FetchPlayers)
    }

    pub fn matches(&self, team: &Team) -> bool {
        self.criteria.iter().all(|criterion| criterion.matches(team))
    }
}

impl From<TeamCriterion> for TeamSpecification {
    fn from(criterion: TeamCriterion) -> Self {
        Self {
            criteria: vec![criterion],
        }
    }
}

use super::player::Player;
use crate::domain::errors::DomainError;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places a stored budget keeps (`NUMERIC(38, 2)`)
pub const BUDGET_SCALE: u32 = 2;

/// Team aggregate root
///
/// A soccer team together with the players it owns. The aggregate is the
/// consistency boundary: players are only created, replaced, and removed
/// through their team.
///
/// # Invariants
/// - Name cannot be blank
/// - Acronym cannot be blank when the team is created or fully replaced
/// - Budget cannot be negative
/// - Every player points back to this team once the team is persisted
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use soccer_api::domain::team::{Player, Position, Team};
///
/// let mut team = Team::new("Olympique de Marseille", "OM", Decimal::from(10_000_000))
///     .expect("valid team");
/// team.add_player(Player::new("Steve Mandanda", Position::Goalkeeper).unwrap());
///
/// assert_eq!(team.acronym(), "OM");
/// assert_eq!(team.players().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    id: Option<i64>,
    name: String,
    acronym: String,
    budget: Decimal,
    players: Vec<Player>,
}

impl Team {
    /// Creates a new, not yet persisted Team aggregate with no players
    ///
    /// # Errors
    /// Returns a [`DomainError`] if the name or acronym is blank or the
    /// budget is negative.
    pub fn new(
        name: impl Into<String>,
        acronym: impl Into<String>,
        budget: Decimal,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        let acronym = acronym.into();
        Self::check_details(&name, &acronym, budget)?;

        Ok(Self {
            id: None,
            name,
            acronym,
            budget,
            players: Vec::new(),
        })
    }

    fn check_details(name: &str, acronym: &str, budget: Decimal) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::BlankTeamName);
        }
        if acronym.trim().is_empty() {
            return Err(DomainError::BlankAcronym);
        }
        if budget < Decimal::ZERO {
            return Err(DomainError::NegativeBudget);
        }
        Ok(())
    }

    /// Renames the team
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::BlankTeamName);
        }
        self.name = name;
        Ok(())
    }

    /// Sets a new budget
    pub fn change_budget(&mut self, budget: Decimal) -> Result<(), DomainError> {
        if budget < Decimal::ZERO {
            return Err(DomainError::NegativeBudget);
        }
        self.budget = budget;
        Ok(())
    }

    /// Overwrites name, acronym, and budget at once
    ///
    /// Either all three values are applied or none is.
    pub fn replace_details(
        &mut self,
        name: impl Into<String>,
        acronym: impl Into<String>,
        budget: Decimal,
    ) -> Result<(), DomainError> {
        let name = name.into();
        let acronym = acronym.into();
        Self::check_details(&name, &acronym, budget)?;

        self.name = name;
        self.acronym = acronym;
        self.budget = budget;
        Ok(())
    }

    /// Appends a player and points it back to this team
    pub fn add_player(&mut self, mut player: Player) {
        player.attach_to(self.id);
        self.players.push(player);
    }

    /// Empties the player list, handing back the removed players
    pub fn clear_players(&mut self) -> Vec<Player> {
        std::mem::take(&mut self.players)
    }

    // ===== Getters =====

    /// Returns the team's ID, `None` until persisted
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn acronym(&self) -> &str {
        &self.acronym
    }

    pub fn budget(&self) -> Decimal {
        self.budget
    }

    /// Returns the players in list order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub(crate) fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    /// Rounds the budget to [`BUDGET_SCALE`] places, half away from zero,
    /// the way the budget column does on write
    pub(crate) fn round_budget_to_storage(&mut self) {
        self.budget = self
            .budget
            .round_dp_with_strategy(BUDGET_SCALE, RoundingStrategy::MidpointAwayFromZero);
    }

    /// Records the id assigned by the store and re-links every player to it
    pub(crate) fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
        for player in &mut self.players {
            player.attach_to(Some(id));
        }
    }

    /// Reconstructs a Team from persistence layer data
    ///
    /// Bypasses invariant checks; the stored data was validated when written.
    /// Only to be used by repository implementations.
    pub fn from_persistence(
        id: i64,
        name: String,
        acronym: String,
        budget: Decimal,
        players: Vec<Player>,
    ) -> Self {
        Self {
            id: Some(id),
            name,
            acronym,
            budget,
            players,
        }
    }
}

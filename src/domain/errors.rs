use thiserror::Error;

/// Invariant violations raised by the Team aggregate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Team name cannot be blank")]
    BlankTeamName,

    #[error("Team acronym cannot be blank")]
    BlankAcronym,

    #[error("Budget cannot be negative")]
    NegativeBudget,

    #[error("Player name cannot be blank")]
    BlankPlayerName,
}

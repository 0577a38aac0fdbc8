// Application services
// Orchestrate domain objects and repositories per use case

pub mod errors;
pub mod requests;
pub mod team_service;

pub use errors::{ServiceError, ServiceResult};
pub use requests::{PlayerRequest, TeamPartialUpdateRequest, TeamRequest};
pub use team_service::TeamService;

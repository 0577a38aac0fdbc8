use crate::api::errors::ApiError;
use crate::api::middleware::BasicAuth;

/// Answers every route and method that is not explicitly exposed
///
/// Anonymous callers (or bad credentials) get 401, authenticated ones 403.
pub async fn deny_all(auth: Option<BasicAuth>) -> ApiError {
    match auth {
        Some(BasicAuth(username)) => {
            tracing::info!(%username, "Denied access to unexposed route");
            ApiError::forbidden("Access Denied")
        }
        None => ApiError::unauthorized("Full authentication is required to access this resource"),
    }
}

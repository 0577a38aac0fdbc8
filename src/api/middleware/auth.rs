use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::api::errors::ApiError;
use crate::auth::credentials::parse_basic_authorization;
use crate::auth::CredentialStore;

/// HTTP Basic authentication extractor for write routes
///
/// Holds the authenticated username. Rejects with 401 and a Basic challenge.
///
/// Usage:
/// ```rust,ignore
/// async fn protected_handler(BasicAuth(username): BasicAuth) -> String {
///     format!("Hello {}", username)
/// }
/// ```
pub struct BasicAuth(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BasicAuth
where
    S: Send + Sync,
    Arc<CredentialStore>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract the authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                ApiError::unauthorized("Full authentication is required to access this resource")
            })?;

        let (username, password) = parse_basic_authorization(auth_header)
            .ok_or_else(|| ApiError::unauthorized("Invalid authorization format. Use: Basic <credentials>"))?;

        // bcrypt verification blocks; run it on the blocking pool
        let credentials = Arc::<CredentialStore>::from_ref(state);
        let user = username.clone();
        let verified = tokio::task::spawn_blocking(move || credentials.verify(&user, &password))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Credential check panicked");
                ApiError::internal_server_error()
            })?;

        if !verified {
            tracing::info!(%username, "Rejected credentials");
            return Err(ApiError::unauthorized("Bad credentials"));
        }

        Ok(BasicAuth(username))
    }
}

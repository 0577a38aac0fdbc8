use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::CredentialStore;
use crate::services::TeamService;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub teams: TeamService,
    pub credentials: Arc<CredentialStore>,
}

impl AppState {
    pub fn new(teams: TeamService, credentials: CredentialStore) -> Self {
        Self {
            teams,
            credentials: Arc::new(credentials),
        }
    }
}

impl FromRef<AppState> for Arc<CredentialStore> {
    fn from_ref(state: &AppState) -> Self {
        state.credentials.clone()
    }
}

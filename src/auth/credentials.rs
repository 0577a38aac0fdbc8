// Static credential store for HTTP Basic authentication
// Holds the write-role users configured at startup, passwords bcrypt-hashed

use std::collections::HashMap;

use base64::{prelude::BASE64_STANDARD, Engine};
use thiserror::Error;

/// bcrypt work factor used when `BCRYPT_COST` is not configured
pub const DEFAULT_HASH_COST: u32 = bcrypt::DEFAULT_COST;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error("Failed to hash password: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

/// Username to bcrypt hash map
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user, hashing the password with the given bcrypt cost
    ///
    /// Only the hash is kept. Costs outside `4..=31` fail with
    /// [`CredentialError::Hashing`].
    pub fn with_user(
        mut self,
        username: impl Into<String>,
        password: &str,
        cost: u32,
    ) -> Result<Self, CredentialError> {
        let username = username.into();
        if username.is_empty() {
            return Err(CredentialError::EmptyUsername);
        }

        let hash = bcrypt::hash(password, cost)?;
        self.users.insert(username, hash);
        Ok(self)
    }

    /// Checks a username/password pair; unknown users never verify
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|hash| bcrypt::verify(password, hash).unwrap_or(false))
    }
}

/// Splits an `Authorization: Basic <base64(user:password)>` header value
///
/// # Example
/// ```
/// use soccer_api::auth::credentials::parse_basic_authorization;
///
/// let (user, password) = parse_basic_authorization("Basic YWRtaW46czNjcjN0").unwrap();
/// assert_eq!(user, "admin");
/// assert_eq!(password, "s3cr3t");
/// ```
pub fn parse_basic_authorization(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = BASE64_STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}

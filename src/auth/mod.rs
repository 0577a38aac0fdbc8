// Authentication module
// Basic-auth credential store backed by bcrypt password hashes

pub mod credentials;

pub use credentials::{CredentialError, CredentialStore};

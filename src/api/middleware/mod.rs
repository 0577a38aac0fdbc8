pub mod auth;

pub use auth::BasicAuth;

//! Soccer Team Catalogue API Library
//!
//! This library provides the core functionality for the soccer team catalogue,
//! including domain logic, repositories, services, and the HTTP adapter.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod services;

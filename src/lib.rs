//! Keygate server library.
//!
//! This library provides the core functionality for the keygate server:
//! API key authentication, path exemptions, and the route registry.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;

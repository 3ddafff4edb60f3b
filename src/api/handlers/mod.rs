//! Route handlers.
//!
//! The JSON endpoints are documented through `utoipa`; page routes and the
//! static fallback live in [`pages`].

pub mod auth;
pub mod feedback;
pub mod health;
pub mod pages;
pub mod payload;
pub mod quiz;
pub mod scores;

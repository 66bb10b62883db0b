//! Wellness journal service: a file-backed user store for moods, meditation
//! minutes and community posts, served over a small JSON API.

pub mod app;
pub mod auth;
pub mod clock;
pub mod community;
pub mod config;
pub mod meditation;
pub mod moods;
pub mod quotes;
pub mod resources;
pub mod state;
pub mod store;

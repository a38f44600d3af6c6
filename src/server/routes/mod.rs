//! Route Handlers
//!
//! Route handlers organized by functionality.

pub mod app;
pub mod health;
pub mod update;

//! Domain layer for the SupportHub backend.
//!
//! This crate contains:
//! - Entity models (App, User Details, AI Log, Sales Comment, Dashboard)
//! - The record query descriptor and the paged query state machine
//! - Service traits (record client, notifier) and the page controller
//! - Domain error types

pub mod error;
pub mod models;
pub mod query;
pub mod services;

//! Persistence layer for the SupportHub backend.
//!
//! This crate contains:
//! - The HTTP record API client and an in-memory stand-in
//! - Entity definitions (record API row mappings)
//! - Repository implementations per table, plus the dashboard aggregator
//! - List page sources that resolve foreign keys for display

pub mod client;
pub mod entities;
pub mod memory;
pub mod metrics;
pub mod pages;
pub mod repositories;

//! Shared utilities and common types for the SupportHub backend.
//!
//! This crate provides functionality used across all other crates:
//! - Offset pagination math and the page window
//! - Record id coercion and input validation

pub mod pagination;
pub mod validation;

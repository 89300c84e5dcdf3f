//! Core infrastructure for hoist.
//!
//! This crate provides language-agnostic infrastructure:
//! - Patch IR for representing code transformations
//! - Error types and error codes
//! - JSON output types for CLI responses
//! - Layered configuration
//! - Text utilities and diff generation

pub mod config;
pub mod diff;
pub mod error;
pub mod output;
pub mod patch;
pub mod text;
pub mod types;

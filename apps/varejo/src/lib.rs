//! # Varejo Library
//!
//! This library exposes the Varejo Elite modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod access;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod repository;

// Re-export varejo_core for convenience
pub use varejo_core;

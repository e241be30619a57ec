//! # Formats Module
//!
//! Serialization of the store list.
//!
//! This module contains:
//! - The JSON backup format (export / import)
//! - The dated backup file name
//!
//! Note: File I/O remains in the app layer (apps/varejo).
//! This module only handles format conversion (pure transformations).

mod backup;

pub use backup::*;

//! # Formats Module
//!
//! Serialization and format handling for the product registry.
//!
//! This module contains:
//! - Binary snapshot format (postcard + header)
//! - The line-oriented agent feed format
//!
//! Note: File I/O stays in the storage module and the app layer.
//! This module only handles format conversion (pure transformations).

mod feed;
mod persistence;

pub use feed::*;
pub use persistence::*;

//! Configuration for the editor tools
//!
//! Provides types and parsing for `canvas.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;

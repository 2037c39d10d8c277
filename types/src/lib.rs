//! Shared types for the duckpond demo apps
//!
//! All types are exported to TypeScript via tsify.

pub mod chart;
pub mod files;
pub mod messages;
pub mod query;

pub use chart::*;
pub use files::*;
pub use messages::*;
pub use query::*;

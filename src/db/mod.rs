//! Catalog and history collaborators.
//!
//! The widget pipeline only talks to the traits in [`catalog`]. [`MemoryStore`]
//! is an in-memory implementation that can be loaded from a JSON fixture.

mod catalog;
mod models;
mod search;
mod store;

pub use catalog::*;
pub use models::*;
pub use search::*;
pub use store::*;

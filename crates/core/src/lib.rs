//! Pure domain logic for the tagged-media board query engine.
//!
//! Zero internal dependencies: parsing, metatag resolution, visibility,
//! evaluation, note rescaling, and version invariants all live here so they
//! can be used by the repository/engine layers and unit-tested without a
//! database.

pub mod config;
pub mod error;
pub mod evaluate;
pub mod notes;
pub mod post;
pub mod query;
pub mod resolve;
pub mod tags;
pub mod types;
pub mod versions;
pub mod visibility;

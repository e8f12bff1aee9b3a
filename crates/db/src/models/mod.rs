//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row and `Deserialize` DTOs for writes.

pub mod note;
pub mod post;
pub mod post_version;
pub mod saved_search;
pub mod tag;

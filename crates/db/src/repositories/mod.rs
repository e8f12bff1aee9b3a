//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or a `&mut PgConnection` inside a transaction) as the
//! first argument.

pub mod note_repo;
pub mod post_repo;
pub mod post_version_repo;
pub mod saved_search_repo;
pub mod tag_repo;

pub use note_repo::NoteRepo;
pub use post_repo::PostRepo;
pub use post_version_repo::PostVersionRepo;
pub use saved_search_repo::SavedSearchRepo;
pub use tag_repo::TagRepo;

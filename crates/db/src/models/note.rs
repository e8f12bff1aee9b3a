//! Note row struct and DTOs.

use booru_core::notes::NoteBox;
use booru_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `notes` table. Soft-deleted via `is_active`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Note {
    pub id: DbId,
    pub post_id: DbId,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub is_active: bool,
    pub body: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Note {
    /// The note's bounding box in pixel units.
    pub fn bounding_box(&self) -> NoteBox {
        NoteBox {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// DTO for creating a note.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNote {
    pub post_id: DbId,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub body: String,
}

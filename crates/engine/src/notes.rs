//! Note copying between posts.
//!
//! Copies every active note from a source post onto a destination,
//! rescaling each bounding box to the destination's pixel dimensions and
//! applying the translation-tag copy policy to the destination's tags.
//! The whole copy is one transaction holding the destination's row lock,
//! so the tag update and its version snapshot ride the same critical
//! section as any other edit.

use booru_core::error::QueryError;
use booru_core::notes::{merge_copied_tags, rescale_box, Dimensions};
use booru_core::types::DbId;
use booru_core::visibility::{can_edit, Principal};
use booru_db::models::note::CreateNote;
use booru_db::repositories::NoteRepo;
use booru_db::repositories::PostRepo;
use serde::Serialize;

use crate::error::EngineResult;
use crate::revisions::record_version;
use crate::Engine;

/// Outcome of a note copy.
#[derive(Debug, Clone, Serialize)]
pub struct NoteCopySummary {
    pub copied: usize,
    /// The destination's tag string after the copy policy was applied.
    pub dst_tag_string: String,
}

impl Engine {
    /// Copy all active notes from `src_id` onto `dst_id`.
    ///
    /// The editor must be allowed to edit the destination; the source only
    /// needs to exist. A source without active notes still applies the tag
    /// policy (translation-state tags travel with the copy request, not
    /// with individual notes).
    pub async fn copy_notes(
        &self,
        src_id: DbId,
        dst_id: DbId,
        editor: &Principal,
    ) -> EngineResult<NoteCopySummary> {
        let src = PostRepo::find_by_id(&self.pool, src_id)
            .await?
            .ok_or(QueryError::NotFound { entity: "post" })?;
        let src_notes = NoteRepo::list_active_by_post(&self.pool, src_id).await?;

        let mut tx = self.pool.begin().await?;

        let dst = PostRepo::lock_for_update(&mut tx, dst_id)
            .await?
            .ok_or(QueryError::NotFound { entity: "post" })?;
        if !can_edit(&dst.to_candidate(), editor) {
            return Err(QueryError::PermissionDenied(format!(
                "you cannot edit post {dst_id}"
            ))
            .into());
        }

        let src_dims = Dimensions { width: src.width, height: src.height };
        let dst_dims = Dimensions { width: dst.width, height: dst.height };

        for note in &src_notes {
            let scaled = rescale_box(note.bounding_box(), src_dims, dst_dims);
            NoteRepo::create(
                &mut tx,
                &CreateNote {
                    post_id: dst_id,
                    x: scaled.x,
                    y: scaled.y,
                    width: scaled.width,
                    height: scaled.height,
                    body: note.body.clone(),
                },
            )
            .await?;
        }

        let merged = merge_copied_tags(&src.tags, &dst.tags, dst_dims);
        if merged != dst.tags {
            PostRepo::update_tags(&mut tx, dst_id, &merged).await?;
            record_version(&mut tx, dst_id, &merged, editor.id).await?;
        }
        if !src_notes.is_empty() {
            PostRepo::set_has_embedded_notes(&mut tx, dst_id, true).await?;
        }

        tx.commit().await?;
        tracing::debug!(
            src_id,
            dst_id,
            copied = src_notes.len(),
            "Notes copied"
        );

        Ok(NoteCopySummary {
            copied: src_notes.len(),
            dst_tag_string: merged.join(" "),
        })
    }

    /// Soft-delete a note. The editor must be allowed to edit the note's
    /// post.
    pub async fn remove_note(&self, note_id: DbId, editor: &Principal) -> EngineResult<()> {
        let note = NoteRepo::find_by_id(&self.pool, note_id)
            .await?
            .ok_or(QueryError::NotFound { entity: "note" })?;

        let post = PostRepo::find_by_id(&self.pool, note.post_id)
            .await?
            .ok_or(QueryError::NotFound { entity: "post" })?;
        if !can_edit(&post.to_candidate(), editor) {
            return Err(QueryError::PermissionDenied(format!(
                "you cannot edit post {}",
                note.post_id
            ))
            .into());
        }

        NoteRepo::deactivate(&self.pool, note_id).await?;
        Ok(())
    }
}

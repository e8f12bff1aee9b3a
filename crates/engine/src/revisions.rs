//! Versioned tag edits: the single write path for a post's tag string.
//!
//! Every mutation — direct edit, revert, mark-as-translated, note copy —
//! funnels through [`Engine::apply_tag_edit`]'s transaction: lock the
//! post's row, recompute the tag list against the locked state, and append
//! a version snapshot with the next contiguous sequence number. The row
//! lock is what serializes concurrent editors of one post; edits to
//! different posts never contend.

use booru_core::error::QueryError;
use booru_core::notes::{mark_translated_tags, TranslationFlags};
use booru_core::tags::{join_tag_string, normalize_tag_string};
use booru_core::types::DbId;
use booru_core::versions::{next_sequence, validate_revert_target, verify_contiguous};
use booru_core::visibility::{can_edit, Principal};
use booru_db::models::post_version::PostVersion;
use booru_db::repositories::PostRepo;
use booru_db::repositories::PostVersionRepo;
use booru_db::repositories::TagRepo;
use sqlx::PgConnection;

use crate::error::EngineResult;
use crate::Engine;

impl Engine {
    /// Replace a post's tag string. Returns the appended version, or
    /// `None` when the normalized tags are unchanged (no-op edits do not
    /// pollute history).
    pub async fn edit_tags(
        &self,
        post_id: DbId,
        tag_string: &str,
        editor: &Principal,
    ) -> EngineResult<Option<PostVersion>> {
        let tags = normalize_tag_string(tag_string);
        self.apply_tag_edit(post_id, editor, |_| tags).await
    }

    /// Revert a post's tags to a prior version of the same post.
    ///
    /// A version id belonging to a different post is [`QueryError::NotFound`],
    /// not a cross-post write.
    pub async fn revert(
        &self,
        post_id: DbId,
        version_id: DbId,
        editor: &Principal,
    ) -> EngineResult<Option<PostVersion>> {
        let version = PostVersionRepo::find_by_id(&self.pool, version_id)
            .await?
            .ok_or(QueryError::NotFound { entity: "post version" })?;
        validate_revert_target(post_id, version.post_id)?;

        let tags = normalize_tag_string(&version.tag_string);
        self.apply_tag_edit(post_id, editor, |_| tags).await
    }

    /// Apply the translation-tag policy to a post, through the normal edit
    /// path so a version is appended.
    pub async fn mark_as_translated(
        &self,
        post_id: DbId,
        flags: TranslationFlags,
        editor: &Principal,
    ) -> EngineResult<Option<PostVersion>> {
        self.apply_tag_edit(post_id, editor, |tags| mark_translated_tags(tags, flags))
            .await
    }

    /// A post's full edit history, oldest first.
    pub async fn versions(&self, post_id: DbId) -> EngineResult<Vec<PostVersion>> {
        PostRepo::find_by_id(&self.pool, post_id)
            .await?
            .ok_or(QueryError::NotFound { entity: "post" })?;
        Ok(PostVersionRepo::list_by_post(&self.pool, post_id).await?)
    }

    /// The tag-edit critical section.
    ///
    /// `edit` computes the new tag list from the post's tags as read under
    /// the row lock, so edits composed against stale reads cannot clobber a
    /// concurrent writer. The permission check also runs against the locked
    /// row: a post banned mid-flight is still protected.
    pub(crate) async fn apply_tag_edit<F>(
        &self,
        post_id: DbId,
        editor: &Principal,
        edit: F,
    ) -> EngineResult<Option<PostVersion>>
    where
        F: FnOnce(&[String]) -> Vec<String>,
    {
        let mut tx = self.pool.begin().await?;

        let post = PostRepo::lock_for_update(&mut tx, post_id)
            .await?
            .ok_or(QueryError::NotFound { entity: "post" })?;

        if !can_edit(&post.to_candidate(), editor) {
            return Err(QueryError::PermissionDenied(format!(
                "you cannot edit post {post_id}"
            ))
            .into());
        }

        let new_tags = edit(&post.tags);
        if new_tags == post.tags {
            tx.commit().await?;
            return Ok(None);
        }

        TagRepo::ensure_all(&mut tx, &new_tags).await?;
        PostRepo::update_tags(&mut tx, post_id, &new_tags).await?;
        let version = record_version(&mut tx, post_id, &new_tags, editor.id).await?;

        tx.commit().await?;
        tracing::debug!(
            post_id,
            sequence = version.sequence,
            updater_id = editor.id,
            "Tag edit recorded"
        );
        Ok(Some(version))
    }
}

/// Append a version snapshot under the caller's transaction, which must
/// already hold the post's row lock. Verifies the existing sequence is
/// contiguous before extending it.
pub(crate) async fn record_version(
    conn: &mut PgConnection,
    post_id: DbId,
    tags: &[String],
    updater_id: Option<DbId>,
) -> EngineResult<PostVersion> {
    let sequences = PostVersionRepo::sequences(conn, post_id).await?;
    verify_contiguous(post_id, &sequences)?;

    let next = next_sequence(sequences.last().copied().unwrap_or(0));
    let version =
        PostVersionRepo::create(conn, post_id, next, &join_tag_string(tags), updater_id).await?;
    Ok(version)
}

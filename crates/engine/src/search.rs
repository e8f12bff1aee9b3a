//! Search orchestration: parse, resolve, fetch, evaluate.
//!
//! One pipeline serves every read surface. The listing page, the feed, and
//! single-post lookups all pass through the same resolution steps and the
//! same visibility predicate, so a post hidden from one surface is hidden
//! from all of them.

use std::collections::HashMap;

use booru_core::error::QueryError;
use booru_core::evaluate::{self, Page, PageCursor};
use booru_core::post::PostCandidate;
use booru_core::query::{self, Order, StatusFilter};
use booru_core::resolve::{self, ResolvedQuery, SavedSearchEntry};
use booru_core::tags::{normalize_tag, wildcard_to_like, TagCategory};
use booru_core::types::{DbId, Timestamp};
use booru_core::visibility::{visible, Principal};
use booru_db::models::post::Post;
use booru_db::models::tag::{CreateTag, Tag};
use booru_db::repositories::PostRepo;
use booru_db::repositories::SavedSearchRepo;
use booru_db::repositories::TagRepo;
use serde::Serialize;

use crate::error::EngineResult;
use crate::Engine;

// ---------------------------------------------------------------------------
// Read surfaces
// ---------------------------------------------------------------------------

/// Which read surface a search serves. All three share the resolution
/// pipeline and the visibility predicate; they differ only in shape:
///
/// - `Listing` returns the requested page as-is.
/// - `Feed` forces recency order so the feed stays append-only for
///   subscribers, ignoring `order:random`.
/// - `Single` truncates to the top match and treats an empty result as
///   [`QueryError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchFormat {
    #[default]
    Listing,
    Feed,
    Single,
}

/// Direction for sequential post navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqDirection {
    /// Toward newer posts (higher ids).
    Prev,
    /// Toward older posts (lower ids).
    Next,
}

/// A post as surfaced to callers. For a post the principal may not view,
/// identifying attributes are redacted: the row still resolves by id, but
/// the checksum and tags are withheld.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: DbId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    pub width: i32,
    pub height: i32,
    pub tag_string: String,
    pub is_deleted: bool,
    pub is_banned: bool,
    pub has_embedded_notes: bool,
    pub created_at: Timestamp,
}

impl PostView {
    fn full(post: &Post) -> Self {
        Self {
            id: post.id,
            md5: Some(post.md5.clone()),
            width: post.width,
            height: post.height,
            tag_string: post.tag_string(),
            is_deleted: post.is_deleted,
            is_banned: post.is_banned,
            has_embedded_notes: post.has_embedded_notes,
            created_at: post.created_at,
        }
    }

    fn redacted(post: &Post) -> Self {
        Self {
            id: post.id,
            md5: None,
            width: post.width,
            height: post.height,
            tag_string: String::new(),
            is_deleted: post.is_deleted,
            is_banned: post.is_banned,
            has_embedded_notes: post.has_embedded_notes,
            created_at: post.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine read operations
// ---------------------------------------------------------------------------

impl Engine {
    /// Run a tag search and return one page of post ids.
    ///
    /// `md5:` queries short-circuit to a checksum lookup: a visible hit is
    /// a single-element page, a miss (or an invisible hit) is
    /// [`QueryError::NotFound`]. Everything else resolves saved searches
    /// and wildcards, fetches candidates with the heaviest filters pushed
    /// down to storage, and paginates in the core evaluator.
    pub async fn search(
        &self,
        query_str: &str,
        principal: &Principal,
        cursor: PageCursor,
        format: SearchFormat,
    ) -> EngineResult<Page> {
        let parsed = query::parse(query_str, &self.config)?;
        let page = evaluate::validate_page(cursor, &self.config)?;

        if let Some(md5) = &parsed.md5 {
            return self.md5_page(md5, principal, page).await;
        }

        let mut resolved = self.resolve(&parsed, principal).await?;
        if format == SearchFormat::Feed {
            resolved.order = Order::RecencyDesc;
        }

        let candidates = self.fetch_candidates(&resolved).await?;
        let seed = cursor.seed.unwrap_or_else(rand::random);
        let mut result = evaluate::evaluate(
            &resolved,
            principal,
            PageCursor { page, seed: Some(seed) },
            seed,
            &self.config,
            &candidates,
        )?;

        if format == SearchFormat::Single {
            result.ids.truncate(1);
            if result.ids.is_empty() {
                return Err(QueryError::NotFound { entity: "post" }.into());
            }
        }

        tracing::debug!(
            query = query_str,
            page = result.page,
            total = result.total,
            returned = result.ids.len(),
            "Search evaluated"
        );
        Ok(result)
    }

    /// Look a post up by its MD5 checksum, honoring visibility.
    pub async fn find_by_md5(&self, md5: &str, principal: &Principal) -> EngineResult<DbId> {
        let page = self.md5_page(md5, principal, 1).await?;
        page.ids
            .first()
            .copied()
            .ok_or_else(|| QueryError::NotFound { entity: "post" }.into())
    }

    /// One post chosen uniformly among the query's visible matches.
    ///
    /// An empty match set is [`QueryError::NotFound`], unlike the listing
    /// path where it is a successful empty page.
    pub async fn random_post(&self, query_str: &str, principal: &Principal) -> EngineResult<DbId> {
        let parsed = query::parse(query_str, &self.config)?;
        let mut resolved = self.resolve(&parsed, principal).await?;
        resolved.order = Order::Random;

        let candidates = self.fetch_candidates(&resolved).await?;
        let mut config = self.config.clone();
        config.page_size = 1;
        let page = evaluate::evaluate(
            &resolved,
            principal,
            PageCursor::first(),
            rand::random(),
            &config,
            &candidates,
        )?;

        page.ids
            .first()
            .copied()
            .ok_or_else(|| QueryError::NotFound { entity: "post" }.into())
    }

    /// The adjacent visible post by id order, or the post itself when it
    /// sits at the boundary.
    pub async fn show_seq(
        &self,
        post_id: DbId,
        direction: SeqDirection,
        principal: &Principal,
    ) -> EngineResult<DbId> {
        PostRepo::find_by_id(&self.pool, post_id)
            .await?
            .ok_or(QueryError::NotFound { entity: "post" })?;

        let ascending = direction == SeqDirection::Prev;
        let window = PostRepo::adjacent(
            &self.pool,
            post_id,
            ascending,
            i64::from(self.config.page_size.max(1)),
        )
        .await?;

        let found = window
            .iter()
            .map(Post::to_candidate)
            .find(|c| visible(c, principal, StatusFilter::Hidden, &self.config.restricted_tags))
            .map(|c| c.id);
        Ok(found.unwrap_or(post_id))
    }

    /// Resolve a post by id into a caller-facing view.
    ///
    /// A post the principal may not view still resolves, but comes back
    /// redacted rather than erroring; only a genuinely absent id is
    /// [`QueryError::NotFound`].
    pub async fn find_post(&self, post_id: DbId, principal: &Principal) -> EngineResult<PostView> {
        let post = PostRepo::find_by_id(&self.pool, post_id)
            .await?
            .ok_or(QueryError::NotFound { entity: "post" })?;

        let candidate = post.to_candidate();
        if visible(&candidate, principal, StatusFilter::Any, &self.config.restricted_tags) {
            Ok(PostView::full(&post))
        } else {
            Ok(PostView::redacted(&post))
        }
    }

    /// Register a tag with an explicit category. Tags are otherwise created
    /// on first use with the default category; this is the curation path.
    pub async fn create_tag(
        &self,
        input: &CreateTag,
        principal: &Principal,
    ) -> EngineResult<Tag> {
        if !principal.is_verified {
            return Err(
                QueryError::PermissionDenied("tag curation requires a verified account".into())
                    .into(),
            );
        }
        let category = match &input.category {
            Some(s) => TagCategory::parse(s)?,
            None => TagCategory::default(),
        };
        Ok(TagRepo::create_or_get(&self.pool, &normalize_tag(&input.name), category).await?)
    }

    /// Recount every tag's `post_count` from the live posts that carry it.
    /// Bulk maintenance, never part of a read path.
    pub async fn recount_tags(&self) -> EngineResult<u64> {
        let updated = TagRepo::recount_post_counts(&self.pool).await?;
        tracing::info!(updated, "Tag post counts recounted");
        Ok(updated)
    }

    // -- pipeline pieces ------------------------------------------------------

    /// Expand saved searches and materialize wildcards against the tag
    /// catalogue. Saved searches belong to the principal; an anonymous
    /// request expands `search:` against an empty set.
    async fn resolve(
        &self,
        parsed: &query::ParsedQuery,
        principal: &Principal,
    ) -> EngineResult<ResolvedQuery> {
        let saved: Vec<SavedSearchEntry> = match (parsed.has_saved_searches(), principal.id) {
            (true, Some(owner_id)) => SavedSearchRepo::list_by_owner(&self.pool, owner_id)
                .await?
                .into_iter()
                .map(|s| SavedSearchEntry {
                    label: s.label,
                    query: s.query,
                })
                .collect(),
            _ => Vec::new(),
        };

        let expansion = resolve::expand(parsed, &saved, &self.config)?;

        let mut matches = HashMap::new();
        for pattern in &expansion.patterns {
            // One extra row lets the resolver distinguish "at the cap"
            // from "over the cap".
            let names = TagRepo::find_matching(
                &self.pool,
                &wildcard_to_like(pattern),
                self.config.max_wildcard_matches as i64 + 1,
            )
            .await?;
            matches.insert(pattern.clone(), names);
        }

        Ok(resolve::materialize(expansion, &matches, &self.config)?)
    }

    /// Fetch candidates with what storage can index: required tags when
    /// the query is a single clause, and the deletion-state filter.
    async fn fetch_candidates(
        &self,
        resolved: &ResolvedQuery,
    ) -> EngineResult<Vec<PostCandidate>> {
        let required: &[String] = match resolved.clauses.as_slice() {
            [only] => &only.required,
            _ => &[],
        };
        let deleted = match resolved.status {
            StatusFilter::Hidden => Some(false),
            StatusFilter::Deleted => Some(true),
            StatusFilter::Any => None,
        };

        let posts = PostRepo::fetch_candidates(&self.pool, required, deleted).await?;
        Ok(posts.iter().map(Post::to_candidate).collect())
    }

    /// The md5 short-circuit: a checksum names at most one post, so the
    /// page is synthesized directly.
    async fn md5_page(&self, md5: &str, principal: &Principal, page: u32) -> EngineResult<Page> {
        let post = PostRepo::find_by_md5(&self.pool, md5)
            .await?
            .ok_or(QueryError::NotFound { entity: "post" })?;

        let candidate = post.to_candidate();
        if !visible(&candidate, principal, StatusFilter::Any, &self.config.restricted_tags) {
            return Err(QueryError::NotFound { entity: "post" }.into());
        }

        Ok(Page {
            ids: vec![post.id],
            page,
            per_page: self.config.page_size,
            total: 1,
            seed: None,
        })
    }
}

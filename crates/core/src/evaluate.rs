//! Query evaluation: predicate combination, ordering, pagination.
//!
//! The evaluator is pure. It receives materialized predicates
//! ([`ResolvedQuery`]), the requesting principal, a page cursor, and a
//! candidate slice, and produces an ordered page of post ids. Page bounds
//! are validated before any candidate work, so an over-deep request is
//! rejected rather than scanned.

use std::collections::BinaryHeap;

use crate::config::SearchConfig;
use crate::error::{QueryError, QueryResult};
use crate::post::PostCandidate;
use crate::query::Order;
use crate::resolve::{Conjunct, ResolvedQuery};
use crate::types::DbId;
use crate::visibility::{visible, Principal};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Cursor and page types
// ---------------------------------------------------------------------------

/// Requested page, 1-based. Page 0 is treated as page 1.
///
/// For `order:random`, the seed makes the ordering stable across repeated
/// requests within one page render; callers that omit it get a fresh one
/// from the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageCursor {
    pub page: u32,
    pub seed: Option<u64>,
}

impl PageCursor {
    pub fn first() -> Self {
        Self { page: 1, seed: None }
    }

    pub fn page(page: u32) -> Self {
        Self { page, seed: None }
    }
}

/// One ordered page of post ids plus pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub ids: Vec<DbId>,
    pub page: u32,
    pub per_page: u32,
    /// Total number of matching posts across all pages.
    pub total: usize,
    /// For random ordering, the seed that produced this page; pass it back
    /// in the next cursor to keep paging through the same shuffle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

// ---------------------------------------------------------------------------
// Predicate combination
// ---------------------------------------------------------------------------

/// Whether a post satisfies one conjunctive clause: every required tag,
/// no excluded tag, and at least one tag from every optional group. An
/// empty optional group is unsatisfiable.
fn clause_matches(clause: &Conjunct, post: &PostCandidate) -> bool {
    clause.required.iter().all(|t| post.has_tag(t))
        && !clause.excluded.iter().any(|t| post.has_tag(t))
        && clause
            .optional_groups
            .iter()
            .all(|group| group.iter().any(|t| post.has_tag(t)))
}

/// Whether a post satisfies the resolved query (any clause).
pub fn query_matches(resolved: &ResolvedQuery, post: &PostCandidate) -> bool {
    resolved.clauses.iter().any(|c| clause_matches(c, post))
}

// ---------------------------------------------------------------------------
// Random ordering
// ---------------------------------------------------------------------------

/// splitmix64 finalizer.
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Deterministic pseudo-random sort key for a candidate under a seed.
///
/// The same (seed, id) pair always yields the same key, so a page render
/// that reuses its seed sees a stable order; unrelated requests with fresh
/// seeds do not.
pub fn random_key(seed: u64, id: DbId) -> u64 {
    mix(seed ^ mix(id as u64))
}

/// Select the ids ranked [`skip`, `skip + take`) under seeded random order
/// without materializing and sorting the full candidate set: a bounded
/// max-heap keeps only the `skip + take` smallest keys, so memory stays
/// proportional to page depth, not corpus size.
fn random_ranked<I>(ids: I, seed: u64, skip: usize, take: usize) -> Vec<DbId>
where
    I: IntoIterator<Item = DbId>,
{
    let keep = skip + take;
    if keep == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<(u64, DbId)> = BinaryHeap::with_capacity(keep + 1);
    for id in ids {
        let key = random_key(seed, id);
        if heap.len() < keep {
            heap.push((key, id));
        } else if let Some(&(worst, _)) = heap.peek() {
            if key < worst {
                heap.pop();
                heap.push((key, id));
            }
        }
    }

    let mut ranked: Vec<(u64, DbId)> = heap.into_vec();
    ranked.sort_unstable();
    ranked.into_iter().skip(skip).map(|(_, id)| id).collect()
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Reject page numbers beyond the configured maximum before any work.
pub fn validate_page(cursor: PageCursor, config: &SearchConfig) -> QueryResult<u32> {
    let page = cursor.page.max(1);
    if page > config.max_page {
        return Err(QueryError::PageLimitExceeded {
            page,
            max: config.max_page,
        });
    }
    Ok(page)
}

/// Evaluate a resolved query over a candidate slice.
///
/// Candidates are filtered through the combined predicate and the
/// visibility rules, ordered per the query's directive, and paginated.
/// An empty result is a successful empty page, never an error; single-post
/// semantics (`md5:`, random post) live at the engine boundary.
pub fn evaluate(
    resolved: &ResolvedQuery,
    principal: &Principal,
    cursor: PageCursor,
    seed: u64,
    config: &SearchConfig,
    candidates: &[PostCandidate],
) -> QueryResult<Page> {
    let page = validate_page(cursor, config)?;
    let per_page = config.page_size.max(1);
    let skip = (page as usize - 1) * per_page as usize;
    let take = per_page as usize;

    let matching: Vec<&PostCandidate> = candidates
        .iter()
        .filter(|post| query_matches(resolved, post))
        .filter(|post| visible(post, principal, resolved.status, &config.restricted_tags))
        .collect();
    let total = matching.len();

    let ids = match resolved.order {
        Order::RecencyDesc => {
            let mut ordered = matching;
            ordered.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.cmp(&a.id))
            });
            ordered
                .into_iter()
                .skip(skip)
                .take(take)
                .map(|p| p.id)
                .collect()
        }
        Order::Random => random_ranked(matching.into_iter().map(|p| p.id), seed, skip, take),
    };

    Ok(Page {
        ids,
        page,
        per_page,
        total,
        seed: matches!(resolved.order, Order::Random).then_some(seed),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{self, StatusFilter};
    use crate::resolve::resolve_simple;
    use crate::visibility::Role;
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    fn cfg() -> SearchConfig {
        SearchConfig::default()
    }

    fn resolved(q: &str) -> ResolvedQuery {
        resolve_simple(&query::parse(q, &cfg()).unwrap(), &cfg()).unwrap()
    }

    fn candidate(id: DbId, tags: &[&str]) -> PostCandidate {
        PostCandidate {
            id,
            md5: format!("{id:032x}"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            is_deleted: false,
            is_banned: false,
            created_at: Utc::now() + Duration::seconds(id),
        }
    }

    fn member() -> Principal {
        Principal::with_role(1, Role::Member)
    }

    // -- predicate ----------------------------------------------------------

    #[test]
    fn required_and_excluded_combine() {
        let q = resolved("solo -comic");
        assert!(query_matches(&q, &candidate(1, &["solo", "1girl"])));
        assert!(!query_matches(&q, &candidate(2, &["solo", "comic"])));
        assert!(!query_matches(&q, &candidate(3, &["1girl"])));
    }

    #[test]
    fn optional_group_needs_one_member() {
        let q = resolved("~cat ~dog");
        assert!(query_matches(&q, &candidate(1, &["cat"])));
        assert!(query_matches(&q, &candidate(2, &["dog", "park"])));
        assert!(!query_matches(&q, &candidate(3, &["bird"])));
    }

    #[test]
    fn empty_query_matches_everything() {
        let q = resolved("");
        assert!(query_matches(&q, &candidate(1, &["anything"])));
    }

    // -- ordering & pagination ----------------------------------------------

    #[test]
    fn default_order_is_newest_first() {
        let posts = vec![candidate(1, &["a"]), candidate(3, &["a"]), candidate(2, &["a"])];
        let page = evaluate(
            &resolved("a"),
            &member(),
            PageCursor::first(),
            0,
            &cfg(),
            &posts,
        )
        .unwrap();
        assert_eq!(page.ids, vec![3, 2, 1]);
        assert_eq!(page.total, 3);
        assert_eq!(page.seed, None);
    }

    #[test]
    fn pagination_slices_in_order() {
        let posts: Vec<_> = (1..=5).map(|id| candidate(id, &["a"])).collect();
        let mut config = cfg();
        config.page_size = 2;

        let p1 = evaluate(&resolved("a"), &member(), PageCursor::page(1), 0, &config, &posts).unwrap();
        let p2 = evaluate(&resolved("a"), &member(), PageCursor::page(2), 0, &config, &posts).unwrap();
        let p3 = evaluate(&resolved("a"), &member(), PageCursor::page(3), 0, &config, &posts).unwrap();
        assert_eq!(p1.ids, vec![5, 4]);
        assert_eq!(p2.ids, vec![3, 2]);
        assert_eq!(p3.ids, vec![1]);
    }

    #[test]
    fn page_beyond_limit_fails_before_scanning() {
        // Empty corpus: the limit must still fire.
        assert_matches!(
            evaluate(&resolved(""), &member(), PageCursor::page(1001), 0, &cfg(), &[]),
            Err(QueryError::PageLimitExceeded { page: 1001, max: 1000 })
        );
    }

    #[test]
    fn empty_result_is_a_successful_empty_page() {
        let page = evaluate(
            &resolved("does_not_exist"),
            &member(),
            PageCursor::first(),
            0,
            &cfg(),
            &[candidate(1, &["solo"])],
        )
        .unwrap();
        assert!(page.ids.is_empty());
        assert_eq!(page.total, 0);
    }

    // -- visibility integration ------------------------------------------------

    #[test]
    fn deleted_posts_hidden_unless_status_deleted() {
        let mut deleted = candidate(1, &["aaaa"]);
        deleted.is_deleted = true;
        let live = candidate(2, &["aaaa"]);
        let posts = vec![deleted, live];

        let default_page =
            evaluate(&resolved("aaaa"), &member(), PageCursor::first(), 0, &cfg(), &posts).unwrap();
        assert_eq!(default_page.ids, vec![2]);

        let q = resolved("aaaa status:deleted");
        assert_eq!(q.status, StatusFilter::Deleted);
        let deleted_page =
            evaluate(&q, &member(), PageCursor::first(), 0, &cfg(), &posts).unwrap();
        assert_eq!(deleted_page.ids, vec![1]);
    }

    #[test]
    fn restricted_posts_gated_by_permission() {
        let posts = vec![candidate(1, &["tagme"]), candidate(2, &["solo"])];
        let config = SearchConfig::with_restricted_tags(["tagme"]);

        let anon_page = evaluate(
            &resolved(""),
            &Principal::anonymous(),
            PageCursor::first(),
            0,
            &config,
            &posts,
        )
        .unwrap();
        assert_eq!(anon_page.ids, vec![2]);

        let gold_page = evaluate(
            &resolved(""),
            &Principal::with_role(9, Role::Gold),
            PageCursor::first(),
            0,
            &config,
            &posts,
        )
        .unwrap();
        assert_eq!(gold_page.ids, vec![2, 1]);
    }

    // -- random ordering ----------------------------------------------------------

    #[test]
    fn random_order_is_stable_for_a_seed() {
        let posts: Vec<_> = (1..=20).map(|id| candidate(id, &["a"])).collect();
        let q = resolved("a order:random");

        let first = evaluate(&q, &member(), PageCursor::first(), 42, &cfg(), &posts).unwrap();
        let second = evaluate(&q, &member(), PageCursor::first(), 42, &cfg(), &posts).unwrap();
        assert_eq!(first.ids, second.ids);
        // The seed is echoed so callers can keep paging the same shuffle.
        assert_eq!(first.seed, Some(42));
    }

    #[test]
    fn different_seeds_give_different_orders() {
        let posts: Vec<_> = (1..=50).map(|id| candidate(id, &["a"])).collect();
        let q = resolved("a order:random");

        let a = evaluate(&q, &member(), PageCursor::first(), 1, &cfg(), &posts).unwrap();
        let b = evaluate(&q, &member(), PageCursor::first(), 2, &cfg(), &posts).unwrap();
        assert_ne!(a.ids, b.ids);
    }

    #[test]
    fn random_pages_partition_the_result_set() {
        let posts: Vec<_> = (1..=30).map(|id| candidate(id, &["a"])).collect();
        let q = resolved("a order:random");
        let mut config = cfg();
        config.page_size = 10;

        let mut seen = Vec::new();
        for page in 1..=3 {
            let p = evaluate(&q, &member(), PageCursor::page(page), 7, &config, &posts).unwrap();
            assert_eq!(p.ids.len(), 10);
            seen.extend(p.ids);
        }
        seen.sort_unstable();
        assert_eq!(seen, (1..=30).collect::<Vec<_>>());
    }
}

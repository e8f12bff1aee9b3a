//! Principal roles and the post-visibility filter.
//!
//! Roles form an ordered capability ladder; permission checks are explicit
//! predicates on that ladder rather than behavioral overriding. The
//! restricted-content permission (Gold and above) is deliberately distinct
//! from the moderation permission (Moderator and above).

use std::collections::HashSet;

use crate::post::PostCandidate;
use crate::query::StatusFilter;
use crate::types::DbId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Roles and principals
// ---------------------------------------------------------------------------

/// Role ladder, lowest to highest. Ordering is meaningful:
/// `role >= Role::Moderator` is the moderation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Anonymous,
    Member,
    Gold,
    Builder,
    Moderator,
    Admin,
}

/// The actor issuing a request. Authentication happens in the web layer;
/// the engine receives an already-resolved principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Option<DbId>,
    pub role: Role,
    pub is_verified: bool,
}

impl Principal {
    /// An unauthenticated visitor.
    pub fn anonymous() -> Self {
        Self {
            id: None,
            role: Role::Anonymous,
            is_verified: false,
        }
    }

    /// A verified principal with the given id and role.
    pub fn with_role(id: DbId, role: Role) -> Self {
        Self {
            id: Some(id),
            role,
            is_verified: true,
        }
    }

    /// Restricted-tag-gated content needs this explicit permission,
    /// independent of moderation rank.
    pub fn can_view_restricted(&self) -> bool {
        self.role >= Role::Gold
    }

    /// Banned posts are visible to moderation ranks only.
    pub fn can_view_banned(&self) -> bool {
        self.role >= Role::Moderator
    }
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

/// Decide whether `post` is visible to `principal` under the query's
/// deletion-state filter.
///
/// Deterministic, and applied identically on the listing, feed, and
/// single-fetch paths:
///
/// 1. Deleted posts are visible only when the query opted in via
///    `status:deleted` or `status:any` — never ambiently, for any role.
/// 2. Banned posts are visible to moderation ranks only.
/// 3. A post carrying any restricted tag is visible only with the
///    restricted-content permission.
pub fn visible(
    post: &PostCandidate,
    principal: &Principal,
    status: StatusFilter,
    restricted_tags: &HashSet<String>,
) -> bool {
    match status {
        StatusFilter::Hidden if post.is_deleted => return false,
        StatusFilter::Deleted if !post.is_deleted => return false,
        _ => {}
    }

    if post.is_banned && !principal.can_view_banned() {
        return false;
    }

    if !restricted_tags.is_empty()
        && !principal.can_view_restricted()
        && post.tags.iter().any(|t| restricted_tags.contains(t))
    {
        return false;
    }

    true
}

/// Decide whether `principal` may edit `post`'s tags.
///
/// The web layer authenticates; this enforces the two write rules the
/// engine owns: banned posts are writable by moderation ranks only, and
/// unverified principals may not write at all.
pub fn can_edit(post: &PostCandidate, principal: &Principal) -> bool {
    if post.is_banned && principal.role < Role::Moderator {
        return false;
    }
    principal.is_verified
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

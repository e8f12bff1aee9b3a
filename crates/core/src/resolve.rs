//! Metatag resolution.
//!
//! Expands the dynamic parts of a [`ParsedQuery`] — saved-search references
//! and wildcard patterns — into a finite, materialized predicate set
//! ([`ResolvedQuery`]). Resolution is an explicit two-phase step:
//!
//! 1. [`expand`] flattens saved-search references into union clauses using
//!    the principal's saved searches (already fetched by the caller), with
//!    bounded recursion and cycle detection, and reports every wildcard
//!    pattern the query mentions.
//! 2. The caller looks each pattern up against the tag catalogue, then
//!    [`materialize`] substitutes the match lists as OR groups, enforcing
//!    the wildcard expansion cap.
//!
//! Keeping both phases pure means every complexity limit is enforced at a
//! single checkpoint, and nothing here touches storage.

use std::collections::{HashMap, HashSet};

use crate::config::SearchConfig;
use crate::error::{QueryError, QueryResult};
use crate::query::{self, Order, ParsedQuery, SavedSearchRef, StatusFilter};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// One saved search owned by the requesting principal.
#[derive(Debug, Clone)]
pub struct SavedSearchEntry {
    pub label: String,
    pub query: String,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One conjunctive clause of the final predicate.
///
/// A post matches a clause when it carries every `required` tag, none of
/// the `excluded` tags, and at least one tag from every optional group.
/// An empty optional group is unsatisfiable (a wildcard that matched no
/// tags is a valid, simply empty, filter).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conjunct {
    pub required: Vec<String>,
    pub excluded: Vec<String>,
    pub optional_groups: Vec<Vec<String>>,
}

/// Intermediate clause form carrying unexpanded wildcard patterns.
#[derive(Debug, Clone, Default)]
struct RawConjunct {
    required: Vec<String>,
    excluded: Vec<String>,
    optional: Vec<String>,
    wildcards: Vec<String>,
}

/// Result of phase one: union clauses plus the wildcard patterns that still
/// need catalogue lookups.
#[derive(Debug, Clone)]
pub struct Expansion {
    clauses: Vec<RawConjunct>,
    /// Deduplicated wildcard patterns mentioned anywhere in the query.
    pub patterns: Vec<String>,
    pub status: StatusFilter,
    pub md5: Option<String>,
    pub order: Order,
}

/// Fully materialized query: a union of conjunctive clauses plus the
/// directives the evaluator consumes directly.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    /// A post matches when it satisfies any clause. A query with no terms
    /// at all produces one empty clause, which matches every post.
    pub clauses: Vec<Conjunct>,
    pub status: StatusFilter,
    pub md5: Option<String>,
    pub order: Order,
}

// ---------------------------------------------------------------------------
// Phase one: saved-search expansion
// ---------------------------------------------------------------------------

/// Flatten a parsed query into union clauses.
///
/// Saved-search references expand to one clause per referenced search, each
/// ANDed with the literal terms of the outer query; multiple searches union.
/// Expansion is bounded by `config.max_saved_search_depth` and a visited set,
/// so a directly or indirectly self-referential saved search is a
/// [`QueryError::Resolution`], never an infinite loop.
pub fn expand(
    parsed: &ParsedQuery,
    saved_searches: &[SavedSearchEntry],
    config: &SearchConfig,
) -> QueryResult<Expansion> {
    let base = RawConjunct {
        required: parsed.required.clone(),
        excluded: parsed.excluded.clone(),
        optional: parsed.optional.clone(),
        wildcards: parsed.wildcards.clone(),
    };

    let clauses = if parsed.saved_searches.is_empty() {
        vec![base]
    } else {
        let mut visited = HashSet::new();
        let mut clauses = Vec::new();
        for reference in &parsed.saved_searches {
            expand_reference(
                reference,
                &base,
                saved_searches,
                config,
                0,
                &mut visited,
                &mut clauses,
            )?;
        }
        clauses
    };

    let mut patterns: Vec<String> = clauses.iter().flat_map(|c| c.wildcards.clone()).collect();
    patterns.sort();
    patterns.dedup();

    Ok(Expansion {
        clauses,
        patterns,
        status: parsed.status,
        md5: parsed.md5.clone(),
        order: parsed.order,
    })
}

fn expand_reference(
    reference: &SavedSearchRef,
    base: &RawConjunct,
    saved_searches: &[SavedSearchEntry],
    config: &SearchConfig,
    depth: usize,
    visited: &mut HashSet<String>,
    clauses: &mut Vec<RawConjunct>,
) -> QueryResult<()> {
    if depth >= config.max_saved_search_depth {
        return Err(QueryError::Resolution(format!(
            "saved-search expansion exceeded depth {}",
            config.max_saved_search_depth
        )));
    }

    let selected: Vec<&SavedSearchEntry> = match reference {
        SavedSearchRef::All => saved_searches.iter().collect(),
        SavedSearchRef::Label(label) => saved_searches
            .iter()
            .filter(|s| &s.label == label)
            .collect(),
    };

    // An unknown label (or a principal with no saved searches) resolves to
    // nothing rather than erroring; the search simply matches no extra posts.
    for entry in selected {
        if !visited.insert(entry.label.clone()) {
            return Err(QueryError::Resolution(format!(
                "saved search '{}' references itself",
                entry.label
            )));
        }

        let sub = query::parse(&entry.query, config)?;
        let mut clause = base.clone();
        clause.required.extend(sub.required);
        clause.excluded.extend(sub.excluded);
        clause.optional.extend(sub.optional);
        clause.wildcards.extend(sub.wildcards);

        if sub.saved_searches.is_empty() {
            clauses.push(clause);
        } else {
            for nested in &sub.saved_searches {
                expand_reference(
                    nested,
                    &clause,
                    saved_searches,
                    config,
                    depth + 1,
                    visited,
                    clauses,
                )?;
            }
        }

        visited.remove(&entry.label);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Phase two: wildcard materialization
// ---------------------------------------------------------------------------

/// Substitute wildcard match lists into the clauses.
///
/// `wildcard_matches` maps each pattern from [`Expansion::patterns`] to the
/// concrete tag names it matched; the caller should fetch at most
/// `config.max_wildcard_matches + 1` names per pattern. A list longer than
/// the cap fails with [`QueryError::WildcardBudget`] — never silent
/// truncation. A pattern absent from the map expands to an empty group.
pub fn materialize(
    expansion: Expansion,
    wildcard_matches: &HashMap<String, Vec<String>>,
    config: &SearchConfig,
) -> QueryResult<ResolvedQuery> {
    let mut clauses = Vec::with_capacity(expansion.clauses.len());

    for raw in expansion.clauses {
        let mut optional_groups = Vec::new();
        if !raw.optional.is_empty() {
            optional_groups.push(raw.optional);
        }

        for pattern in &raw.wildcards {
            let matches = wildcard_matches.get(pattern).cloned().unwrap_or_default();
            if matches.len() > config.max_wildcard_matches {
                return Err(QueryError::WildcardBudget {
                    pattern: pattern.clone(),
                    max: config.max_wildcard_matches,
                });
            }
            optional_groups.push(matches);
        }

        clauses.push(Conjunct {
            required: raw.required,
            excluded: raw.excluded,
            optional_groups,
        });
    }

    Ok(ResolvedQuery {
        clauses,
        status: expansion.status,
        md5: expansion.md5,
        order: expansion.order,
    })
}

/// Convenience for queries without saved searches or wildcards (tests, md5
/// lookups): expand and materialize with no catalogue input.
pub fn resolve_simple(parsed: &ParsedQuery, config: &SearchConfig) -> QueryResult<ResolvedQuery> {
    let expansion = expand(parsed, &[], config)?;
    materialize(expansion, &HashMap::new(), config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

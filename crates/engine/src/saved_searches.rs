//! Owner-scoped saved-search management.
//!
//! Saved searches are private to their owner; the repository enforces the
//! owner scope on every statement, so a foreign id behaves exactly like a
//! missing one. The engine additionally validates the stored query at
//! write time — a search that cannot parse would poison every `search:`
//! expansion that touches it.

use booru_core::error::QueryError;
use booru_core::query;
use booru_core::types::DbId;
use booru_core::visibility::Principal;
use booru_db::models::saved_search::{CreateSavedSearch, SavedSearch, UpdateSavedSearch};
use booru_db::repositories::SavedSearchRepo;

use crate::error::EngineResult;
use crate::Engine;

impl Engine {
    pub async fn create_saved_search(
        &self,
        principal: &Principal,
        input: &CreateSavedSearch,
    ) -> EngineResult<SavedSearch> {
        let owner_id = require_owner(principal)?;
        query::parse(&input.query, &self.config)?;
        let search = SavedSearchRepo::create(&self.pool, owner_id, input).await?;
        tracing::debug!(owner_id, label = %search.label, "Saved search created");
        Ok(search)
    }

    pub async fn list_saved_searches(
        &self,
        principal: &Principal,
    ) -> EngineResult<Vec<SavedSearch>> {
        let owner_id = require_owner(principal)?;
        Ok(SavedSearchRepo::list_by_owner(&self.pool, owner_id).await?)
    }

    pub async fn update_saved_search(
        &self,
        principal: &Principal,
        id: DbId,
        input: &UpdateSavedSearch,
    ) -> EngineResult<SavedSearch> {
        let owner_id = require_owner(principal)?;
        if let Some(q) = &input.query {
            query::parse(q, &self.config)?;
        }
        SavedSearchRepo::update(&self.pool, owner_id, id, input)
            .await?
            .ok_or_else(|| QueryError::NotFound { entity: "saved search" }.into())
    }

    pub async fn delete_saved_search(&self, principal: &Principal, id: DbId) -> EngineResult<()> {
        let owner_id = require_owner(principal)?;
        if !SavedSearchRepo::delete(&self.pool, owner_id, id).await? {
            return Err(QueryError::NotFound { entity: "saved search" }.into());
        }
        Ok(())
    }
}

fn require_owner(principal: &Principal) -> Result<DbId, QueryError> {
    principal
        .id
        .ok_or_else(|| QueryError::PermissionDenied("saved searches require an account".into()))
}

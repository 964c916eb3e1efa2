//! In-memory resource DAO.
//!
//! Holds every resource in a `BTreeMap` behind one async `RwLock`. List
//! queries take a single read guard for both the count and the page, so
//! totals always match the returned rows even under concurrent writes.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use resdao_core::error::AppError;
use resdao_core::result::AppResult;
use resdao_core::traits::{Dao, Entity};
use resdao_core::types::{PageData, PageLink, ResourceId, TenantId};
use resdao_entity::resource::{ResourceInfo, ResourceOrdering};

use crate::dao::ResourceInfoDao;

/// Resource DAO keeping rows in process memory.
///
/// Clones share the same rows.
#[derive(Debug, Clone)]
pub struct InMemoryResourceInfoDao {
    rows: Arc<RwLock<BTreeMap<ResourceId, ResourceInfo>>>,
    available: Arc<AtomicBool>,
}

impl Default for InMemoryResourceInfoDao {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryResourceInfoDao {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Number of stored resources.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Whether the store holds no resources.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// Mark the store reachable or unreachable. While unreachable every
    /// operation that reaches the store fails with `StoreUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> AppResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::store_unavailable("In-memory resource store is offline"))
        }
    }

    /// Filter, sort and slice the rows selected by `visible` under one read
    /// guard.
    async fn find_page(
        &self,
        page_link: &PageLink,
        visible: impl Fn(&ResourceInfo, &BTreeMap<ResourceId, ResourceInfo>) -> bool + Send,
    ) -> AppResult<PageData<ResourceInfo>> {
        let ordering = ResourceOrdering::from_page_link(page_link)?;
        self.ensure_available()?;

        let rows = self.rows.read().await;
        let mut matches: Vec<&ResourceInfo> = rows
            .values()
            .filter(|r| visible(r, &rows))
            .filter(|r| page_link.text_search().is_none_or(|term| r.title_matches(term)))
            .collect();
        matches.sort_by(|a, b| ordering.compare(a, b));

        let total = matches.len() as u64;
        let offset = usize::try_from(page_link.offset()).unwrap_or(usize::MAX);
        let limit = page_link.page_size() as usize;
        let page = matches
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(PageData::new(page, total, page_link))
    }
}

#[async_trait]
impl Dao<ResourceInfo> for InMemoryResourceInfoDao {
    async fn find_by_id(&self, id: ResourceId) -> AppResult<ResourceInfo> {
        self.ensure_available()?;
        self.rows
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Resource {id} not found")))
    }

    async fn exists_by_id(&self, id: ResourceId) -> AppResult<bool> {
        self.ensure_available()?;
        Ok(self.rows.read().await.contains_key(&id))
    }

    async fn save(&self, entity: &ResourceInfo) -> AppResult<ResourceInfo> {
        entity.check()?;
        self.ensure_available()?;
        let id = entity.id();
        debug!(%id, tenant_id = %entity.tenant_id, "Saving resource");

        let mut rows = self.rows.write().await;
        let mut stored = entity.clone();
        // created_at and tenant_id are fixed by the first insert.
        if let Some(existing) = rows.get(&id) {
            stored.created_at = existing.created_at;
            stored.tenant_id = existing.tenant_id;
        }

        let clash = rows
            .values()
            .find(|r| r.id != id && r.natural_key() == stored.natural_key());
        if let Some(other) = clash {
            return Err(AppError::conflict(format!(
                "Resource with key '{}' of type {} already exists for tenant {} ({})",
                stored.resource_key, stored.resource_type, stored.tenant_id, other.id
            )));
        }

        rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn remove_by_id(&self, id: ResourceId) -> AppResult<bool> {
        self.ensure_available()?;
        debug!(%id, "Removing resource");
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl ResourceInfoDao for InMemoryResourceInfoDao {
    async fn find_all_tenant_resources_by_tenant_id(
        &self,
        tenant_id: TenantId,
        page_link: &PageLink,
    ) -> AppResult<PageData<ResourceInfo>> {
        debug!(%tenant_id, page = page_link.page(), "Listing visible resources");
        self.find_page(page_link, |r, rows| {
            r.tenant_id == tenant_id
                || (r.is_system()
                    && !rows.values().any(|own| {
                        own.tenant_id == tenant_id
                            && own.resource_type == r.resource_type
                            && own.resource_key == r.resource_key
                    }))
        })
        .await
    }

    async fn find_tenant_resources_by_tenant_id(
        &self,
        tenant_id: TenantId,
        page_link: &PageLink,
    ) -> AppResult<PageData<ResourceInfo>> {
        debug!(%tenant_id, page = page_link.page(), "Listing tenant resources");
        self.find_page(page_link, |r, _| r.tenant_id == tenant_id)
            .await
    }
}

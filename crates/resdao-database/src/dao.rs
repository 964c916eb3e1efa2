//! Resource-specific DAO contract.

use async_trait::async_trait;

use resdao_core::result::AppResult;
use resdao_core::traits::Dao;
use resdao_core::types::{PageData, PageLink, TenantId};
use resdao_entity::resource::ResourceInfo;

/// Persistence contract for [`ResourceInfo`].
///
/// Both list queries honour the page link's size, index, title search and
/// sort order. Without a sort order results come in creation order; every
/// ordering ends with `id` ascending, so repeated calls over unchanged data
/// return identical pages and consecutive pages never overlap. An invalid
/// sort property fails with `ErrorKind::Validation` before the store is
/// touched.
#[async_trait]
pub trait ResourceInfoDao: Dao<ResourceInfo> {
    /// Resources visible to a tenant: its own, plus system tenant resources
    /// it has not overridden with one of the same type and key.
    async fn find_all_tenant_resources_by_tenant_id(
        &self,
        tenant_id: TenantId,
        page_link: &PageLink,
    ) -> AppResult<PageData<ResourceInfo>>;

    /// Resources owned by the tenant itself.
    async fn find_tenant_resources_by_tenant_id(
        &self,
        tenant_id: TenantId,
        page_link: &PageLink,
    ) -> AppResult<PageData<ResourceInfo>>;
}

//! PostgreSQL resource DAO.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use resdao_core::error::AppError;
use resdao_core::result::AppResult;
use resdao_core::traits::{Dao, Entity};
use resdao_core::types::{PageData, PageLink, ResourceId, TenantId};
use resdao_entity::resource::{ResourceInfo, ResourceOrdering};

use crate::dao::ResourceInfoDao;
use crate::error::store_error;

/// Which rows a tenant list query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TenantScope {
    /// Rows owned by the tenant (`$1`).
    Own,
    /// Own rows plus system rows (`$2`) without a same-key tenant override.
    WithSystem,
}

impl TenantScope {
    fn condition(&self) -> &'static str {
        match self {
            Self::Own => "ri.tenant_id = $1",
            Self::WithSystem => {
                "(ri.tenant_id = $1 OR (ri.tenant_id = $2 AND NOT EXISTS (\
                    SELECT 1 FROM resource_info sr \
                    WHERE sr.tenant_id = $1 \
                    AND sr.resource_type = ri.resource_type \
                    AND sr.resource_key = ri.resource_key)))"
            }
        }
    }

    fn param_count(&self) -> usize {
        match self {
            Self::Own => 1,
            Self::WithSystem => 2,
        }
    }
}

/// Resource DAO backed by the `resource_info` table.
#[derive(Debug, Clone)]
pub struct PgResourceInfoDao {
    pool: PgPool,
}

impl PgResourceInfoDao {
    /// Create a new resource DAO.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the count and the page fetch for `scope` inside one read-only
    /// repeatable-read transaction, so the totals always describe the rows
    /// returned.
    async fn find_page(
        &self,
        scope: TenantScope,
        tenant_id: TenantId,
        page_link: &PageLink,
    ) -> AppResult<PageData<ResourceInfo>> {
        let ordering = ResourceOrdering::from_page_link(page_link)?;
        let search = page_link.text_search().map(like_pattern);

        let mut where_clause = scope.condition().to_string();
        let mut next_param = scope.param_count() + 1;
        if search.is_some() {
            where_clause.push_str(&format!(" AND ri.title ILIKE ${next_param} ESCAPE '\\'"));
            next_param += 1;
        }

        let count_sql = format!("SELECT COUNT(*) FROM resource_info ri WHERE {where_clause}");
        let select_sql = format!(
            "SELECT ri.* FROM resource_info ri WHERE {where_clause} \
             ORDER BY {} LIMIT ${next_param} OFFSET ${}",
            ordering.to_sql(),
            next_param + 1
        );

        debug!(
            %tenant_id,
            ?scope,
            page = page_link.page(),
            page_size = page_link.page_size(),
            search = ?page_link.text_search(),
            order_by = %ordering.to_sql(),
            "Querying resource page"
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(tenant_id);
        let mut select_query = sqlx::query_as::<_, ResourceInfo>(&select_sql).bind(tenant_id);

        if scope == TenantScope::WithSystem {
            count_query = count_query.bind(TenantId::SYSTEM);
            select_query = select_query.bind(TenantId::SYSTEM);
        }
        if let Some(pattern) = &search {
            count_query = count_query.bind(pattern.clone());
            select_query = select_query.bind(pattern.clone());
        }

        let limit = i64::try_from(page_link.limit())
            .map_err(|_| AppError::validation("Page size is out of range"))?;
        let offset = i64::try_from(page_link.offset())
            .map_err(|_| AppError::validation("Page offset is out of range"))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(store_error("Failed to begin read transaction"))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(store_error("Failed to configure read transaction"))?;

        let total = count_query
            .fetch_one(&mut *tx)
            .await
            .map_err(store_error("Failed to count resources"))?;

        let rows = select_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *tx)
            .await
            .map_err(store_error("Failed to list resources"))?;

        tx.commit()
            .await
            .map_err(store_error("Failed to finish read transaction"))?;

        let total = u64::try_from(total)
            .map_err(|_| AppError::internal(format!("Resource count is negative: {total}")))?;
        Ok(PageData::new(rows, total, page_link))
    }
}

#[async_trait]
impl Dao<ResourceInfo> for PgResourceInfoDao {
    async fn find_by_id(&self, id: ResourceId) -> AppResult<ResourceInfo> {
        debug!(%id, "Finding resource");
        sqlx::query_as::<_, ResourceInfo>("SELECT * FROM resource_info WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error("Failed to find resource"))?
            .ok_or_else(|| AppError::not_found(format!("Resource {id} not found")))
    }

    async fn exists_by_id(&self, id: ResourceId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM resource_info WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(store_error("Failed to check resource existence"))
    }

    async fn save(&self, entity: &ResourceInfo) -> AppResult<ResourceInfo> {
        entity.check()?;
        let id = entity.id();
        debug!(%id, tenant_id = %entity.tenant_id, "Saving resource");

        // created_at and tenant_id are fixed by the first insert.
        sqlx::query_as::<_, ResourceInfo>(
            "INSERT INTO resource_info (id, created_at, tenant_id, title, resource_type, resource_key) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (id) DO UPDATE SET \
                title = EXCLUDED.title, \
                resource_type = EXCLUDED.resource_type, \
                resource_key = EXCLUDED.resource_key \
             RETURNING *",
        )
        .bind(id)
        .bind(entity.created_at)
        .bind(entity.tenant_id)
        .bind(&entity.title)
        .bind(entity.resource_type)
        .bind(&entity.resource_key)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error("Failed to save resource"))
    }

    async fn remove_by_id(&self, id: ResourceId) -> AppResult<bool> {
        debug!(%id, "Removing resource");
        let result = sqlx::query("DELETE FROM resource_info WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error("Failed to remove resource"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ResourceInfoDao for PgResourceInfoDao {
    async fn find_all_tenant_resources_by_tenant_id(
        &self,
        tenant_id: TenantId,
        page_link: &PageLink,
    ) -> AppResult<PageData<ResourceInfo>> {
        self.find_page(TenantScope::WithSystem, tenant_id, page_link)
            .await
    }

    async fn find_tenant_resources_by_tenant_id(
        &self,
        tenant_id: TenantId,
        page_link: &PageLink,
    ) -> AppResult<PageData<ResourceInfo>> {
        self.find_page(TenantScope::Own, tenant_id, page_link).await
    }
}

/// `ILIKE` pattern matching `term` anywhere, with wildcards in the term
/// escaped.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("sensor"), "%sensor%");
        assert_eq!(like_pattern("100%_done"), "%100\\%\\_done%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_scope_parameter_layout() {
        assert_eq!(TenantScope::Own.param_count(), 1);
        assert!(!TenantScope::Own.condition().contains("$2"));
        assert_eq!(TenantScope::WithSystem.param_count(), 2);
        assert!(TenantScope::WithSystem.condition().contains("$2"));
    }

    #[tokio::test]
    async fn test_invalid_sort_fails_before_store_access() {
        use resdao_core::ErrorKind;
        use resdao_core::types::SortOrder;

        // Lazy pool: any store access would fail with StoreUnavailable.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://resdao@127.0.0.1:1/resdao")
            .expect("lazy pool");
        let dao = PgResourceInfoDao::new(pool);
        let link = PageLink::new(10, 0)
            .unwrap()
            .with_sort_order(SortOrder::asc("secret_column"));

        let err = dao
            .find_tenant_resources_by_tenant_id(TenantId::new(), &link)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_invalid_entity_fails_before_store_access() {
        use resdao_core::ErrorKind;
        use resdao_entity::resource::ResourceType;

        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://resdao@127.0.0.1:1/resdao")
            .expect("lazy pool");
        let dao = PgResourceInfoDao::new(pool);
        let resource = ResourceInfo::new(TenantId::new(), "", ResourceType::Jks, "key");

        let err = dao.save(&resource).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}

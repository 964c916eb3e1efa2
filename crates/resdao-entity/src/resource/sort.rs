//! Sortable resource properties and the ordering applied by list queries.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use resdao_core::types::{PageLink, SortDirection};
use resdao_core::{AppError, AppResult};

use super::model::ResourceInfo;

/// Property a resource list may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceSortProperty {
    /// Creation time.
    CreatedTime,
    /// Title.
    Title,
    /// Resource type.
    ResourceType,
    /// Resource key.
    ResourceKey,
    /// Owning tenant.
    TenantId,
    /// Identifier.
    Id,
}

impl ResourceSortProperty {
    /// Column backing this property.
    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedTime => "created_at",
            Self::Title => "title",
            Self::ResourceType => "resource_type",
            Self::ResourceKey => "resource_key",
            Self::TenantId => "tenant_id",
            Self::Id => "id",
        }
    }

    /// SQL expression sorted on. Text columns use the `"C"` collation so
    /// the database orders them by code point, like [`Self::compare`].
    pub fn sort_expr(&self) -> &'static str {
        match self {
            Self::Title => r#"title COLLATE "C""#,
            Self::ResourceKey => r#"resource_key COLLATE "C""#,
            other => other.column(),
        }
    }

    /// Compare two resources by this property, ascending.
    pub fn compare(&self, a: &ResourceInfo, b: &ResourceInfo) -> Ordering {
        match self {
            Self::CreatedTime => a.created_at.cmp(&b.created_at),
            Self::Title => a.title.cmp(&b.title),
            Self::ResourceType => a.resource_type.cmp(&b.resource_type),
            Self::ResourceKey => a.resource_key.cmp(&b.resource_key),
            Self::TenantId => a.tenant_id.cmp(&b.tenant_id),
            Self::Id => a.id.cmp(&b.id),
        }
    }
}

impl fmt::Display for ResourceSortProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreatedTime => "createdTime",
            Self::Title => "title",
            Self::ResourceType => "resourceType",
            Self::ResourceKey => "resourceKey",
            Self::TenantId => "tenantId",
            Self::Id => "id",
        };
        f.write_str(name)
    }
}

impl FromStr for ResourceSortProperty {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "createdTime" | "createdAt" | "created_time" | "created_at" => Ok(Self::CreatedTime),
            "title" => Ok(Self::Title),
            "resourceType" | "resource_type" => Ok(Self::ResourceType),
            "resourceKey" | "resource_key" => Ok(Self::ResourceKey),
            "tenantId" | "tenant_id" => Ok(Self::TenantId),
            "id" => Ok(Self::Id),
            _ => Err(AppError::validation(format!(
                "Unsupported sort property: '{s}'. Expected one of: createdTime, title, \
                 resourceType, resourceKey, tenantId, id"
            ))),
        }
    }
}

/// Total order applied to a resource list: the requested property, then
/// `id` ascending so that equal keys never swap places between pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceOrdering {
    /// Primary sort property.
    pub property: ResourceSortProperty,
    /// Direction of the primary property.
    pub direction: SortDirection,
}

impl Default for ResourceOrdering {
    /// Creation order.
    fn default() -> Self {
        Self {
            property: ResourceSortProperty::CreatedTime,
            direction: SortDirection::Asc,
        }
    }
}

impl ResourceOrdering {
    /// Resolve the ordering requested by `page_link`.
    ///
    /// Fails with a validation error on an unknown property name.
    pub fn from_page_link(page_link: &PageLink) -> AppResult<Self> {
        match page_link.sort_order() {
            Some(order) => Ok(Self {
                property: order.property.parse()?,
                direction: order.direction,
            }),
            None => Ok(Self::default()),
        }
    }

    /// Compare two resources under this ordering.
    pub fn compare(&self, a: &ResourceInfo, b: &ResourceInfo) -> Ordering {
        self.direction
            .apply(self.property.compare(a, b))
            .then_with(|| a.id.cmp(&b.id))
    }

    /// SQL `ORDER BY` expression, without the keyword.
    ///
    /// Only whitelisted column names are ever emitted.
    pub fn to_sql(&self) -> String {
        match self.property {
            ResourceSortProperty::Id => format!("id {}", self.direction.as_sql()),
            property => format!(
                "{} {}, id ASC",
                property.sort_expr(),
                self.direction.as_sql()
            ),
        }
    }
}

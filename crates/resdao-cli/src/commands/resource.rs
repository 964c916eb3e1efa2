//! Resource management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use resdao_core::error::AppError;
use resdao_core::result::AppResult;
use resdao_core::types::{PageData, PageLink, ResourceId, SortDirection, SortOrder, TenantId};
use resdao_database::{DatabasePool, ResourceInfoDao};
use resdao_entity::resource::{ResourceInfo, ResourceType};

/// Arguments for resource commands
#[derive(Debug, Args)]
pub struct ResourceArgs {
    /// Resource subcommand
    #[command(subcommand)]
    pub command: ResourceCommand,
}

/// Resource subcommands
#[derive(Debug, Subcommand)]
pub enum ResourceCommand {
    /// List resources visible to a tenant
    List(ListArgs),
    /// Show a single resource
    Get {
        /// Resource ID
        id: ResourceId,
    },
    /// Create or update a resource
    Save(SaveArgs),
    /// Delete a resource (succeeds when it does not exist)
    Delete {
        /// Resource ID
        id: ResourceId,
    },
}

/// Arguments for `resource list`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Tenant ID
    #[arg(short, long)]
    pub tenant: TenantId,
    /// Only the tenant's own resources, without inherited system resources
    #[arg(long)]
    pub own_only: bool,
    /// Items per page
    #[arg(long, default_value_t = 20, allow_negative_numbers = true)]
    pub page_size: i64,
    /// Zero-based page index
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    pub page: i64,
    /// Case-insensitive title search
    #[arg(short, long)]
    pub search: Option<String>,
    /// Sort property (createdTime, title, resourceType, resourceKey, tenantId, id)
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,
    /// Fetch every page starting at `--page`
    #[arg(long)]
    pub all_pages: bool,
}

/// Arguments for `resource save`
#[derive(Debug, Args)]
pub struct SaveArgs {
    /// Existing resource ID to update; a new ID is generated when omitted
    #[arg(long)]
    pub id: Option<ResourceId>,
    /// Owning tenant ID
    #[arg(short, long)]
    pub tenant: TenantId,
    /// Title
    #[arg(long)]
    pub title: String,
    /// Resource type (LWM2M_MODEL, JKS, PKCS_12, JS_MODULE)
    #[arg(long = "type")]
    pub resource_type: ResourceType,
    /// Resource key, unique per tenant and type
    #[arg(short, long)]
    pub key: String,
}

impl ListArgs {
    /// Build the page link described by the arguments.
    fn page_link(&self) -> AppResult<PageLink> {
        let mut link = PageLink::from_raw(self.page_size, self.page)?;
        if let Some(search) = &self.search {
            link = link.with_text_search(search.as_str());
        }
        if let Some(property) = &self.sort {
            let direction = if self.desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            link = link.with_sort_order(SortOrder::new(property.as_str(), direction));
        }
        Ok(link)
    }
}

/// Result of a resource command, before formatting.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResourceOutput {
    /// One page of a listing.
    Page(PageData<ResourceInfo>),
    /// Every remaining page of a listing, concatenated.
    All(Vec<ResourceInfo>),
    /// A single resource.
    Item(ResourceInfo),
    /// Outcome of a delete.
    Removed {
        /// Resource ID
        id: ResourceId,
        /// Whether a stored resource was removed
        removed: bool,
    },
}

/// Resource display row
#[derive(Debug, Serialize, Tabled)]
struct ResourceRow {
    /// ID
    id: String,
    /// Tenant
    tenant: String,
    /// Title
    title: String,
    /// Type
    #[tabled(rename = "type")]
    resource_type: String,
    /// Key
    key: String,
    /// Created
    created: String,
}

impl From<&ResourceInfo> for ResourceRow {
    fn from(r: &ResourceInfo) -> Self {
        Self {
            id: r.id.to_string(),
            tenant: if r.is_system() {
                "system".to_string()
            } else {
                r.tenant_id.to_string()
            },
            title: r.title.clone(),
            resource_type: r.resource_type.to_string(),
            key: r.resource_key.clone(),
            created: r.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Execute resource commands against the PostgreSQL store
pub async fn execute(
    args: &ResourceArgs,
    pool: &DatabasePool,
    format: OutputFormat,
) -> Result<(), AppError> {
    let dao = pool.resource_dao();
    let result = run(&dao, &args.command).await?;
    print(&result, format);
    Ok(())
}

/// Run a resource command against any resource store.
pub async fn run<D: ResourceInfoDao>(dao: &D, command: &ResourceCommand) -> AppResult<ResourceOutput> {
    match command {
        ResourceCommand::List(args) => {
            let page_link = args.page_link()?;
            if args.all_pages {
                list_all(dao, args, page_link).await.map(ResourceOutput::All)
            } else {
                list_page(dao, args, &page_link).await.map(ResourceOutput::Page)
            }
        }
        ResourceCommand::Get { id } => dao.find_by_id(*id).await.map(ResourceOutput::Item),
        ResourceCommand::Save(args) => {
            let mut resource =
                ResourceInfo::new(args.tenant, &args.title, args.resource_type, &args.key);
            if let Some(id) = args.id {
                resource.id = id;
            }
            dao.save(&resource).await.map(ResourceOutput::Item)
        }
        ResourceCommand::Delete { id } => {
            let removed = dao.remove_by_id(*id).await?;
            Ok(ResourceOutput::Removed { id: *id, removed })
        }
    }
}

async fn list_page<D: ResourceInfoDao>(
    dao: &D,
    args: &ListArgs,
    page_link: &PageLink,
) -> AppResult<PageData<ResourceInfo>> {
    if args.own_only {
        dao.find_tenant_resources_by_tenant_id(args.tenant, page_link)
            .await
    } else {
        dao.find_all_tenant_resources_by_tenant_id(args.tenant, page_link)
            .await
    }
}

async fn list_all<D: ResourceInfoDao>(
    dao: &D,
    args: &ListArgs,
    mut page_link: PageLink,
) -> AppResult<Vec<ResourceInfo>> {
    let mut items = Vec::new();
    loop {
        let page = list_page(dao, args, &page_link).await?;
        let has_next = page.has_next();
        items.extend(page.into_data());
        if !has_next {
            return Ok(items);
        }
        page_link = page_link.next_page_link();
    }
}

fn print(result: &ResourceOutput, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_json(result);
        return;
    }

    match result {
        ResourceOutput::Page(page) => {
            let rows: Vec<ResourceRow> = page.data().iter().map(ResourceRow::from).collect();
            println!("{}", output::render_table(&rows));
            println!(
                "{} resource(s) across {} page(s){}",
                page.total_elements(),
                page.total_pages(),
                if page.has_next() { ", more available" } else { "" }
            );
        }
        ResourceOutput::All(items) => {
            let rows: Vec<ResourceRow> = items.iter().map(ResourceRow::from).collect();
            println!("{}", output::render_table(&rows));
        }
        ResourceOutput::Item(resource) => {
            output::print_kv("id", &resource.id.to_string());
            output::print_kv("tenant", &resource.tenant_id.to_string());
            output::print_kv("title", &resource.title);
            output::print_kv("type", resource.resource_type.as_str());
            output::print_kv("key", &resource.resource_key);
            output::print_kv("created", &resource.created_at.to_rfc3339());
        }
        ResourceOutput::Removed { id, removed: true } => {
            output::print_success(&format!("Resource {id} deleted."));
        }
        ResourceOutput::Removed { id, removed: false } => {
            output::print_success(&format!("Resource {id} did not exist; nothing to delete."));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resdao_core::ErrorKind;
    use resdao_core::traits::Dao;
    use resdao_database::InMemoryResourceInfoDao;

    fn list_args(tenant: TenantId) -> ListArgs {
        ListArgs {
            tenant,
            own_only: false,
            page_size: 2,
            page: 0,
            search: None,
            sort: None,
            desc: false,
            all_pages: false,
        }
    }

    async fn seeded() -> (InMemoryResourceInfoDao, TenantId) {
        let dao = InMemoryResourceInfoDao::new();
        let tenant = TenantId::new();
        for (title, key) in [("Alpha", "a"), ("Beta", "b"), ("Gamma", "c")] {
            dao.save(&ResourceInfo::new(tenant, title, ResourceType::JsModule, key))
                .await
                .unwrap();
        }
        dao.save(&ResourceInfo::new(TenantId::SYSTEM, "Shared", ResourceType::Jks, "s"))
            .await
            .unwrap();
        (dao, tenant)
    }

    #[tokio::test]
    async fn test_list_page_includes_system_resources() {
        let (dao, tenant) = seeded().await;
        let output = run(&dao, &ResourceCommand::List(list_args(tenant)))
            .await
            .unwrap();
        let ResourceOutput::Page(page) = output else {
            panic!("expected a page");
        };
        assert_eq!(page.total_elements(), 4);
        assert_eq!(page.data().len(), 2);
        assert!(page.has_next());
    }

    #[tokio::test]
    async fn test_list_all_pages_own_only() {
        let (dao, tenant) = seeded().await;
        let args = ListArgs {
            own_only: true,
            all_pages: true,
            sort: Some("title".to_string()),
            desc: true,
            ..list_args(tenant)
        };
        let ResourceOutput::All(items) = run(&dao, &ResourceCommand::List(args)).await.unwrap()
        else {
            panic!("expected all pages");
        };
        let titles: Vec<_> = items.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Gamma", "Beta", "Alpha"]);
    }

    #[tokio::test]
    async fn test_negative_page_is_validation_error() {
        let (dao, tenant) = seeded().await;
        let args = ListArgs {
            page: -1,
            ..list_args(tenant)
        };
        let err = run(&dao, &ResourceCommand::List(args)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_save_get_delete() {
        let dao = InMemoryResourceInfoDao::new();
        let tenant = TenantId::new();
        let save = ResourceCommand::Save(SaveArgs {
            id: None,
            tenant,
            title: "Device keys".to_string(),
            resource_type: ResourceType::Pkcs12,
            key: "device.p12".to_string(),
        });
        let ResourceOutput::Item(saved) = run(&dao, &save).await.unwrap() else {
            panic!("expected item");
        };

        let fetched = run(&dao, &ResourceCommand::Get { id: saved.id }).await.unwrap();
        assert!(matches!(fetched, ResourceOutput::Item(r) if r == saved));

        let deleted = run(&dao, &ResourceCommand::Delete { id: saved.id }).await.unwrap();
        assert!(matches!(deleted, ResourceOutput::Removed { removed: true, .. }));
        let again = run(&dao, &ResourceCommand::Delete { id: saved.id }).await.unwrap();
        assert!(matches!(again, ResourceOutput::Removed { removed: false, .. }));

        let err = run(&dao, &ResourceCommand::Get { id: saved.id })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_system_rows_show_system_tenant() {
        let resource = ResourceInfo::new(TenantId::SYSTEM, "Shared", ResourceType::Jks, "s");
        let row = ResourceRow::from(&resource);
        assert_eq!(row.tenant, "system");
        assert_eq!(row.resource_type, "JKS");
    }
}

//! Core type definitions used across the ResDao workspace.

pub mod id;
pub mod pagination;
pub mod sorting;

pub use id::{ResourceId, TenantId};
pub use pagination::{MAX_PAGE_SIZE, PageData, PageLink};
pub use sorting::{SortDirection, SortOrder};

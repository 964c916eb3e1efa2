//! Resource entity and related types.

pub mod model;
pub mod resource_type;
pub mod sort;

pub use model::ResourceInfo;
pub use resource_type::ResourceType;
pub use sort::{ResourceOrdering, ResourceSortProperty};

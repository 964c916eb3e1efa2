//! Store implementations of the resource DAO.

pub mod memory;
pub mod resource_info;

pub use memory::InMemoryResourceInfoDao;
pub use resource_info::PgResourceInfoDao;

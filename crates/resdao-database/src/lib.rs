//! # resdao-database
//!
//! PostgreSQL connection management, schema migrations and the concrete
//! stores implementing [`ResourceInfoDao`].

pub mod connection;
pub mod dao;
pub mod error;
pub mod migration;
pub mod repositories;

pub use connection::{DatabasePool, StoreHealth};
pub use dao::ResourceInfoDao;
pub use repositories::{InMemoryResourceInfoDao, PgResourceInfoDao};

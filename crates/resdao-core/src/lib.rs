//! # resdao-core
//!
//! Core crate for ResDao. Contains the generic [`traits::Dao`] contract,
//! configuration schemas, typed identifiers, the paging value objects
//! ([`types::PageLink`], [`types::PageData`]) and the unified error system.
//!
//! This crate has **no** internal dependencies on other ResDao crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;

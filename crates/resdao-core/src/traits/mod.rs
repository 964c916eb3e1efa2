//! Core traits defined in `resdao-core` and implemented by store crates.

pub mod dao;

pub use dao::{Dao, Entity};

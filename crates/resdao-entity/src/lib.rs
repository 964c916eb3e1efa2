//! # resdao-entity
//!
//! Domain entity models for ResDao. Database entities derive
//! `sqlx::FromRow` alongside `Serialize`/`Deserialize`.

pub mod resource;

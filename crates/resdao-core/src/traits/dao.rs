//! Generic data-access-object contract.

use async_trait::async_trait;

use crate::result::AppResult;

/// A record managed by a [`Dao`], identified by a unique id.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Identifier type.
    type Id: Copy + Eq + std::fmt::Display + Send + Sync + 'static;

    /// The entity's identifier.
    fn id(&self) -> Self::Id;
}

/// Generic persistence contract for one entity type.
///
/// Each store implements this once per entity, so callers bind the store
/// type at compile time (`fn f<D: Dao<T>>(dao: &D)`). Entity-specific
/// queries live on traits extending this one.
///
/// Implementations hold no state between calls other than the handle to
/// their backing store and are safe to share across tasks. Store failures
/// surface as `ErrorKind::StoreUnavailable` and are never retried here.
#[async_trait]
pub trait Dao<T: Entity>: Send + Sync {
    /// Fetch an entity by id.
    ///
    /// Fails with `ErrorKind::NotFound` when no entity has this id.
    async fn find_by_id(&self, id: T::Id) -> AppResult<T>;

    /// Whether an entity with this id exists.
    async fn exists_by_id(&self, id: T::Id) -> AppResult<bool>;

    /// Insert or replace the entity with `entity.id()` and return the
    /// stored version.
    ///
    /// The entity is validated before any store access.
    async fn save(&self, entity: &T) -> AppResult<T>;

    /// Remove an entity by id.
    ///
    /// Removing an id that does not exist is not an error: the call returns
    /// `Ok(false)`. `Ok(true)` means a stored entity was removed.
    async fn remove_by_id(&self, id: T::Id) -> AppResult<bool>;
}

//! # Store Trait
//!
//! The backend half of a resource: CRUD against whatever holds the remote objects. The
//! adapter only ever sees a `Store<A>`, so the same adapter serves the real HTTP client
//! and the in-memory [`MockStore`](crate::mock::MockStore) used in tests.

use crate::error::FrameworkError;
use crate::model::ResourceKey;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait Store<A: Send + Sync>: Send + Sync {
    /// Creates `object` under `parents` and returns the server's view of it.
    async fn create(&self, parents: &[String], object: &A) -> Result<A, FrameworkError>;

    async fn read(&self, key: &ResourceKey) -> Result<A, FrameworkError>;

    async fn update(&self, key: &ResourceKey, object: &A) -> Result<A, FrameworkError>;

    /// Returns [`FrameworkError::NotFound`] when the object is already gone.
    async fn delete(&self, key: &ResourceKey) -> Result<(), FrameworkError>;
}

#[async_trait]
impl<A, S> Store<A> for Arc<S>
where
    A: Send + Sync,
    S: Store<A> + ?Sized,
{
    async fn create(&self, parents: &[String], object: &A) -> Result<A, FrameworkError> {
        (**self).create(parents, object).await
    }

    async fn read(&self, key: &ResourceKey) -> Result<A, FrameworkError> {
        (**self).read(key).await
    }

    async fn update(&self, key: &ResourceKey, object: &A) -> Result<A, FrameworkError> {
        (**self).update(key, object).await
    }

    async fn delete(&self, key: &ResourceKey) -> Result<(), FrameworkError> {
        (**self).delete(key).await
    }
}

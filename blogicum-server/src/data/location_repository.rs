use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::location::{Location, LocationRequest};

#[async_trait]
pub(crate) trait LocationRepository: Send + Sync {
    async fn create_location(&self, input: LocationRequest) -> Result<Location, DomainError>;
    async fn update_location(
        &self,
        id: i64,
        input: LocationRequest,
    ) -> Result<Option<Location>, DomainError>;
    /// Posts keep existing with their location cleared.
    async fn delete_location(&self, id: i64) -> Result<bool, DomainError>;
    async fn list_locations(&self) -> Result<Vec<Location>, DomainError>;
}

#[async_trait]
impl<T: LocationRepository + ?Sized> LocationRepository for Arc<T> {
    async fn create_location(&self, input: LocationRequest) -> Result<Location, DomainError> {
        (**self).create_location(input).await
    }

    async fn update_location(
        &self,
        id: i64,
        input: LocationRequest,
    ) -> Result<Option<Location>, DomainError> {
        (**self).update_location(id, input).await
    }

    async fn delete_location(&self, id: i64) -> Result<bool, DomainError> {
        (**self).delete_location(id).await
    }

    async fn list_locations(&self) -> Result<Vec<Location>, DomainError> {
        (**self).list_locations().await
    }
}

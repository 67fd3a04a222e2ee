use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::category::{Category, CategoryRequest};
use crate::domain::error::DomainError;

#[async_trait]
pub(crate) trait CategoryRepository: Send + Sync {
    async fn create_category(&self, input: CategoryRequest) -> Result<Category, DomainError>;
    async fn update_category(
        &self,
        id: i64,
        input: CategoryRequest,
    ) -> Result<Option<Category>, DomainError>;
    /// Deleting a category deletes its posts.
    async fn delete_category(&self, id: i64) -> Result<bool, DomainError>;
    async fn list_categories(&self) -> Result<Vec<Category>, DomainError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError>;
}

#[async_trait]
impl<T: CategoryRepository + ?Sized> CategoryRepository for Arc<T> {
    async fn create_category(&self, input: CategoryRequest) -> Result<Category, DomainError> {
        (**self).create_category(input).await
    }

    async fn update_category(
        &self,
        id: i64,
        input: CategoryRequest,
    ) -> Result<Option<Category>, DomainError> {
        (**self).update_category(id, input).await
    }

    async fn delete_category(&self, id: i64) -> Result<bool, DomainError> {
        (**self).delete_category(id).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        (**self).list_categories().await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        (**self).find_by_slug(slug).await
    }
}

//! Ownership guard for author-owned entities.

use tracing::warn;

use super::error::DomainError;

/// Entity whose mutations are reserved to its author.
pub(crate) trait Owned {
    const KIND: &'static str;

    fn id(&self) -> i64;
    fn author_id(&self) -> i64;
}

/// Fails with [`DomainError::Forbidden`] unless `actor_id` authored `entity`.
pub(crate) fn ensure_owner<T: Owned>(actor_id: i64, entity: &T) -> Result<(), DomainError> {
    if entity.author_id() != actor_id {
        warn!(
            kind = T::KIND,
            id = entity.id(),
            actor_id,
            "ownership check failed"
        );
        return Err(DomainError::Forbidden);
    }
    Ok(())
}

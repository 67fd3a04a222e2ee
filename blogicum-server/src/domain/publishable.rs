use chrono::{DateTime, Utc};

/// Shared shape of entities that can be hidden by an editor.
pub(crate) trait Publishable {
    fn is_published(&self) -> bool;
    fn created_at(&self) -> DateTime<Utc>;
}

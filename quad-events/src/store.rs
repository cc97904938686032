use async_trait::async_trait;
use quad_core::repository::StoreError;
use uuid::Uuid;

use crate::model::{Event, EventKind};

/// Repository trait for the five event collections
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert(&self, event: &Event) -> Result<(), StoreError>;

    async fn get(&self, kind: EventKind, id: Uuid) -> Result<Option<Event>, StoreError>;

    /// Batched multi-id fetch within one kind. Missing ids are simply absent
    /// from the result; they are not an error.
    async fn get_many(&self, kind: EventKind, ids: &[Uuid]) -> Result<Vec<Event>, StoreError>;

    async fn list(&self, kind: EventKind, include_archived: bool)
        -> Result<Vec<Event>, StoreError>;

    async fn replace(&self, event: &Event) -> Result<(), StoreError>;

    /// Adjust a bazar's approved-booth counter. Implementations clamp the
    /// stored value at zero.
    async fn adjust_bazar_participation(&self, bazar_id: Uuid, delta: i64)
        -> Result<(), StoreError>;
}

use async_trait::async_trait;
use quad_core::repository::StoreError;
use uuid::Uuid;

use crate::models::FavouriteReference;

/// Repository trait for per-user favourite lists
#[async_trait]
pub trait FavouriteStore: Send + Sync {
    /// The user's references in the order they were added.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<FavouriteReference>, StoreError>;

    /// Append a reference; adding an already-present reference is a no-op.
    async fn add(&self, user_id: Uuid, reference: &FavouriteReference) -> Result<(), StoreError>;

    /// Returns whether a reference was actually removed.
    async fn remove(
        &self,
        user_id: Uuid,
        item_type: &str,
        item_id: Uuid,
    ) -> Result<bool, StoreError>;
}

use async_trait::async_trait;
use uuid::Uuid;

use crate::identity::{Role, User};

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Repository trait for user account lookups
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, StoreError>;
}

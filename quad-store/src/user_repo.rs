use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, to_bson};
use mongodb::Collection;
use quad_core::identity::{Role, User};
use quad_core::repository::{StoreError, UserStore};
use uuid::Uuid;

use crate::database::DbClient;

pub struct MongoUserStore {
    db: DbClient,
}

impl MongoUserStore {
    pub fn new(db: DbClient) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<User> {
        self.db.collection("users")
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self
            .collection()
            .find_one(doc! { "_id": id.to_string() })
            .await?)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        let mut cursor = self
            .collection()
            .find(doc! { "role": to_bson(&role)? })
            .await?;
        let mut users = Vec::new();
        while let Some(user) = cursor.try_next().await? {
            users.push(user);
        }
        Ok(users)
    }
}

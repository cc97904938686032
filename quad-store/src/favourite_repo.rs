use async_trait::async_trait;
use mongodb::bson::{doc, to_bson};
use mongodb::Collection;
use quad_core::repository::StoreError;
use quad_favourites::{FavouriteReference, FavouriteStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::DbClient;

/// One document per user; the array keeps insertion order.
#[derive(Debug, Serialize, Deserialize)]
struct FavouritesDoc {
    #[serde(rename = "_id")]
    user_id: Uuid,
    #[serde(default)]
    items: Vec<FavouriteReference>,
}

pub struct MongoFavouriteStore {
    db: DbClient,
}

impl MongoFavouriteStore {
    pub fn new(db: DbClient) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<FavouritesDoc> {
        self.db.collection("favourites")
    }
}

#[async_trait]
impl FavouriteStore for MongoFavouriteStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<FavouriteReference>, StoreError> {
        Ok(self
            .collection()
            .find_one(doc! { "_id": user_id.to_string() })
            .await?
            .map(|d| d.items)
            .unwrap_or_default())
    }

    async fn add(&self, user_id: Uuid, reference: &FavouriteReference) -> Result<(), StoreError> {
        let existing = self.list_for_user(user_id).await?;
        if existing
            .iter()
            .any(|r| r.item_type == reference.item_type && r.item_id == reference.item_id)
        {
            return Ok(());
        }
        let item = to_bson(reference)?;
        self.collection()
            .update_one(
                doc! { "_id": user_id.to_string() },
                doc! { "$push": { "items": item } },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn remove(
        &self,
        user_id: Uuid,
        item_type: &str,
        item_id: Uuid,
    ) -> Result<bool, StoreError> {
        let result = self
            .collection()
            .update_one(
                doc! { "_id": user_id.to_string() },
                doc! { "$pull": { "items": { "itemType": item_type, "itemId": item_id.to_string() } } },
            )
            .await?;
        Ok(result.modified_count > 0)
    }
}

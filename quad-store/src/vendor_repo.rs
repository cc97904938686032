use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{doc, to_bson, Document};
use mongodb::Collection;
use quad_core::repository::StoreError;
use quad_vendor::{RequestStatus, VendorRequest, VendorRequestStore};
use uuid::Uuid;

use crate::database::DbClient;

pub struct MongoVendorRequestStore {
    db: DbClient,
}

impl MongoVendorRequestStore {
    pub fn new(db: DbClient) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<VendorRequest> {
        self.db.collection("vendor_requests")
    }

    async fn find_all(&self, filter: Document) -> Result<Vec<VendorRequest>, StoreError> {
        let mut cursor = self.collection().find(filter).await?;
        let mut requests = Vec::new();
        while let Some(request) = cursor.try_next().await? {
            requests.push(request);
        }
        Ok(requests)
    }
}

#[async_trait]
impl VendorRequestStore for MongoVendorRequestStore {
    async fn insert(&self, request: &VendorRequest) -> Result<(), StoreError> {
        self.collection().insert_one(request).await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<VendorRequest>, StoreError> {
        Ok(self
            .collection()
            .find_one(doc! { "_id": id.to_string() })
            .await?)
    }

    async fn list_for_vendor(&self, vendor_id: Uuid) -> Result<Vec<VendorRequest>, StoreError> {
        self.find_all(doc! { "vendorId": vendor_id.to_string() })
            .await
    }

    async fn list_by_status(
        &self,
        status: RequestStatus,
    ) -> Result<Vec<VendorRequest>, StoreError> {
        self.find_all(doc! { "status": to_bson(&status)? }).await
    }

    async fn replace(&self, request: &VendorRequest) -> Result<(), StoreError> {
        self.collection()
            .replace_one(doc! { "_id": request.id.to_string() }, request)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn list_payment_lapsed(
        &self,
        before: DateTime<Utc>,
    ) -> Result<Vec<VendorRequest>, StoreError> {
        // Status filtering happens server-side; the deadline comparison is
        // done here because the due date is stored as an RFC 3339 string.
        let candidates = self
            .find_all(doc! {
                "status": to_bson(&RequestStatus::Approved)?,
                "paymentStatus": { "$in": ["unpaid", "overdue"] },
            })
            .await?;
        Ok(candidates
            .into_iter()
            .filter(|r| r.payment_due_at.is_some_and(|due| due < before))
            .collect())
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quad_core::repository::StoreError;
use uuid::Uuid;

use crate::models::{RequestStatus, VendorRequest};

/// Repository trait for vendor request access
#[async_trait]
pub trait VendorRequestStore: Send + Sync {
    async fn insert(&self, request: &VendorRequest) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<VendorRequest>, StoreError>;

    async fn list_for_vendor(&self, vendor_id: Uuid) -> Result<Vec<VendorRequest>, StoreError>;

    async fn list_by_status(&self, status: RequestStatus)
        -> Result<Vec<VendorRequest>, StoreError>;

    async fn replace(&self, request: &VendorRequest) -> Result<(), StoreError>;

    /// Approved requests whose payment deadline passed before `before` and
    /// whose payment is still outstanding (unpaid or overdue).
    async fn list_payment_lapsed(
        &self,
        before: DateTime<Utc>,
    ) -> Result<Vec<VendorRequest>, StoreError>;
}

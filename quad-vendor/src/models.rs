use chrono::{DateTime, Utc};
use quad_events::BoothSize;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A request names between one and five people staffing the booth.
pub const MAX_PEOPLE: usize = 5;

/// Request status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

/// Payment status, moving independently of the request status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Overdue,
    Cancelled,
}

/// A vendor's application for a booth.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorRequest {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub people: Vec<String>,
    pub booth_size: BoothSize,
    pub is_bazar_booth: bool,
    #[serde(default)]
    pub bazar_id: Option<Uuid>,
    /// Requested stand duration in days, for standalone booths.
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    pub status: RequestStatus,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,
    /// The booth record created on approval.
    #[serde(default)]
    pub booth_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VendorRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        vendor_id: Uuid,
        people: Vec<String>,
        booth_size: BoothSize,
        is_bazar_booth: bool,
        bazar_id: Option<Uuid>,
        duration: Option<i64>,
        location: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            vendor_id,
            people,
            booth_size,
            is_bazar_booth,
            bazar_id,
            duration,
            location,
            status: RequestStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            payment_due_at: None,
            cancelled_at: None,
            booth_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use quad_core::identity::Role;
use quad_core::mailer::Mailer;
use quad_core::repository::{StoreError, UserStore};
use quad_events::{Booth, Event, EventKind, EventStore};
use tracing::warn;
use uuid::Uuid;

use crate::models::{PaymentStatus, RequestStatus, VendorRequest};
use crate::store::VendorRequestStore;

/// Who asked for the cancellation; drives the notification wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOrigin {
    Vendor,
    System,
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("vendor request not found: {0}")]
    NotFound(Uuid),

    #[error("request cannot be cancelled while {0:?}")]
    InvalidStatus(RequestStatus),

    #[error("request has already been paid")]
    Paid,

    #[error("the linked event has already started")]
    EventStarted,

    #[error("cannot move a {from:?} request to {to:?}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

impl LifecycleError {
    /// Machine-readable code for the API error body.
    pub fn code(&self) -> &'static str {
        match self {
            LifecycleError::NotFound(_) => "NOT_FOUND",
            LifecycleError::InvalidStatus(_) | LifecycleError::InvalidTransition { .. } => {
                "INVALID_STATUS"
            }
            LifecycleError::Paid => "PAID",
            LifecycleError::EventStarted => "EVENT_STARTED",
            LifecycleError::Store(_) => "INTERNAL",
        }
    }
}

/// The cancellation eligibility guard, checked in order so the caller learns
/// which condition failed first.
pub fn cancellation_guard(
    request: &VendorRequest,
    event_start: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), LifecycleError> {
    if !matches!(
        request.status,
        RequestStatus::Pending | RequestStatus::Approved
    ) {
        return Err(LifecycleError::InvalidStatus(request.status));
    }
    if request.payment_status == PaymentStatus::Paid {
        return Err(LifecycleError::Paid);
    }
    if let Some(start) = event_start {
        if start <= now {
            return Err(LifecycleError::EventStarted);
        }
    }
    Ok(())
}

/// Governs a vendor request from Pending through Approved/Rejected to
/// Cancelled. All collaborators are injected; nothing here holds state.
pub struct RequestLifecycle {
    requests: Arc<dyn VendorRequestStore>,
    events: Arc<dyn EventStore>,
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    payment_window: Duration,
}

impl RequestLifecycle {
    pub fn new(
        requests: Arc<dyn VendorRequestStore>,
        events: Arc<dyn EventStore>,
        users: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        payment_window_days: i64,
    ) -> Self {
        Self {
            requests,
            events,
            users,
            mailer,
            payment_window: Duration::days(payment_window_days),
        }
    }

    async fn load(&self, id: Uuid) -> Result<VendorRequest, LifecycleError> {
        self.requests
            .get(id)
            .await?
            .ok_or(LifecycleError::NotFound(id))
    }

    /// Transition: Pending → Approved. Creates the booth record, counts the
    /// booth into its bazar, and starts the payment clock.
    pub async fn approve(&self, id: Uuid) -> Result<VendorRequest, LifecycleError> {
        let mut request = self.load(id).await?;
        if request.status != RequestStatus::Pending {
            return Err(LifecycleError::InvalidTransition {
                from: request.status,
                to: RequestStatus::Approved,
            });
        }

        let vendor = self.users.get_user(request.vendor_id).await?;
        let booth = Booth {
            id: Uuid::new_v4(),
            name: vendor
                .as_ref()
                .map(|v| format!("{} booth", v.name))
                .unwrap_or_else(|| "Vendor booth".to_string()),
            vendor_id: request.vendor_id,
            bazar_id: request.bazar_id,
            location: request.location.clone(),
            booth_size: request.booth_size,
            duration: request.duration,
            start_date: None,
            start_time: None,
            people: request.people.clone(),
            archive: false,
        };
        self.events.insert(&Event::Booth(booth.clone())).await?;

        if request.is_bazar_booth {
            if let Some(bazar_id) = request.bazar_id {
                self.events.adjust_bazar_participation(bazar_id, 1).await?;
            }
        }

        let now = Utc::now();
        request.status = RequestStatus::Approved;
        request.booth_id = Some(booth.id);
        request.payment_due_at = Some(now + self.payment_window);
        request.touch();
        self.requests.replace(&request).await?;

        let due = request.payment_due_at.unwrap_or(now);
        self.notify_vendor(
            &request,
            "Booth request approved",
            &format!(
                "Your booth request has been approved. Payment is due by {}.",
                due.format("%Y-%m-%d")
            ),
        )
        .await;

        Ok(request)
    }

    /// Transition: Pending → Rejected.
    pub async fn reject(&self, id: Uuid) -> Result<VendorRequest, LifecycleError> {
        let mut request = self.load(id).await?;
        if request.status != RequestStatus::Pending {
            return Err(LifecycleError::InvalidTransition {
                from: request.status,
                to: RequestStatus::Rejected,
            });
        }

        request.status = RequestStatus::Rejected;
        request.touch();
        self.requests.replace(&request).await?;

        self.notify_vendor(
            &request,
            "Booth request rejected",
            "Your booth request has been rejected by the events office.",
        )
        .await;

        Ok(request)
    }

    /// Payment moves independently of the request status.
    pub async fn mark_paid(&self, id: Uuid) -> Result<VendorRequest, LifecycleError> {
        let mut request = self.load(id).await?;
        if request.status != RequestStatus::Approved {
            return Err(LifecycleError::InvalidStatus(request.status));
        }
        if request.payment_status == PaymentStatus::Paid {
            return Err(LifecycleError::Paid);
        }

        request.payment_status = PaymentStatus::Paid;
        request.touch();
        self.requests.replace(&request).await?;
        Ok(request)
    }

    /// Cancel a pending or approved, still-unpaid request before its event
    /// starts. Unwinds the approval side effects and notifies everyone.
    pub async fn cancel(
        &self,
        id: Uuid,
        origin: CancelOrigin,
    ) -> Result<VendorRequest, LifecycleError> {
        let mut request = self.load(id).await?;
        let event_start = self.linked_event_start(&request).await?;
        let now = Utc::now();
        cancellation_guard(&request, event_start, now)?;

        let was_approved = request.status == RequestStatus::Approved;
        request.status = RequestStatus::Cancelled;
        // An already-overdue payment keeps its status for reporting.
        if request.payment_status == PaymentStatus::Unpaid {
            request.payment_status = PaymentStatus::Cancelled;
        }
        request.cancelled_at = Some(now);
        request.touch();

        if let Some(booth_id) = request.booth_id {
            if let Some(mut booth) = self.events.get(EventKind::Booth, booth_id).await? {
                booth.set_archived(true);
                self.events.replace(&booth).await?;
            }
        }
        // Only approval counted the booth into the bazar; a request
        // cancelled while still pending was never counted.
        if was_approved && request.is_bazar_booth {
            if let Some(bazar_id) = request.bazar_id {
                self.events.adjust_bazar_participation(bazar_id, -1).await?;
            }
        }
        self.requests.replace(&request).await?;

        let (subject, body) = match origin {
            CancelOrigin::Vendor => (
                "Booth request cancelled",
                "Your booth request has been cancelled as you asked.".to_string(),
            ),
            CancelOrigin::System => (
                "Booth request cancelled automatically",
                match request.payment_due_at {
                    Some(due) => format!(
                        "Your booth request was cancelled automatically because payment was not received by {}.",
                        due.format("%Y-%m-%d")
                    ),
                    None => "Your booth request was cancelled automatically because payment was not received in time.".to_string(),
                },
            ),
        };
        self.notify_vendor(&request, subject, &body).await;
        self.notify_staff(
            "Booth request cancelled",
            &format!("Vendor request {} is now cancelled.", request.id),
        )
        .await;

        Ok(request)
    }

    async fn linked_event_start(
        &self,
        request: &VendorRequest,
    ) -> Result<Option<DateTime<Utc>>, LifecycleError> {
        let target = if request.is_bazar_booth {
            request.bazar_id.map(|id| (EventKind::Bazar, id))
        } else {
            // A pending standalone request has no booth yet, hence no schedule.
            request.booth_id.map(|id| (EventKind::Booth, id))
        };
        let Some((kind, id)) = target else {
            return Ok(None);
        };
        let Some(event) = self.events.get(kind, id).await? else {
            return Ok(None);
        };
        Ok(event.starts_at())
    }

    async fn notify_vendor(&self, request: &VendorRequest, subject: &str, body: &str) {
        match self.users.get_user(request.vendor_id).await {
            Ok(Some(vendor)) => {
                if let Err(err) = self.mailer.send(&vendor.email, subject, body).await {
                    warn!(request = %request.id, error = %err, "vendor notification failed");
                }
            }
            Ok(None) => {
                warn!(request = %request.id, "vendor account missing, skipping notification");
            }
            Err(err) => {
                warn!(request = %request.id, error = %err, "vendor lookup failed, skipping notification");
            }
        }
    }

    async fn notify_staff(&self, subject: &str, body: &str) {
        for role in [Role::EventsOffice, Role::Admin] {
            match self.users.list_by_role(role).await {
                Ok(users) => {
                    for user in users {
                        if let Err(err) = self.mailer.send(&user.email, subject, body).await {
                            warn!(error = %err, "staff notification failed");
                        }
                    }
                }
                Err(err) => warn!(error = %err, "staff lookup failed"),
            }
        }
    }

    pub(crate) fn requests(&self) -> &dyn VendorRequestStore {
        self.requests.as_ref()
    }
}

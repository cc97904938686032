use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use quad_core::identity::{Role, User};
use quad_core::mailer::Mailer;
use quad_core::repository::{StoreError, UserStore};
use quad_events::{Bazar, BoothSize, Event, EventKind, EventStore};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::lifecycle::RequestLifecycle;
use crate::models::{PaymentStatus, RequestStatus, VendorRequest};
use crate::store::VendorRequestStore;

pub const VENDOR_EMAIL: &str = "vendor@market.example";
pub const OFFICE_EMAIL: &str = "office@uni.example";

fn vendor_id() -> Uuid {
    Uuid::from_u128(0xfeed)
}

#[derive(Default)]
pub struct MemEventStore {
    events: RwLock<HashMap<(EventKind, Uuid), Event>>,
}

#[async_trait]
impl EventStore for MemEventStore {
    async fn insert(&self, event: &Event) -> Result<(), StoreError> {
        self.events
            .write()
            .await
            .insert((event.kind(), event.id()), event.clone());
        Ok(())
    }

    async fn get(&self, kind: EventKind, id: Uuid) -> Result<Option<Event>, StoreError> {
        Ok(self.events.read().await.get(&(kind, id)).cloned())
    }

    async fn get_many(&self, kind: EventKind, ids: &[Uuid]) -> Result<Vec<Event>, StoreError> {
        let events = self.events.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| events.get(&(kind, *id)).cloned())
            .collect())
    }

    async fn list(
        &self,
        kind: EventKind,
        include_archived: bool,
    ) -> Result<Vec<Event>, StoreError> {
        Ok(self
            .events
            .read()
            .await
            .values()
            .filter(|e| e.kind() == kind && (include_archived || !e.is_archived()))
            .cloned()
            .collect())
    }

    async fn replace(&self, event: &Event) -> Result<(), StoreError> {
        self.insert(event).await
    }

    async fn adjust_bazar_participation(
        &self,
        bazar_id: Uuid,
        delta: i64,
    ) -> Result<(), StoreError> {
        let mut events = self.events.write().await;
        if let Some(Event::Bazar(bazar)) = events.get_mut(&(EventKind::Bazar, bazar_id)) {
            bazar.vendor_participation = (bazar.vendor_participation + delta).max(0);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemRequestStore {
    requests: RwLock<HashMap<Uuid, VendorRequest>>,
}

#[async_trait]
impl VendorRequestStore for MemRequestStore {
    async fn insert(&self, request: &VendorRequest) -> Result<(), StoreError> {
        self.requests
            .write()
            .await
            .insert(request.id, request.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<VendorRequest>, StoreError> {
        Ok(self.requests.read().await.get(&id).cloned())
    }

    async fn list_for_vendor(&self, vendor_id: Uuid) -> Result<Vec<VendorRequest>, StoreError> {
        Ok(self
            .requests
            .read()
            .await
            .values()
            .filter(|r| r.vendor_id == vendor_id)
            .cloned()
            .collect())
    }

    async fn list_by_status(
        &self,
        status: RequestStatus,
    ) -> Result<Vec<VendorRequest>, StoreError> {
        Ok(self
            .requests
            .read()
            .await
            .values()
            .filter(|r| r.status == status)
            .cloned()
            .collect())
    }

    async fn replace(&self, request: &VendorRequest) -> Result<(), StoreError> {
        self.insert(request).await
    }

    async fn list_payment_lapsed(
        &self,
        before: chrono::DateTime<Utc>,
    ) -> Result<Vec<VendorRequest>, StoreError> {
        Ok(self
            .requests
            .read()
            .await
            .values()
            .filter(|r| {
                r.status == RequestStatus::Approved
                    && matches!(
                        r.payment_status,
                        PaymentStatus::Unpaid | PaymentStatus::Overdue
                    )
                    && r.payment_due_at.is_some_and(|due| due < before)
            })
            .cloned()
            .collect())
    }
}

pub struct StaticUserStore {
    users: Vec<User>,
}

#[async_trait]
impl UserStore for StaticUserStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        Ok(self
            .users
            .iter()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), StoreError> {
        self.sent
            .lock()
            .await
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

impl RecordingMailer {
    pub async fn sent_to(&self, address: &str) -> usize {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(to, _, _)| to == address)
            .count()
    }

    pub async fn last_subject_to(&self, address: &str) -> Option<String> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|(to, _, _)| to == address)
            .map(|(_, subject, _)| subject.clone())
    }
}

pub struct Fixtures {
    pub events: Arc<MemEventStore>,
    pub requests: Arc<MemRequestStore>,
    pub mailer: Arc<RecordingMailer>,
    pub lifecycle: RequestLifecycle,
}

impl Fixtures {
    pub async fn seed_bazar(&self, participation: i64) -> Uuid {
        self.seed_bazar_starting(Utc::now() + Duration::days(10), participation)
            .await
    }

    pub async fn seed_started_bazar(&self) -> Uuid {
        self.seed_bazar_starting(Utc::now() - Duration::days(1), 1)
            .await
    }

    async fn seed_bazar_starting(
        &self,
        start: chrono::DateTime<Utc>,
        participation: i64,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let bazar = Bazar {
            id,
            name: "Spring bazar".to_string(),
            description: None,
            start_date: Some(start.date_naive()),
            start_time: Some(start.time()),
            end_date: None,
            end_time: None,
            registration_deadline: None,
            capacity: 500,
            price: 0.0,
            vendor_participation: participation,
            booths: Vec::new(),
            attendees: Vec::new(),
            registered: Vec::new(),
            ratings: Vec::new(),
            user_comments: Vec::new(),
            archive: false,
        };
        self.events.insert(&Event::Bazar(bazar)).await.unwrap();
        id
    }

    pub async fn bazar_participation(&self, bazar_id: Uuid) -> i64 {
        match self
            .events
            .get(EventKind::Bazar, bazar_id)
            .await
            .unwrap()
            .unwrap()
        {
            Event::Bazar(bazar) => bazar.vendor_participation,
            _ => unreachable!(),
        }
    }
}

pub fn fixtures() -> Fixtures {
    let events = Arc::new(MemEventStore::default());
    let requests = Arc::new(MemRequestStore::default());
    let mailer = Arc::new(RecordingMailer::default());
    let users = Arc::new(StaticUserStore {
        users: vec![
            User {
                id: vendor_id(),
                name: "Koshary Corner".to_string(),
                email: VENDOR_EMAIL.to_string(),
                role: Role::Vendor,
            },
            User {
                id: Uuid::from_u128(0x0ff1ce),
                name: "Events Office".to_string(),
                email: OFFICE_EMAIL.to_string(),
                role: Role::EventsOffice,
            },
        ],
    });

    let lifecycle = RequestLifecycle::new(
        requests.clone(),
        events.clone(),
        users,
        mailer.clone(),
        7,
    );

    Fixtures {
        events,
        requests,
        mailer,
        lifecycle,
    }
}

pub fn pending_request() -> VendorRequest {
    VendorRequest::new(
        vendor_id(),
        vec!["Aya".to_string(), "Omar".to_string()],
        BoothSize::Medium,
        false,
        None,
        Some(3),
        Some("Platform area".to_string()),
    )
}

pub fn approved_request() -> VendorRequest {
    let mut request = pending_request();
    request.status = RequestStatus::Approved;
    request.payment_due_at = Some(Utc::now() + Duration::days(7));
    request
}

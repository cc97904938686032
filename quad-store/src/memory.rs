//! In-memory repositories for tests and local development without a
//! database. Semantics mirror the Mongo implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quad_core::identity::{Role, User};
use quad_core::mailer::Mailer;
use quad_core::repository::{StoreError, UserStore};
use quad_events::{Event, EventKind, EventStore};
use quad_favourites::{FavouriteReference, FavouriteStore};
use quad_vendor::{PaymentStatus, RequestStatus, VendorRequest, VendorRequestStore};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryEventStore {
    events: RwLock<HashMap<(EventKind, Uuid), Event>>,
}

#[async_trait]
impl EventStore for MemoryEventStore {
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
pub struct MemoryFavouriteStore {
    items: RwLock<HashMap<Uuid, Vec<FavouriteReference>>>,
}

#[async_trait]
impl FavouriteStore for MemoryFavouriteStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<FavouriteReference>, StoreError> {
        Ok(self
            .items
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add(&self, user_id: Uuid, reference: &FavouriteReference) -> Result<(), StoreError> {
        let mut items = self.items.write().await;
        let list = items.entry(user_id).or_default();
        if !list
            .iter()
            .any(|r| r.item_type == reference.item_type && r.item_id == reference.item_id)
        {
            list.push(reference.clone());
        }
        Ok(())
    }

    async fn remove(
        &self,
        user_id: Uuid,
        item_type: &str,
        item_id: Uuid,
    ) -> Result<bool, StoreError> {
        let mut items = self.items.write().await;
        let Some(list) = items.get_mut(&user_id) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|r| !(r.item_type == item_type && r.item_id == item_id));
        Ok(list.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryVendorRequestStore {
    requests: RwLock<HashMap<Uuid, VendorRequest>>,
}

#[async_trait]
impl VendorRequestStore for MemoryVendorRequestStore {
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
        before: DateTime<Utc>,
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

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn with_users(users: Vec<User>) -> Self {
        let map = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            users: RwLock::new(map),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }
}

/// Captures outbound mail so tests can assert on delivery.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), StoreError> {
        self.sent.lock().await.push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

impl RecordingMailer {
    pub async fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_to(&self, address: &str) -> usize {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|mail| mail.to == address)
            .count()
    }
}

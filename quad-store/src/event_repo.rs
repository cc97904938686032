use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::Collection;
use quad_core::repository::StoreError;
use quad_events::{Bazar, Booth, Conference, Event, EventKind, EventStore, Trip, Workshop};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::database::DbClient;

/// Event storage over the five per-kind collections.
pub struct MongoEventStore {
    db: DbClient,
}

impl MongoEventStore {
    pub fn new(db: DbClient) -> Self {
        Self { db }
    }

    fn trips(&self) -> Collection<Trip> {
        self.db.collection("trips")
    }

    fn workshops(&self) -> Collection<Workshop> {
        self.db.collection("workshops")
    }

    fn bazars(&self) -> Collection<Bazar> {
        self.db.collection("bazars")
    }

    fn conferences(&self) -> Collection<Conference> {
        self.db.collection("conferences")
    }

    fn booths(&self) -> Collection<Booth> {
        self.db.collection("booths")
    }
}

fn id_filter(id: Uuid) -> Document {
    doc! { "_id": id.to_string() }
}

fn ids_filter(ids: &[Uuid]) -> Document {
    let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();
    doc! { "_id": { "$in": ids } }
}

fn archive_filter(include_archived: bool) -> Document {
    if include_archived {
        doc! {}
    } else {
        // Legacy documents may lack the flag entirely.
        doc! { "archive": { "$ne": true } }
    }
}

async fn fetch_one<T, F>(
    collection: Collection<T>,
    id: Uuid,
    wrap: F,
) -> Result<Option<Event>, StoreError>
where
    T: DeserializeOwned + Send + Sync,
    F: Fn(T) -> Event,
{
    Ok(collection.find_one(id_filter(id)).await?.map(wrap))
}

async fn fetch_all<T, F>(
    collection: Collection<T>,
    filter: Document,
    wrap: F,
) -> Result<Vec<Event>, StoreError>
where
    T: DeserializeOwned + Send + Sync,
    F: Fn(T) -> Event,
{
    let mut cursor = collection.find(filter).await?;
    let mut events = Vec::new();
    while let Some(record) = cursor.try_next().await? {
        events.push(wrap(record));
    }
    Ok(events)
}

async fn upsert_by_id<T>(
    collection: Collection<T>,
    id: Uuid,
    record: &T,
) -> Result<(), StoreError>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    collection
        .replace_one(id_filter(id), record)
        .upsert(true)
        .await?;
    Ok(())
}

#[async_trait]
impl EventStore for MongoEventStore {
    async fn insert(&self, event: &Event) -> Result<(), StoreError> {
        match event {
            Event::Trip(t) => {
                self.trips().insert_one(t).await?;
            }
            Event::Workshop(w) => {
                self.workshops().insert_one(w).await?;
            }
            Event::Bazar(b) => {
                self.bazars().insert_one(b).await?;
            }
            Event::Conference(c) => {
                self.conferences().insert_one(c).await?;
            }
            Event::Booth(b) => {
                self.booths().insert_one(b).await?;
            }
        }
        Ok(())
    }

    async fn get(&self, kind: EventKind, id: Uuid) -> Result<Option<Event>, StoreError> {
        match kind {
            EventKind::Trip => fetch_one(self.trips(), id, Event::Trip).await,
            EventKind::Workshop => fetch_one(self.workshops(), id, Event::Workshop).await,
            EventKind::Bazar => fetch_one(self.bazars(), id, Event::Bazar).await,
            EventKind::Conference => fetch_one(self.conferences(), id, Event::Conference).await,
            EventKind::Booth => fetch_one(self.booths(), id, Event::Booth).await,
        }
    }

    async fn get_many(&self, kind: EventKind, ids: &[Uuid]) -> Result<Vec<Event>, StoreError> {
        let filter = ids_filter(ids);
        match kind {
            EventKind::Trip => fetch_all(self.trips(), filter, Event::Trip).await,
            EventKind::Workshop => fetch_all(self.workshops(), filter, Event::Workshop).await,
            EventKind::Bazar => fetch_all(self.bazars(), filter, Event::Bazar).await,
            EventKind::Conference => fetch_all(self.conferences(), filter, Event::Conference).await,
            EventKind::Booth => fetch_all(self.booths(), filter, Event::Booth).await,
        }
    }

    async fn list(
        &self,
        kind: EventKind,
        include_archived: bool,
    ) -> Result<Vec<Event>, StoreError> {
        let filter = archive_filter(include_archived);
        match kind {
            EventKind::Trip => fetch_all(self.trips(), filter, Event::Trip).await,
            EventKind::Workshop => fetch_all(self.workshops(), filter, Event::Workshop).await,
            EventKind::Bazar => fetch_all(self.bazars(), filter, Event::Bazar).await,
            EventKind::Conference => fetch_all(self.conferences(), filter, Event::Conference).await,
            EventKind::Booth => fetch_all(self.booths(), filter, Event::Booth).await,
        }
    }

    async fn replace(&self, event: &Event) -> Result<(), StoreError> {
        match event {
            Event::Trip(t) => upsert_by_id(self.trips(), t.id, t).await,
            Event::Workshop(w) => upsert_by_id(self.workshops(), w.id, w).await,
            Event::Bazar(b) => upsert_by_id(self.bazars(), b.id, b).await,
            Event::Conference(c) => upsert_by_id(self.conferences(), c.id, c).await,
            Event::Booth(b) => upsert_by_id(self.booths(), b.id, b).await,
        }
    }

    async fn adjust_bazar_participation(
        &self,
        bazar_id: Uuid,
        delta: i64,
    ) -> Result<(), StoreError> {
        let collection = self.bazars();
        collection
            .update_one(
                id_filter(bazar_id),
                doc! { "$inc": { "vendorParticipation": delta } },
            )
            .await?;
        if delta < 0 {
            // Clamp back to zero if the decrement undershot.
            collection
                .update_one(
                    doc! { "_id": bazar_id.to_string(), "vendorParticipation": { "$lt": 0 } },
                    doc! { "$set": { "vendorParticipation": 0 } },
                )
                .await?;
        }
        Ok(())
    }
}

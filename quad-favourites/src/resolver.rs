use std::collections::HashMap;

use quad_events::{Event, EventKind, EventStore};
use tracing::warn;
use uuid::Uuid;

use crate::models::{FavouriteReference, ResolvedFavourite};

/// Resolve a user's ordered reference list against the event collections.
///
/// Two passes: group ids by kind, issue one batched fetch per distinct kind
/// actually present, then re-walk the original list and attach the looked-up
/// record. Output length always equals input length and preserves input
/// order. A kind that fails to parse, or whose batched fetch fails, degrades
/// to `item: None` for its entries rather than aborting the whole list.
pub async fn resolve(
    store: &dyn EventStore,
    references: &[FavouriteReference],
) -> Vec<ResolvedFavourite> {
    let mut ids_by_kind: HashMap<EventKind, Vec<Uuid>> = HashMap::new();
    for reference in references {
        if let Ok(kind) = reference.item_type.parse::<EventKind>() {
            ids_by_kind.entry(kind).or_default().push(reference.item_id);
        }
    }

    let mut lookup: HashMap<(EventKind, Uuid), Event> = HashMap::new();
    for (kind, ids) in ids_by_kind {
        match store.get_many(kind, &ids).await {
            Ok(events) => {
                for event in events {
                    lookup.insert((kind, event.id()), event);
                }
            }
            Err(err) => {
                warn!(kind = %kind, error = %err, "favourite batch fetch failed, entries resolve to null");
            }
        }
    }

    references
        .iter()
        .map(|reference| ResolvedFavourite {
            item_type: reference.item_type.clone(),
            item_id: reference.item_id,
            added_at: reference.added_at,
            item: reference
                .item_type
                .parse::<EventKind>()
                .ok()
                .and_then(|kind| lookup.get(&(kind, reference.item_id)).cloned()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use quad_core::repository::StoreError;
    use quad_events::{Trip, Workshop};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixtureStore {
        events: Vec<Event>,
        batch_calls: AtomicUsize,
        failing_kind: Option<EventKind>,
    }

    impl FixtureStore {
        fn new(events: Vec<Event>) -> Self {
            Self {
                events,
                batch_calls: AtomicUsize::new(0),
                failing_kind: None,
            }
        }
    }

    #[async_trait]
    impl EventStore for FixtureStore {
        async fn insert(&self, _event: &Event) -> Result<(), StoreError> {
            unimplemented!("not used by the resolver")
        }

        async fn get(&self, _kind: EventKind, _id: Uuid) -> Result<Option<Event>, StoreError> {
            unimplemented!("not used by the resolver")
        }

        async fn get_many(
            &self,
            kind: EventKind,
            ids: &[Uuid],
        ) -> Result<Vec<Event>, StoreError> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing_kind == Some(kind) {
                return Err("collection unavailable".into());
            }
            Ok(self
                .events
                .iter()
                .filter(|e| e.kind() == kind && ids.contains(&e.id()))
                .cloned()
                .collect())
        }

        async fn list(
            &self,
            _kind: EventKind,
            _include_archived: bool,
        ) -> Result<Vec<Event>, StoreError> {
            unimplemented!("not used by the resolver")
        }

        async fn replace(&self, _event: &Event) -> Result<(), StoreError> {
            unimplemented!("not used by the resolver")
        }

        async fn adjust_bazar_participation(
            &self,
            _bazar_id: Uuid,
            _delta: i64,
        ) -> Result<(), StoreError> {
            unimplemented!("not used by the resolver")
        }
    }

    fn trip(id: Uuid) -> Event {
        Event::Trip(Trip {
            id,
            name: "Trip".to_string(),
            destination: None,
            description: None,
            start_date: None,
            start_time: None,
            end_date: None,
            end_time: None,
            registration_deadline: None,
            capacity: 20,
            price: 100.0,
            attendees: Vec::new(),
            registered: Vec::new(),
            ratings: Vec::new(),
            user_comments: Vec::new(),
            archive: false,
        })
    }

    fn workshop(id: Uuid) -> Event {
        Event::Workshop(Workshop {
            id,
            name: "Workshop".to_string(),
            faculty: None,
            professors: Vec::new(),
            description: None,
            start_date: None,
            start_time: None,
            end_date: None,
            end_time: None,
            registration_deadline: None,
            duration: None,
            capacity: 20,
            price: 0.0,
            attendees: Vec::new(),
            registered: Vec::new(),
            ratings: Vec::new(),
            user_comments: Vec::new(),
            archive: false,
        })
    }

    fn reference(item_type: &str, item_id: Uuid) -> FavouriteReference {
        FavouriteReference {
            item_type: item_type.to_string(),
            item_id,
            added_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn one_batched_query_per_distinct_kind() {
        let (t1, t2, w1) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let store = FixtureStore::new(vec![trip(t1), trip(t2), workshop(w1)]);
        let refs = vec![
            reference("trip", t1),
            reference("workshop", w1),
            reference("trip", t2),
        ];

        let resolved = resolve(&store, &refs).await;

        assert_eq!(resolved.len(), 3);
        // 3 references, 2 distinct kinds: exactly 2 batched fetches.
        assert_eq!(store.batch_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn deleted_target_resolves_to_null_in_place() {
        let (t1, w1, t2) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        // t2 was deleted: it is referenced but not stored.
        let store = FixtureStore::new(vec![trip(t1), workshop(w1)]);
        let refs = vec![
            reference("trip", t1),
            reference("workshop", w1),
            reference("trip", t2),
        ];

        let resolved = resolve(&store, &refs).await;

        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].item_type, "trip");
        assert!(resolved[0].item.is_some());
        assert_eq!(resolved[1].item_type, "workshop");
        assert!(resolved[1].item.is_some());
        assert_eq!(resolved[2].item_type, "trip");
        assert!(resolved[2].item.is_none());
    }

    #[tokio::test]
    async fn unrecognised_kind_resolves_to_null() {
        let t1 = Uuid::new_v4();
        let store = FixtureStore::new(vec![trip(t1)]);
        let refs = vec![reference("hackathon", Uuid::new_v4()), reference("trip", t1)];

        let resolved = resolve(&store, &refs).await;

        assert!(resolved[0].item.is_none());
        assert!(resolved[1].item.is_some());
        // The unknown kind never reaches the store.
        assert_eq!(store.batch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn one_failing_collection_does_not_abort_the_batch() {
        let (t1, w1) = (Uuid::new_v4(), Uuid::new_v4());
        let mut store = FixtureStore::new(vec![trip(t1), workshop(w1)]);
        store.failing_kind = Some(EventKind::Workshop);
        let refs = vec![reference("trip", t1), reference("workshop", w1)];

        let resolved = resolve(&store, &refs).await;

        assert_eq!(resolved.len(), 2);
        assert!(resolved[0].item.is_some());
        assert!(resolved[1].item.is_none());
    }
}

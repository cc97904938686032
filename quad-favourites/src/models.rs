use chrono::{DateTime, Utc};
use quad_events::Event;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-owned weak reference to an event. The kind is kept as the raw
/// stored string: nothing enforces that the target still exists, and legacy
/// documents may carry kinds that no longer parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavouriteReference {
    pub item_type: String,
    pub item_id: Uuid,
    pub added_at: DateTime<Utc>,
}

/// A reference with its lazily resolved target. `item: None` is a valid,
/// displayable state ("Event no longer available"), not an error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFavourite {
    pub item_type: String,
    pub item_id: Uuid,
    pub added_at: DateTime<Utc>,
    pub item: Option<Event>,
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::model::{Attendee, Event, EventKind};

pub const UNNAMED_EVENT: &str = "Unnamed Event";
pub const PROFESSOR_UNAVAILABLE: &str = "Professor Unavailable";

/// The uniform projection every event kind is displayed through.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub name: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub registration_deadline: Option<NaiveDate>,
    pub description: Option<String>,
    pub duration_days: Option<i64>,
    pub capacity: Option<u32>,
    pub price: Option<f64>,
    pub attendees: Vec<Attendee>,
    pub booths: Vec<Uuid>,
    pub professors: Vec<String>,
    /// The original record, for variant-specific rendering.
    pub raw: Value,
}

/// Project a raw event of any kind into the uniform display shape.
///
/// Pure: no lookups, no side effects. Missing dates or times degrade to
/// `None`, a blank name degrades to a placeholder, never an error.
pub fn normalize(event: &Event) -> EventView {
    let raw = serde_json::to_value(event).unwrap_or(Value::Null);
    let starts_at = event.starts_at();
    let ends_at = event.ends_at();

    match event {
        Event::Trip(t) => EventView {
            id: t.id,
            kind: EventKind::Trip,
            name: display_name(&t.name),
            starts_at,
            ends_at,
            registration_deadline: t.registration_deadline,
            description: t.description.clone(),
            duration_days: None,
            capacity: Some(t.capacity),
            price: Some(t.price),
            attendees: t.attendees.clone(),
            booths: Vec::new(),
            professors: Vec::new(),
            raw,
        },
        Event::Workshop(w) => EventView {
            id: w.id,
            kind: EventKind::Workshop,
            name: display_name(&w.name),
            starts_at,
            ends_at,
            registration_deadline: w.registration_deadline,
            description: w.description.clone(),
            // Explicit field wins; workshops fall back to the inclusive
            // day count between start and end dates.
            duration_days: w
                .duration
                .or_else(|| inclusive_days(w.start_date, w.end_date)),
            capacity: Some(w.capacity),
            price: Some(w.price),
            attendees: w.attendees.clone(),
            booths: Vec::new(),
            professors: w
                .professors
                .iter()
                .map(|p| match p {
                    Some(professor) => professor.name.clone(),
                    None => PROFESSOR_UNAVAILABLE.to_string(),
                })
                .collect(),
            raw,
        },
        Event::Bazar(b) => EventView {
            id: b.id,
            kind: EventKind::Bazar,
            name: display_name(&b.name),
            starts_at,
            ends_at,
            registration_deadline: b.registration_deadline,
            description: b.description.clone(),
            duration_days: None,
            capacity: Some(b.capacity),
            price: Some(b.price),
            attendees: b.attendees.clone(),
            booths: b.booths.clone(),
            professors: Vec::new(),
            raw,
        },
        Event::Conference(c) => EventView {
            id: c.id,
            kind: EventKind::Conference,
            name: display_name(&c.name),
            starts_at,
            ends_at,
            registration_deadline: c.registration_deadline,
            description: c.description.clone().or_else(|| c.agenda.clone()),
            duration_days: None,
            capacity: Some(c.capacity),
            price: Some(c.price),
            attendees: c.attendees.clone(),
            booths: Vec::new(),
            professors: Vec::new(),
            raw,
        },
        Event::Booth(b) => EventView {
            id: b.id,
            kind: EventKind::Booth,
            name: display_name(&b.name),
            starts_at,
            ends_at,
            registration_deadline: None,
            description: b.location.clone(),
            duration_days: b.duration,
            capacity: None,
            price: None,
            attendees: Vec::new(),
            booths: Vec::new(),
            professors: Vec::new(),
            raw,
        },
    }
}

fn display_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        UNNAMED_EVENT.to_string()
    } else {
        trimmed.to_string()
    }
}

fn inclusive_days(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<i64> {
    let (start, end) = (start?, end?);
    if end < start {
        return None;
    }
    Some((end - start).num_days() + 1)
}

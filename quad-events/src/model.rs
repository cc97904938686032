use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use quad_shared::pii::Masked;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Event kinds in the marketplace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Trip,
    Workshop,
    Bazar,
    Conference,
    Booth,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Trip,
        EventKind::Workshop,
        EventKind::Bazar,
        EventKind::Conference,
        EventKind::Booth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Trip => "trip",
            EventKind::Workshop => "workshop",
            EventKind::Bazar => "bazar",
            EventKind::Conference => "conference",
            EventKind::Booth => "booth",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown event kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trip" => Ok(EventKind::Trip),
            "workshop" => Ok(EventKind::Workshop),
            "bazar" => Ok(EventKind::Bazar),
            "conference" => Ok(EventKind::Conference),
            "booth" => Ok(EventKind::Booth),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoothSize {
    Small,
    Medium,
    Large,
}

/// A confirmed participant. Contact fields are masked in logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub user: Uuid,
    pub name: String,
    pub email: Masked<String>,
    #[serde(default)]
    pub phone: Option<Masked<String>>,
    pub paid: bool,
}

/// A pending-payment registrant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub user: Uuid,
    pub name: String,
    pub email: Masked<String>,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub user: Uuid,
    pub score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserComment {
    pub user: Uuid,
    pub text: String,
    pub posted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Professor {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

fn new_event_id() -> Uuid {
    Uuid::new_v4()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    #[serde(rename = "_id", default = "new_event_id")]
    pub id: Uuid,
    #[serde(rename = "tripname")]
    pub name: String,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    // Older documents used a handful of spellings for the deadline.
    #[serde(default, alias = "regDeadline", alias = "deadline")]
    pub registration_deadline: Option<NaiveDate>,
    pub capacity: u32,
    pub price: f64,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default)]
    pub registered: Vec<Registration>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
    #[serde(default)]
    pub user_comments: Vec<UserComment>,
    #[serde(default)]
    pub archive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workshop {
    #[serde(rename = "_id", default = "new_event_id")]
    pub id: Uuid,
    #[serde(rename = "workshopname")]
    pub name: String,
    #[serde(default)]
    pub faculty: Option<String>,
    /// Entries may be unpopulated when the referenced professor account is gone.
    #[serde(default)]
    pub professors: Vec<Option<Professor>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[serde(default, alias = "regDeadline", alias = "deadline")]
    pub registration_deadline: Option<NaiveDate>,
    /// Explicit duration in days; derived from the dates when absent.
    #[serde(default)]
    pub duration: Option<i64>,
    pub capacity: u32,
    pub price: f64,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default)]
    pub registered: Vec<Registration>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
    #[serde(default)]
    pub user_comments: Vec<UserComment>,
    #[serde(default)]
    pub archive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bazar {
    #[serde(rename = "_id", default = "new_event_id")]
    pub id: Uuid,
    #[serde(rename = "bazarname")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[serde(default, alias = "regDeadline", alias = "deadline")]
    pub registration_deadline: Option<NaiveDate>,
    pub capacity: u32,
    pub price: f64,
    /// Count of approved vendor booths; adjusted by the request lifecycle,
    /// never negative.
    #[serde(default)]
    pub vendor_participation: i64,
    #[serde(default)]
    pub booths: Vec<Uuid>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default)]
    pub registered: Vec<Registration>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
    #[serde(default)]
    pub user_comments: Vec<UserComment>,
    #[serde(default)]
    pub archive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conference {
    #[serde(rename = "_id", default = "new_event_id")]
    pub id: Uuid,
    #[serde(rename = "conferencename")]
    pub name: String,
    #[serde(default)]
    pub agenda: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[serde(default, alias = "regDeadline", alias = "deadline")]
    pub registration_deadline: Option<NaiveDate>,
    pub capacity: u32,
    pub price: f64,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default)]
    pub registered: Vec<Registration>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
    #[serde(default)]
    pub user_comments: Vec<UserComment>,
    #[serde(default)]
    pub archive: bool,
}

/// A vendor booth. Created by the request lifecycle on approval, not by the
/// events office, and never registrable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booth {
    #[serde(rename = "_id", default = "new_event_id")]
    pub id: Uuid,
    #[serde(rename = "boothname")]
    pub name: String,
    pub vendor_id: Uuid,
    #[serde(default)]
    pub bazar_id: Option<Uuid>,
    #[serde(default)]
    pub location: Option<String>,
    pub booth_size: BoothSize,
    /// Always trusted as stored; never derived from dates.
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub archive: bool,
}

/// Any schedulable campus activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Trip(Trip),
    Workshop(Workshop),
    Bazar(Bazar),
    Conference(Conference),
    Booth(Booth),
}

pub(crate) fn combine(date: Option<NaiveDate>, time: Option<NaiveTime>) -> Option<DateTime<Utc>> {
    Some(date?.and_time(time?).and_utc())
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Trip(_) => EventKind::Trip,
            Event::Workshop(_) => EventKind::Workshop,
            Event::Bazar(_) => EventKind::Bazar,
            Event::Conference(_) => EventKind::Conference,
            Event::Booth(_) => EventKind::Booth,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Event::Trip(t) => t.id,
            Event::Workshop(w) => w.id,
            Event::Bazar(b) => b.id,
            Event::Conference(c) => c.id,
            Event::Booth(b) => b.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Event::Trip(t) => &t.name,
            Event::Workshop(w) => &w.name,
            Event::Bazar(b) => &b.name,
            Event::Conference(c) => &c.name,
            Event::Booth(b) => &b.name,
        }
    }

    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Event::Trip(t) => combine(t.start_date, t.start_time),
            Event::Workshop(w) => combine(w.start_date, w.start_time),
            Event::Bazar(b) => combine(b.start_date, b.start_time),
            Event::Conference(c) => combine(c.start_date, c.start_time),
            Event::Booth(b) => combine(b.start_date, b.start_time),
        }
    }

    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Event::Trip(t) => combine(t.end_date, t.end_time),
            Event::Workshop(w) => combine(w.end_date, w.end_time),
            Event::Bazar(b) => combine(b.end_date, b.end_time),
            Event::Conference(c) => combine(c.end_date, c.end_time),
            Event::Booth(_) => None,
        }
    }

    pub fn is_archived(&self) -> bool {
        match self {
            Event::Trip(t) => t.archive,
            Event::Workshop(w) => w.archive,
            Event::Bazar(b) => b.archive,
            Event::Conference(c) => c.archive,
            Event::Booth(b) => b.archive,
        }
    }

    pub fn set_archived(&mut self, archived: bool) {
        match self {
            Event::Trip(t) => t.archive = archived,
            Event::Workshop(w) => w.archive = archived,
            Event::Bazar(b) => b.archive = archived,
            Event::Conference(c) => c.archive = archived,
            Event::Booth(b) => b.archive = archived,
        }
    }

    pub fn attendees(&self) -> &[Attendee] {
        match self {
            Event::Trip(t) => &t.attendees,
            Event::Workshop(w) => &w.attendees,
            Event::Bazar(b) => &b.attendees,
            Event::Conference(c) => &c.attendees,
            Event::Booth(_) => &[],
        }
    }

    pub fn pending_registrations(&self) -> &[Registration] {
        match self {
            Event::Trip(t) => &t.registered,
            Event::Workshop(w) => &w.registered,
            Event::Bazar(b) => &b.registered,
            Event::Conference(c) => &c.registered,
            Event::Booth(_) => &[],
        }
    }
}

use chrono::{NaiveDate, Utc};
use quad_shared::pii::Masked;
use uuid::Uuid;

use crate::model::{Attendee, Event, Rating, Registration, UserComment};

pub const MAX_SCORE: u8 = 5;

#[derive(Debug, thiserror::Error)]
pub enum EnrollmentError {
    #[error("event is archived")]
    EventArchived,

    #[error("registration deadline has passed")]
    DeadlinePassed,

    #[error("user is already registered for this event")]
    AlreadyRegistered,

    #[error("event is at capacity")]
    CapacityFull,

    #[error("this event kind does not take registrations")]
    NotRegistrable,

    #[error("user has no pending registration for this event")]
    NotRegistered,

    #[error("rating must be between 0 and 5, got {0}")]
    InvalidScore(u8),
}

impl EnrollmentError {
    /// Machine-readable code for the API error body.
    pub fn code(&self) -> &'static str {
        match self {
            EnrollmentError::EventArchived => "EVENT_ARCHIVED",
            EnrollmentError::DeadlinePassed => "DEADLINE_PASSED",
            EnrollmentError::AlreadyRegistered => "ALREADY_REGISTERED",
            EnrollmentError::CapacityFull => "CAPACITY_FULL",
            EnrollmentError::NotRegistrable => "NOT_REGISTRABLE",
            EnrollmentError::NotRegistered => "NOT_REGISTERED",
            EnrollmentError::InvalidScore(_) => "VALIDATION",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub user: Uuid,
    pub name: String,
    pub email: String,
}

struct EnrollmentSlots<'a> {
    deadline: Option<NaiveDate>,
    capacity: u32,
    attendees: &'a mut Vec<Attendee>,
    registered: &'a mut Vec<Registration>,
}

impl Event {
    fn enrollment_mut(&mut self) -> Option<EnrollmentSlots<'_>> {
        match self {
            Event::Trip(t) => Some(EnrollmentSlots {
                deadline: t.registration_deadline,
                capacity: t.capacity,
                attendees: &mut t.attendees,
                registered: &mut t.registered,
            }),
            Event::Workshop(w) => Some(EnrollmentSlots {
                deadline: w.registration_deadline,
                capacity: w.capacity,
                attendees: &mut w.attendees,
                registered: &mut w.registered,
            }),
            Event::Bazar(b) => Some(EnrollmentSlots {
                deadline: b.registration_deadline,
                capacity: b.capacity,
                attendees: &mut b.attendees,
                registered: &mut b.registered,
            }),
            Event::Conference(c) => Some(EnrollmentSlots {
                deadline: c.registration_deadline,
                capacity: c.capacity,
                attendees: &mut c.attendees,
                registered: &mut c.registered,
            }),
            Event::Booth(_) => None,
        }
    }

    fn feedback_mut(&mut self) -> Option<(&mut Vec<Rating>, &mut Vec<UserComment>)> {
        match self {
            Event::Trip(t) => Some((&mut t.ratings, &mut t.user_comments)),
            Event::Workshop(w) => Some((&mut w.ratings, &mut w.user_comments)),
            Event::Bazar(b) => Some((&mut b.ratings, &mut b.user_comments)),
            Event::Conference(c) => Some((&mut c.ratings, &mut c.user_comments)),
            Event::Booth(_) => None,
        }
    }
}

/// Add a pending-payment registration. Capacity counts both the confirmed
/// attendees and the pending list.
pub fn register(
    event: &mut Event,
    registration: NewRegistration,
    today: NaiveDate,
) -> Result<(), EnrollmentError> {
    if event.is_archived() {
        return Err(EnrollmentError::EventArchived);
    }
    let slots = event
        .enrollment_mut()
        .ok_or(EnrollmentError::NotRegistrable)?;
    if let Some(deadline) = slots.deadline {
        if today > deadline {
            return Err(EnrollmentError::DeadlinePassed);
        }
    }
    if slots.attendees.iter().any(|a| a.user == registration.user)
        || slots.registered.iter().any(|r| r.user == registration.user)
    {
        return Err(EnrollmentError::AlreadyRegistered);
    }
    if (slots.attendees.len() + slots.registered.len()) as u32 >= slots.capacity {
        return Err(EnrollmentError::CapacityFull);
    }
    slots.registered.push(Registration {
        user: registration.user,
        name: registration.name,
        email: Masked(registration.email),
        registered_at: Utc::now(),
    });
    Ok(())
}

/// Move a pending registrant into the attendee list with payment confirmed.
pub fn confirm_payment(event: &mut Event, user: Uuid) -> Result<(), EnrollmentError> {
    let slots = event
        .enrollment_mut()
        .ok_or(EnrollmentError::NotRegistrable)?;
    let position = slots
        .registered
        .iter()
        .position(|r| r.user == user)
        .ok_or(EnrollmentError::NotRegistered)?;
    let registration = slots.registered.remove(position);
    slots.attendees.push(Attendee {
        user: registration.user,
        name: registration.name,
        email: registration.email,
        phone: None,
        paid: true,
    });
    Ok(())
}

/// Upsert the caller's rating.
pub fn rate(event: &mut Event, user: Uuid, score: u8) -> Result<(), EnrollmentError> {
    if score > MAX_SCORE {
        return Err(EnrollmentError::InvalidScore(score));
    }
    let (ratings, _) = event
        .feedback_mut()
        .ok_or(EnrollmentError::NotRegistrable)?;
    match ratings.iter_mut().find(|r| r.user == user) {
        Some(existing) => existing.score = score,
        None => ratings.push(Rating { user, score }),
    }
    Ok(())
}

pub fn comment(event: &mut Event, user: Uuid, text: String) -> Result<(), EnrollmentError> {
    let (_, comments) = event
        .feedback_mut()
        .ok_or(EnrollmentError::NotRegistrable)?;
    comments.push(UserComment {
        user,
        text,
        posted_at: Utc::now(),
    });
    Ok(())
}

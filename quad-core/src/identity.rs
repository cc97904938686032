use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Actor roles as carried in auth claims and user documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Vendor,
    EventsOffice,
    Admin,
}

impl Role {
    /// Staff roles may act on any user's data and receive back-office notifications.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::EventsOffice | Role::Admin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::repository::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueKind {
    Gym,
    Pool,
}

impl VenueKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gym" => Some(VenueKind::Gym),
            "pool" => Some(VenueKind::Pool),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VenueKind::Gym => "gym",
            VenueKind::Pool => "pool",
        }
    }
}

/// Where a rendezvous takes place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub kind: VenueKind,
    pub id: Uuid,
}

/// A rendezvous: a sports event other users can join
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rdv {
    pub id: Uuid,
    pub title: String,
    pub sport: String,
    pub venue: Venue,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    pub organizer_id: Uuid,
    #[serde(default)]
    pub participants: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Rdv {
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.organizer_id == user_id || self.participants.contains(&user_id)
    }

    /// Returns false when the user was already part of the rendezvous
    pub fn join(&mut self, user_id: Uuid) -> bool {
        if self.has_participant(user_id) {
            return false;
        }
        self.participants.push(user_id);
        true
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RdvDraft {
    pub title: String,
    pub sport: String,
    pub venue: Venue,
    pub starts_at: DateTime<Utc>,
    pub description: String,
    pub organizer_id: Uuid,
    pub participants: Vec<Uuid>,
}

impl Resource for Rdv {
    const COLLECTION: &'static str = "rdvs";
    type Draft = RdvDraft;

    fn id(&self) -> Uuid {
        self.id
    }
}

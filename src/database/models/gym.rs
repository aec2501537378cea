use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::repository::Resource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gym {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub description: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GymDraft {
    pub name: String,
    pub address: String,
    pub city: String,
    pub description: String,
    pub owner_id: Uuid,
}

impl Resource for Gym {
    const COLLECTION: &'static str = "gyms";
    type Draft = GymDraft;

    fn id(&self) -> Uuid {
        self.id
    }
}

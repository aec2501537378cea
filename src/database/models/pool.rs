use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::repository::Resource;

/// A swimming pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    /// Basin length in meters
    pub length_m: u32,
    pub lanes: u32,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PoolDraft {
    pub name: String,
    pub address: String,
    pub city: String,
    pub length_m: u32,
    pub lanes: u32,
    pub owner_id: Uuid,
}

impl Resource for Pool {
    const COLLECTION: &'static str = "pools";
    type Draft = PoolDraft;

    fn id(&self) -> Uuid {
        self.id
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::repository::Resource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDraft {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl Resource for User {
    const COLLECTION: &'static str = "users";
    type Draft = UserDraft;

    fn id(&self) -> Uuid {
        self.id
    }
}

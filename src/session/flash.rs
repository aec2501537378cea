use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tower_sessions::{session, Session};

const FLASH_KEY: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Info,
    Error,
}

impl FlashCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashCategory::Success => "success",
            FlashCategory::Info => "info",
            FlashCategory::Error => "error",
        }
    }
}

/// One-shot feedback queued on the session for the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub category: FlashCategory,
    pub text: String,
}

impl FlashMessage {
    pub fn new(category: FlashCategory, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(FlashCategory::Success, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(FlashCategory::Info, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(FlashCategory::Error, text)
    }
}

/// The flash queue stored under one session key
#[async_trait]
pub trait FlashExt {
    /// Queue a message for the next request's render
    async fn flash(&self, message: FlashMessage) -> Result<(), session::Error>;

    /// Remove and return every queued message
    async fn take_flash(&self) -> Result<Vec<FlashMessage>, session::Error>;
}

#[async_trait]
impl FlashExt for Session {
    async fn flash(&self, message: FlashMessage) -> Result<(), session::Error> {
        let mut queued: Vec<FlashMessage> = self.get(FLASH_KEY).await?.unwrap_or_default();
        queued.push(message);
        self.insert(FLASH_KEY, queued).await
    }

    async fn take_flash(&self) -> Result<Vec<FlashMessage>, session::Error> {
        Ok(self.remove(FLASH_KEY).await?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn take_flash_drains_queue_in_order() {
        let s = session();
        s.flash(FlashMessage::success("saved")).await.unwrap();
        s.flash(FlashMessage::error("oops")).await.unwrap();

        let drained = s.take_flash().await.unwrap();
        assert_eq!(drained, vec![FlashMessage::success("saved"), FlashMessage::error("oops")]);
        assert!(s.take_flash().await.unwrap().is_empty());
    }

    #[test]
    fn categories_serialize_lowercase() {
        let json = serde_json::to_value(FlashMessage::info("hi")).unwrap();
        assert_eq!(json["category"], "info");
        assert_eq!(FlashCategory::Error.as_str(), "error");
    }
}

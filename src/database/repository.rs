use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::database::documents::{Document, DocumentStore, StoreError};

/// A typed document kept in its own collection.
///
/// `id` and `created_at` live on the stored document envelope, not in the
/// body; `Repository` merges them back when hydrating.
pub trait Resource: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;

    /// Fields a client supplies when creating the resource
    type Draft: Serialize + Send + Sync;

    fn id(&self) -> Uuid;
}

pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T: Resource> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_any(&self) -> Result<Vec<T>, StoreError> {
        self.store
            .list(T::COLLECTION)
            .await?
            .into_iter()
            .map(Self::hydrate)
            .collect()
    }

    pub async fn select_one(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        match self.store.get(T::COLLECTION, id).await? {
            Some(doc) => Ok(Some(Self::hydrate(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn select_404(&self, id: Uuid) -> Result<T, StoreError> {
        self.select_one(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("{} {}", T::COLLECTION, id)))
    }

    pub async fn count(&self) -> Result<u64, StoreError> {
        self.store.count(T::COLLECTION).await
    }

    async fn find_by(&self, field: &str, value: Value) -> Result<Vec<T>, StoreError> {
        self.store
            .find_by_field(T::COLLECTION, field, &value)
            .await?
            .into_iter()
            .map(Self::hydrate)
            .collect()
    }

    pub async fn find_one_by(&self, field: &str, value: Value) -> Result<Option<T>, StoreError> {
        Ok(self.find_by(field, value).await?.into_iter().next())
    }

    pub async fn insert(&self, draft: &T::Draft) -> Result<T, StoreError> {
        let body = serde_json::to_value(draft)?;
        let doc = self.store.insert(T::COLLECTION, body).await?;
        Self::hydrate(doc)
    }

    /// Persist every field of `item` except the envelope ones
    pub async fn update(&self, item: &T) -> Result<T, StoreError> {
        let mut body = serde_json::to_value(item)?;
        if let Some(map) = body.as_object_mut() {
            map.remove("id");
            map.remove("created_at");
        }
        let doc = self
            .store
            .update(T::COLLECTION, item.id(), body)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("{} {}", T::COLLECTION, item.id())))?;
        Self::hydrate(doc)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.store.delete(T::COLLECTION, id).await
    }

    fn hydrate(doc: Document) -> Result<T, StoreError> {
        let mut body = doc.body;
        if let Some(map) = body.as_object_mut() {
            map.insert("id".to_string(), json!(doc.id));
            map.insert("created_at".to_string(), json!(doc.created_at));
        }
        Ok(serde_json::from_value(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::documents::MemoryDocumentStore;
    use crate::database::models::gym::{Gym, GymDraft};

    fn draft(name: &str) -> GymDraft {
        GymDraft {
            name: name.to_string(),
            address: "1 rue du Sport".to_string(),
            city: "Paris".to_string(),
            description: String::new(),
            owner_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn insert_hydrates_envelope_fields() {
        let repo: Repository<Gym> = Repository::new(Arc::new(MemoryDocumentStore::new()));
        let gym = repo.insert(&draft("Fit Club")).await.unwrap();
        let loaded = repo.select_404(gym.id).await.unwrap();
        assert_eq!(loaded.name, "Fit Club");
        assert_eq!(loaded.created_at, gym.created_at);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_keeps_identity() {
        let repo: Repository<Gym> = Repository::new(Arc::new(MemoryDocumentStore::new()));
        let mut gym = repo.insert(&draft("Fit Club")).await.unwrap();
        gym.city = "Lyon".to_string();
        let updated = repo.update(&gym).await.unwrap();
        assert_eq!(updated.id, gym.id);
        assert_eq!(updated.city, "Lyon");
    }

    #[tokio::test]
    async fn select_404_reports_not_found() {
        let repo: Repository<Gym> = Repository::new(Arc::new(MemoryDocumentStore::new()));
        let err = repo.select_404(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}

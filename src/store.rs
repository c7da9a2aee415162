use async_trait::async_trait;
use futures::TryStreamExt;
use indexmap::IndexMap;
use mongodb::{bson::doc, Client, Collection};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::schemas::Event;

pub const DEFAULT_DATABASE: &str = "OpenSplit";
const EVENTS_COLLECTION: &str = "Events";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

/// Where events live between requests. The settlement code never touches
/// it; handlers load an event, compute, and write the event back.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert(&self, event: &Event) -> Result<(), StoreError>;
    async fn get(&self, id: &str) -> Result<Option<Event>, StoreError>;
    async fn list(&self) -> Result<Vec<Event>, StoreError>;
    /// Returns `false` when there was no event with that id.
    async fn replace(&self, event: &Event) -> Result<bool, StoreError>;
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

pub struct MongoEventStore {
    events: Collection<Event>,
}

impl MongoEventStore {
    pub fn new(client: &Client, database: &str) -> Self {
        Self {
            events: client.database(database).collection(EVENTS_COLLECTION),
        }
    }
}

#[async_trait]
impl EventStore for MongoEventStore {
    #[instrument(skip_all, fields(event = %event.id))]
    async fn insert(&self, event: &Event) -> Result<(), StoreError> {
        self.events.insert_one(event, None).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Option<Event>, StoreError> {
        Ok(self.events.find_one(doc! { "id": id }, None).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Event>, StoreError> {
        let cursor = self.events.find(None, None).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip_all, fields(event = %event.id))]
    async fn replace(&self, event: &Event) -> Result<bool, StoreError> {
        let result = self
            .events
            .replace_one(doc! { "id": &event.id }, event, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let result = self.events.delete_one(doc! { "id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }
}

/// Keeps events in process memory, in insertion order. Used when no
/// `MONGODB_URI` is configured and by the tests.
#[derive(Default)]
pub struct InMemoryEventStore {
    events: RwLock<IndexMap<String, Event>>,
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn insert(&self, event: &Event) -> Result<(), StoreError> {
        self.events
            .write()
            .await
            .insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Event>, StoreError> {
        Ok(self.events.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.events.read().await.values().cloned().collect())
    }

    async fn replace(&self, event: &Event) -> Result<bool, StoreError> {
        let mut events = self.events.write().await;
        match events.get_mut(&event.id) {
            Some(stored) => {
                *stored = event.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.events.write().await.shift_remove(id).is_some())
    }
}

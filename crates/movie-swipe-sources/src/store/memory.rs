use crate::error::SourceError;
use crate::store::upsert_into;
use crate::traits::RatingStore;
use async_trait::async_trait;
use movie_swipe_models::{RatingRecord, RatingUpsert};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Rating store kept in process memory, for offline sessions and tests
#[derive(Default)]
pub struct MemoryRatingStore {
    users: Mutex<HashMap<String, Vec<RatingRecord>>>,
}

impl MemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user's history
    pub fn with_records(user_id: &str, records: Vec<RatingRecord>) -> Self {
        let mut users = HashMap::new();
        users.insert(user_id.to_string(), records);
        Self { users: Mutex::new(users) }
    }
}

#[async_trait]
impl RatingStore for MemoryRatingStore {
    async fn list_ratings(&self, user_id: &str) -> Result<Vec<RatingRecord>, SourceError> {
        let users = self.users.lock().await;
        Ok(users.get(user_id).cloned().unwrap_or_default())
    }

    async fn upsert_rating(&self, user_id: &str, rating: RatingUpsert) -> Result<RatingRecord, SourceError> {
        let mut users = self.users.lock().await;
        let records = users.entry(user_id.to_string()).or_default();
        Ok(upsert_into(records, rating))
    }
}

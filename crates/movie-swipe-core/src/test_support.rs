//! Fakes for the provider and rating store used across core tests.

use async_trait::async_trait;
use chrono::Utc;
use movie_swipe_models::{CatalogType, Credits, LikedState, MovieCandidate, RatingRecord, RatingUpsert};
use movie_swipe_sources::{MovieProvider, RatingStore, SourceError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub fn movie(id: u64) -> MovieCandidate {
    MovieCandidate::new(id, format!("Movie {}", id))
}

pub fn movies(ids: impl IntoIterator<Item = u64>) -> Vec<MovieCandidate> {
    ids.into_iter().map(movie).collect()
}

pub fn rated(id: u64, liked_state: LikedState) -> RatingRecord {
    RatingUpsert::new(id, format!("Movie {}", id), liked_state).into_record(None, Utc::now())
}

#[derive(Default)]
pub struct FakeProvider {
    pages: HashMap<u32, Vec<MovieCandidate>>,
    failing_pages: HashSet<u32>,
    failing_credits: HashSet<u64>,
    gate: Option<Arc<Notify>>,
    pub page_calls: Mutex<Vec<u32>>,
    pub credit_calls: Mutex<Vec<u64>>,
    pub review_calls: Mutex<Vec<u64>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32, movies: Vec<MovieCandidate>) -> Self {
        self.pages.insert(page, movies);
        self
    }

    pub fn failing_page(mut self, page: u32) -> Self {
        self.failing_pages.insert(page);
        self
    }

    pub fn failing_credits(mut self, movie_id: u64) -> Self {
        self.failing_credits.insert(movie_id);
        self
    }

    /// Every page fetch waits for one `notify_one` on `gate`
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn pages_fetched(&self) -> Vec<u32> {
        self.page_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MovieProvider for FakeProvider {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn search_movies(&self, query: &str) -> Result<Vec<MovieCandidate>, SourceError> {
        Ok(self
            .pages
            .values()
            .flatten()
            .filter(|m| m.title.contains(query))
            .cloned()
            .collect())
    }

    async fn fetch_page(&self, _catalog: CatalogType, page: u32) -> Result<Vec<MovieCandidate>, SourceError> {
        self.page_calls.lock().unwrap().push(page);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.failing_pages.contains(&page) {
            return Err(SourceError::Status { status: 503, body: "unavailable".to_string() });
        }
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }

    async fn get_credits(&self, movie_id: u64) -> Result<Credits, SourceError> {
        self.credit_calls.lock().unwrap().push(movie_id);
        if self.failing_credits.contains(&movie_id) {
            return Err(SourceError::Status { status: 500, body: "credits".to_string() });
        }
        Ok(Credits {
            cast: vec![format!("Lead {}", movie_id)],
            crew: vec![format!("Director {} (Director)", movie_id)],
        })
    }

    async fn get_reviews(&self, movie_id: u64) -> Result<Vec<String>, SourceError> {
        self.review_calls.lock().unwrap().push(movie_id);
        Ok(vec![format!("Review of {}", movie_id)])
    }

    async fn get_movie_details(&self, movie_id: u64) -> Result<MovieCandidate, SourceError> {
        let base = self
            .pages
            .values()
            .flatten()
            .find(|m| m.id == movie_id)
            .cloned()
            .ok_or(SourceError::NotFound(movie_id))?;
        let credits = self.get_credits(movie_id).await?;
        let reviews = self.get_reviews(movie_id).await?;
        Ok(base.with_details(credits, reviews))
    }
}

#[derive(Default)]
pub struct FakeStore {
    records: Mutex<Vec<RatingRecord>>,
    fail_upserts: bool,
    first_upsert_delay: Option<Duration>,
    pub upserts: Mutex<Vec<RatingUpsert>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(records: Vec<RatingRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_upserts: true,
            ..Self::default()
        }
    }

    /// The first upsert sleeps for `delay` before writing
    pub fn slow_first_upsert(delay: Duration) -> Self {
        Self {
            first_upsert_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn stored(&self) -> Vec<RatingRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn upsert_calls(&self) -> Vec<RatingUpsert> {
        self.upserts.lock().unwrap().clone()
    }
}

#[async_trait]
impl RatingStore for FakeStore {
    async fn list_ratings(&self, _user_id: &str) -> Result<Vec<RatingRecord>, SourceError> {
        Ok(self.records.lock().unwrap().clone())
    }

    async fn upsert_rating(&self, _user_id: &str, rating: RatingUpsert) -> Result<RatingRecord, SourceError> {
        let call = {
            let mut upserts = self.upserts.lock().unwrap();
            upserts.push(rating.clone());
            upserts.len()
        };
        if let (1, Some(delay)) = (call, self.first_upsert_delay) {
            tokio::time::sleep(delay).await;
        }
        if self.fail_upserts {
            return Err(SourceError::Store("disk full".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        let existing = records.iter().position(|r| r.movie_id == rating.movie_id);
        let record = rating.into_record(existing.map(|i| &records[i]), Utc::now());
        match existing {
            Some(i) => records[i] = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(record)
    }
}

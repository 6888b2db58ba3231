use crate::error::SwipeError;
use movie_swipe_models::{LikedState, MovieCandidate, RatingRecord, RatingUpsert, StarRating};
use movie_swipe_sources::RatingStore;
use std::sync::Arc;
use tracing::info;

/// Read and edit one user's ratings outside the swipe flow
pub struct RatingBook {
    store: Arc<dyn RatingStore>,
    user_id: String,
}

impl RatingBook {
    pub fn new(store: Arc<dyn RatingStore>, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
        }
    }

    /// All ratings, newest first
    pub async fn all(&self) -> Result<Vec<RatingRecord>, SwipeError> {
        let mut records = self
            .store
            .list_ratings(&self.user_id)
            .await
            .map_err(SwipeError::History)?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.movie_id.cmp(&b.movie_id)));
        Ok(records)
    }

    pub async fn liked(&self) -> Result<Vec<RatingRecord>, SwipeError> {
        self.with_state(LikedState::Liked).await
    }

    pub async fn disliked(&self) -> Result<Vec<RatingRecord>, SwipeError> {
        self.with_state(LikedState::Disliked).await
    }

    /// Movies given stars without a like or dislike
    pub async fn rated_only(&self) -> Result<Vec<RatingRecord>, SwipeError> {
        Ok(self
            .with_state(LikedState::Neither)
            .await?
            .into_iter()
            .filter(|r| r.star_rating.is_some())
            .collect())
    }

    pub async fn find(&self, movie_id: u64) -> Result<Option<RatingRecord>, SwipeError> {
        Ok(self.all().await?.into_iter().find(|r| r.movie_id == movie_id))
    }

    /// Rate a movie directly, e.g. from search results
    ///
    /// `None` for either part keeps what is already stored for the movie.
    pub async fn rate(
        &self,
        movie: &MovieCandidate,
        liked_state: Option<LikedState>,
        stars: Option<StarRating>,
    ) -> Result<RatingRecord, SwipeError> {
        let existing = self.find(movie.id).await?;
        let liked_state = liked_state
            .or_else(|| existing.as_ref().map(|r| r.liked_state))
            .unwrap_or(LikedState::Neither);
        let stars = stars.or_else(|| existing.as_ref().and_then(|r| r.star_rating));

        let upsert = RatingUpsert::new(movie.id, movie.title.clone(), liked_state)
            .with_poster(movie.poster_url.clone())
            .with_stars(stars);
        let record = self
            .store
            .upsert_rating(&self.user_id, upsert)
            .await
            .map_err(|source| SwipeError::Persist {
                movie_id: movie.id,
                source,
            })?;

        info!(
            movie_id = movie.id,
            liked_state = record.liked_state.as_str(),
            stars = record.star_rating.map(|s| s.stars()),
            "Rated movie"
        );
        Ok(record)
    }

    async fn with_state(&self, state: LikedState) -> Result<Vec<RatingRecord>, SwipeError> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|r| r.liked_state == state)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::movie;
    use movie_swipe_sources::MemoryRatingStore;

    fn book() -> RatingBook {
        RatingBook::new(Arc::new(MemoryRatingStore::new()), "tester")
    }

    #[tokio::test]
    async fn test_filters_by_liked_state() {
        let book = book();
        book.rate(&movie(1), Some(LikedState::Liked), None).await.unwrap();
        book.rate(&movie(2), Some(LikedState::Disliked), None).await.unwrap();
        book.rate(&movie(3), None, StarRating::new(4.5)).await.unwrap();
        book.rate(&movie(4), Some(LikedState::Neither), None).await.unwrap();

        let ids = |records: Vec<RatingRecord>| records.into_iter().map(|r| r.movie_id).collect::<Vec<_>>();
        assert_eq!(ids(book.liked().await.unwrap()), vec![1]);
        assert_eq!(ids(book.disliked().await.unwrap()), vec![2]);
        assert_eq!(ids(book.rated_only().await.unwrap()), vec![3]);
        assert_eq!(book.all().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_partial_rate_keeps_stored_values() {
        let book = book();
        book.rate(&movie(9), Some(LikedState::Liked), None).await.unwrap();

        let record = book.rate(&movie(9), None, StarRating::new(3.0)).await.unwrap();
        assert_eq!(record.liked_state, LikedState::Liked);
        assert_eq!(record.star_rating.map(|s| s.stars()), Some(3.0));

        let record = book.rate(&movie(9), Some(LikedState::Disliked), None).await.unwrap();
        assert_eq!(record.star_rating.map(|s| s.stars()), Some(3.0));
        assert_eq!(book.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ratings_are_per_user() {
        let store: Arc<dyn RatingStore> = Arc::new(MemoryRatingStore::new());
        let alice = RatingBook::new(store.clone(), "alice");
        let bob = RatingBook::new(store, "bob");

        alice.rate(&movie(1), Some(LikedState::Liked), None).await.unwrap();
        assert!(bob.all().await.unwrap().is_empty());
        assert!(alice.find(1).await.unwrap().is_some());
    }
}

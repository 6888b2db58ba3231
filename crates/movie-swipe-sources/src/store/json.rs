use crate::error::SourceError;
use crate::store::upsert_into;
use crate::traits::RatingStore;
use async_trait::async_trait;
use movie_swipe_models::{RatingRecord, RatingUpsert};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Rating store backed by one JSON file per user
///
/// Writes go to a temp file first and are renamed into place. A file that no
/// longer parses is moved aside to `<user>.json.bak` and treated as empty.
pub struct JsonRatingStore {
    ratings_dir: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonRatingStore {
    pub fn new(ratings_dir: &Path) -> Self {
        Self {
            ratings_dir: ratings_dir.to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    fn user_file(&self, user_id: &str) -> PathBuf {
        let safe: String = user_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.ratings_dir.join(format!("{}.json", safe))
    }

    async fn load(&self, path: &Path) -> Result<Vec<RatingRecord>, SourceError> {
        if !tokio::fs::try_exists(path).await? {
            debug!("Ratings file {:?} does not exist, starting empty", path);
            return Ok(Vec::new());
        }

        let content = tokio::fs::read_to_string(path).await?;
        match serde_json::from_str::<Vec<RatingRecord>>(&content) {
            Ok(records) => Ok(records),
            Err(e) => {
                let backup_path = path.with_extension("json.bak");
                if let Err(backup_err) = tokio::fs::rename(path, &backup_path).await {
                    warn!("Failed to move corrupted ratings file aside: {}", backup_err);
                } else {
                    info!(
                        "Ratings file {:?} is corrupted ({}). Moved to {:?} and starting empty.",
                        path, e, backup_path
                    );
                }
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, path: &Path, records: &[RatingRecord]) -> Result<(), SourceError> {
        tokio::fs::create_dir_all(&self.ratings_dir).await?;
        let content = serde_json::to_string_pretty(records)?;

        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, content).await?;
        tokio::fs::rename(&temp_path, path).await?;
        Ok(())
    }
}

#[async_trait]
impl RatingStore for JsonRatingStore {
    async fn list_ratings(&self, user_id: &str) -> Result<Vec<RatingRecord>, SourceError> {
        self.load(&self.user_file(user_id)).await
    }

    async fn upsert_rating(&self, user_id: &str, rating: RatingUpsert) -> Result<RatingRecord, SourceError> {
        let _guard = self.write_lock.lock().await;
        let path = self.user_file(user_id);

        let mut records = self.load(&path).await?;
        let record = upsert_into(&mut records, rating);
        self.save(&path, &records).await?;

        debug!(
            movie_id = record.movie_id,
            liked_state = record.liked_state.as_str(),
            total = records.len(),
            "Saved rating"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movie_swipe_models::{LikedState, StarRating};

    #[tokio::test]
    async fn test_ratings_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonRatingStore::new(dir.path());
        store
            .upsert_rating("alice", RatingUpsert::new(10, "Jaws", LikedState::Disliked))
            .await
            .unwrap();

        let reopened = JsonRatingStore::new(dir.path());
        let ratings = reopened.list_ratings("alice").await.unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].movie_id, 10);
        assert_eq!(ratings[0].liked_state, LikedState::Disliked);
    }

    #[tokio::test]
    async fn test_upsert_twice_keeps_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonRatingStore::new(dir.path());
        let first = store
            .upsert_rating("alice", RatingUpsert::new(10, "Jaws", LikedState::Liked))
            .await
            .unwrap();
        let second = store
            .upsert_rating(
                "alice",
                RatingUpsert::new(10, "Jaws", LikedState::Liked).with_stars(StarRating::new(5.0)),
            )
            .await
            .unwrap();

        let ratings = store.list_ratings("alice").await.unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(ratings[0].star_rating, StarRating::new(5.0));
    }

    #[tokio::test]
    async fn test_corrupted_file_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alice.json"), "not json").unwrap();

        let store = JsonRatingStore::new(dir.path());
        assert!(store.list_ratings("alice").await.unwrap().is_empty());
        assert!(dir.path().join("alice.json.bak").exists());
        assert!(!dir.path().join("alice.json").exists());
    }

    #[test]
    fn test_user_file_is_sanitized() {
        let store = JsonRatingStore::new(Path::new("/tmp/ratings"));
        assert_eq!(store.user_file("../evil user"), PathBuf::from("/tmp/ratings/___evil_user.json"));
    }
}

pub mod json;
pub mod memory;

pub use json::JsonRatingStore;
pub use memory::MemoryRatingStore;

use chrono::Utc;
use movie_swipe_models::{RatingRecord, RatingUpsert};

/// Replace the record for `rating.movie_id` or append a new one
///
/// Returns the stored record. Shared by every store so upsert semantics stay identical.
pub(crate) fn upsert_into(records: &mut Vec<RatingRecord>, rating: RatingUpsert) -> RatingRecord {
    let now = Utc::now();
    match records.iter().position(|r| r.movie_id == rating.movie_id) {
        Some(index) => {
            let record = rating.into_record(Some(&records[index]), now);
            records[index] = record.clone();
            record
        }
        None => {
            let record = rating.into_record(None, now);
            records.push(record.clone());
            record
        }
    }
}

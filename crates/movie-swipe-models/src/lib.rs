pub mod cursor;
pub mod movie;
pub mod rating;
pub mod swipe;

pub use cursor::{CatalogType, PaginationCursor};
pub use movie::{Credits, MovieCandidate, MAX_CAST, MAX_CREW, MAX_REVIEWS};
pub use rating::{LikedState, RatingRecord, RatingUpsert, StarRating};
pub use swipe::{SwipeDirection, SwipeRequirement};

pub mod traits;
pub mod error;
pub mod tmdb;
pub mod store;

pub use traits::{MovieProvider, RatingStore};
pub use error::SourceError;
pub use tmdb::TmdbProvider;
pub use store::{JsonRatingStore, MemoryRatingStore};

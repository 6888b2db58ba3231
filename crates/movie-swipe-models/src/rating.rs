use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Like/dislike state of a rated movie
///
/// `Neither` exists because a movie can carry a star rating without a binary
/// like or dislike.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LikedState {
    Liked,
    Disliked,
    Neither,
}

impl LikedState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LikedState::Liked => "liked",
            LikedState::Disliked => "disliked",
            LikedState::Neither => "neither",
        }
    }
}

/// Star rating from 0 to 5 in half-star steps
///
/// Stored as half-star units so equality and hashing stay exact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "f32", into = "f32")]
pub struct StarRating(u8);

impl StarRating {
    pub const MAX: f32 = 5.0;

    /// Returns None unless `stars` is within 0..=5 and a multiple of 0.5
    pub fn new(stars: f32) -> Option<Self> {
        if !stars.is_finite() || !(0.0..=Self::MAX).contains(&stars) {
            return None;
        }
        let halves = stars * 2.0;
        if (halves - halves.round()).abs() > f32::EPSILON {
            return None;
        }
        Some(Self(halves.round() as u8))
    }

    pub fn stars(&self) -> f32 {
        self.0 as f32 / 2.0
    }

    pub fn half_stars(&self) -> u8 {
        self.0
    }
}

impl TryFrom<f32> for StarRating {
    type Error = String;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        StarRating::new(value)
            .ok_or_else(|| format!("invalid star rating {}: expected 0-5 in 0.5 steps", value))
    }
}

impl From<StarRating> for f32 {
    fn from(rating: StarRating) -> Self {
        rating.stars()
    }
}

/// A persisted like/dislike/star decision for one movie
///
/// At most one record exists per (user, movie_id); later decisions overwrite it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingRecord {
    pub movie_id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    pub liked_state: LikedState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star_rating: Option<StarRating>,
    pub created_at: DateTime<Utc>,
}

/// Input of a rating upsert
#[derive(Debug, Clone, PartialEq)]
pub struct RatingUpsert {
    pub movie_id: u64,
    pub name: String,
    pub poster_url: Option<String>,
    pub liked_state: LikedState,
    pub star_rating: Option<StarRating>,
}

impl RatingUpsert {
    pub fn new(movie_id: u64, name: impl Into<String>, liked_state: LikedState) -> Self {
        Self {
            movie_id,
            name: name.into(),
            poster_url: None,
            liked_state,
            star_rating: None,
        }
    }

    pub fn with_poster(mut self, poster_url: Option<String>) -> Self {
        self.poster_url = poster_url;
        self
    }

    pub fn with_stars(mut self, star_rating: Option<StarRating>) -> Self {
        self.star_rating = star_rating;
        self
    }

    /// Build the record stored for this upsert
    ///
    /// `created_at` is kept from `existing` so an overwrite does not reset it.
    pub fn into_record(self, existing: Option<&RatingRecord>, now: DateTime<Utc>) -> RatingRecord {
        RatingRecord {
            movie_id: self.movie_id,
            name: self.name,
            poster_url: self.poster_url,
            liked_state: self.liked_state,
            star_rating: self.star_rating,
            created_at: existing.map(|r| r.created_at).unwrap_or(now),
        }
    }
}

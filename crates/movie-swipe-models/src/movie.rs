use serde::{Deserialize, Serialize};

/// Maximum number of cast names kept on a card
pub const MAX_CAST: usize = 10;
/// Maximum number of crew names kept on a card
pub const MAX_CREW: usize = 10;
/// Maximum number of review snippets kept on a card
pub const MAX_REVIEWS: usize = 5;

/// A movie available to swipe on
///
/// `id` is the provider's identity for the movie and is the only key used for
/// deduplication. Page listings arrive without cast, crew or reviews; those are
/// filled in by [`MovieCandidate::with_details`] during enrichment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieCandidate {
    pub id: u64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub crew: Vec<String>,
    #[serde(default)]
    pub reviews: Vec<String>,
}

/// Cast and crew names for a single movie, in provider order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credits {
    pub cast: Vec<String>,
    pub crew: Vec<String>,
}

impl MovieCandidate {
    /// Create a bare candidate as returned by a page listing
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            poster_url: None,
            overview: String::new(),
            release_date: None,
            vote_average: None,
            cast: Vec::new(),
            crew: Vec::new(),
            reviews: Vec::new(),
        }
    }

    /// Attach credits and reviews, truncating each list to its card limit
    pub fn with_details(mut self, credits: Credits, reviews: Vec<String>) -> Self {
        self.cast = credits.cast.into_iter().take(MAX_CAST).collect();
        self.crew = credits.crew.into_iter().take(MAX_CREW).collect();
        self.reviews = reviews.into_iter().take(MAX_REVIEWS).collect();
        self
    }

    /// Whether cast, crew or reviews have been filled in
    pub fn is_enriched(&self) -> bool {
        !self.cast.is_empty() || !self.crew.is_empty() || !self.reviews.is_empty()
    }

    /// Release year parsed from `release_date` (YYYY-MM-DD)
    pub fn year(&self) -> Option<u32> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(0..4))
            .and_then(|year| year.parse().ok())
    }
}

//! Background top-up of the swipe queue from the provider's catalog.
//!
//! A cycle walks catalog pages starting at the cursor, drops movies the user
//! already rated or that are already queued, enriches the survivors with
//! credits and reviews, and stops once existing + new cards exceed the target
//! size. A fetch error ends the cycle early but keeps what earlier pages
//! produced; the cursor only moves past pages that were fully merged.

use chrono::Utc;
use futures::future::try_join_all;
use movie_swipe_models::{MovieCandidate, PaginationCursor};
use movie_swipe_sources::{MovieProvider, SourceError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};


/// Snapshot the cycle works from
#[derive(Debug, Clone)]
pub struct ReplenishRequest {
    pub cursor: PaginationCursor,
    /// Movies in the user's rating history
    pub excluded_ids: HashSet<u64>,
    /// Movies already waiting in the queue
    pub queued_ids: HashSet<u64>,
    /// Queue length when the snapshot was taken
    pub existing_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TargetReached,
    /// Provider returned an empty page
    CatalogExhausted,
    /// Page budget for one cycle used up
    PageLimit,
    FetchFailed,
}

#[derive(Debug)]
pub struct ReplenishOutcome {
    /// New, enriched, unique candidates in catalog order
    pub additions: Vec<MovieCandidate>,
    pub cursor: PaginationCursor,
    pub pages_merged: u32,
    pub stop_reason: StopReason,
    pub error: Option<SourceError>,
}

pub struct QueueReplenisher {
    provider: Arc<dyn MovieProvider>,
    target_size: usize,
    max_pages: u32,
}

impl QueueReplenisher {
    pub fn new(provider: Arc<dyn MovieProvider>, target_size: usize, max_pages: u32) -> Self {
        Self {
            provider,
            target_size,
            max_pages: max_pages.max(1),
        }
    }

    pub fn target_size(&self) -> usize {
        self.target_size
    }

    pub async fn replenish(&self, request: ReplenishRequest) -> ReplenishOutcome {
        let catalog = request.cursor.catalog_type;
        let mut page = request.cursor.page_index.max(1);
        let mut cursor = request.cursor.clone();
        let mut pages_merged = 0;

        // Keyed by id so a movie seen on two pages is kept once, latest copy wins
        let mut index_by_id: HashMap<u64, usize> = HashMap::new();
        let mut additions: Vec<MovieCandidate> = Vec::new();

        let mut stop_reason = StopReason::PageLimit;
        let mut error = None;

        for _ in 0..self.max_pages {
            if request.existing_len + additions.len() > self.target_size {
                stop_reason = StopReason::TargetReached;
                break;
            }

            let listing = match self.provider.fetch_page(catalog, page).await {
                Ok(listing) => listing,
                Err(e) => {
                    warn!(catalog = %catalog, page, "Catalog page fetch failed: {}", e);
                    stop_reason = StopReason::FetchFailed;
                    error = Some(e);
                    break;
                }
            };

            if listing.is_empty() {
                info!(catalog = %catalog, page, "Catalog returned an empty page, stopping");
                stop_reason = StopReason::CatalogExhausted;
                break;
            }

            let listed = listing.len();
            let mut fresh: Vec<MovieCandidate> = Vec::new();
            for movie in listing {
                if request.excluded_ids.contains(&movie.id) || request.queued_ids.contains(&movie.id) {
                    continue;
                }
                match fresh.iter().position(|m| m.id == movie.id) {
                    Some(existing) => fresh[existing] = movie,
                    None => fresh.push(movie),
                }
            }

            let enriched = match try_join_all(fresh.into_iter().map(|movie| self.enrich(movie))).await {
                Ok(enriched) => enriched,
                Err(e) => {
                    warn!(catalog = %catalog, page, "Enriching page candidates failed: {}", e);
                    stop_reason = StopReason::FetchFailed;
                    error = Some(e);
                    break;
                }
            };

            let before = additions.len();
            for movie in enriched {
                match index_by_id.get(&movie.id) {
                    Some(&slot) => additions[slot] = movie,
                    None => {
                        index_by_id.insert(movie.id, additions.len());
                        additions.push(movie);
                    }
                }
            }
            debug!(
                catalog = %catalog,
                page,
                listed,
                added = additions.len() - before,
                "Merged catalog page"
            );

            cursor = cursor.after_page(page, Utc::now());
            pages_merged += 1;
            page = page.saturating_add(1);
        }

        if stop_reason == StopReason::PageLimit && request.existing_len + additions.len() > self.target_size {
            stop_reason = StopReason::TargetReached;
        }

        info!(
            catalog = %catalog,
            added = additions.len(),
            pages_merged,
            next_page = cursor.page_index,
            stop_reason = ?stop_reason,
            "Replenishment cycle finished"
        );

        ReplenishOutcome {
            additions,
            cursor,
            pages_merged,
            stop_reason,
            error,
        }
    }

    /// Fill in credits and reviews; both requests run concurrently
    async fn enrich(&self, movie: MovieCandidate) -> Result<MovieCandidate, SourceError> {
        let (credits, reviews) = futures::try_join!(
            self.provider.get_credits(movie.id),
            self.provider.get_reviews(movie.id),
        )?;
        Ok(movie.with_details(credits, reviews))
    }
}

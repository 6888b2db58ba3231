use crate::error::SourceError;
use movie_swipe_models::{CatalogType, Credits, MovieCandidate};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Review snippets are cut to this many characters
const REVIEW_SNIPPET_CHARS: usize = 500;

/// Connection details shared by every TMDB request
#[derive(Debug, Clone)]
pub struct TmdbEndpoint {
    pub base_url: String,
    pub image_base_url: String,
    pub api_key: String,
    pub language: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TmdbPage<T> {
    page: u32,
    results: Vec<T>,
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct TmdbMovie {
    id: u64,
    title: String,
    poster_path: Option<String>,
    overview: Option<String>,
    release_date: Option<String>,
    vote_average: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TmdbCredits {
    #[serde(default)]
    cast: Vec<TmdbCastMember>,
    #[serde(default)]
    crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TmdbCastMember {
    name: String,
    order: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TmdbCrewMember {
    name: String,
    job: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TmdbReview {
    author: Option<String>,
    content: String,
}

impl TmdbEndpoint {
    fn url(&self, path: &str, extra: &[(&str, String)]) -> String {
        let mut url = format!(
            "{}/{}?api_key={}&language={}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/'),
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.language)
        );
        for (key, value) in extra {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    fn poster_url(&self, poster_path: Option<String>) -> Option<String> {
        poster_path
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}/{}", self.image_base_url.trim_end_matches('/'), p.trim_start_matches('/')))
    }

    fn to_candidate(&self, movie: TmdbMovie) -> MovieCandidate {
        MovieCandidate {
            id: movie.id,
            title: movie.title,
            poster_url: self.poster_url(movie.poster_path),
            overview: movie.overview.unwrap_or_default(),
            release_date: movie.release_date.filter(|d| !d.is_empty()),
            vote_average: movie.vote_average,
            cast: Vec::new(),
            crew: Vec::new(),
            reviews: Vec::new(),
        }
    }
}

async fn get_json<T: DeserializeOwned>(client: &Client, url: &str, movie_id: Option<u64>) -> Result<T, SourceError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = movie_id {
            return Err(SourceError::NotFound(id));
        }
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "TMDB request failed");
        return Err(SourceError::Status { status: status.as_u16(), body });
    }

    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

/// Fetch one page of a catalog listing
pub async fn fetch_page(
    client: &Client,
    endpoint: &TmdbEndpoint,
    catalog: CatalogType,
    page: u32,
) -> Result<Vec<MovieCandidate>, SourceError> {
    let url = endpoint.url(&format!("movie/{}", catalog.as_path()), &[("page", page.to_string())]);
    let listing: TmdbPage<TmdbMovie> = get_json(client, &url, None).await?;
    debug!(
        catalog = %catalog,
        page = listing.page,
        total_pages = listing.total_pages,
        results = listing.results.len(),
        "Fetched TMDB catalog page"
    );
    Ok(listing.results.into_iter().map(|m| endpoint.to_candidate(m)).collect())
}

/// Search movies by title
pub async fn search_movies(client: &Client, endpoint: &TmdbEndpoint, query: &str) -> Result<Vec<MovieCandidate>, SourceError> {
    let url = endpoint.url(
        "search/movie",
        &[("query", query.to_string()), ("include_adult", "false".to_string())],
    );
    let listing: TmdbPage<TmdbMovie> = get_json(client, &url, None).await?;
    Ok(listing.results.into_iter().map(|m| endpoint.to_candidate(m)).collect())
}

/// Fetch cast (billing order) and crew ("Name (Job)") for a movie
pub async fn get_credits(client: &Client, endpoint: &TmdbEndpoint, movie_id: u64) -> Result<Credits, SourceError> {
    let url = endpoint.url(&format!("movie/{}/credits", movie_id), &[]);
    let credits: TmdbCredits = get_json(client, &url, Some(movie_id)).await?;
    Ok(credits_from(credits))
}

fn credits_from(credits: TmdbCredits) -> Credits {
    let mut cast = credits.cast;
    cast.sort_by_key(|member| member.order.unwrap_or(u32::MAX));

    Credits {
        cast: cast.into_iter().map(|member| member.name).collect(),
        crew: credits
            .crew
            .into_iter()
            .map(|member| match member.job {
                Some(job) if !job.is_empty() => format!("{} ({})", member.name, job),
                _ => member.name,
            })
            .collect(),
    }
}

/// Fetch review snippets for a movie (first page only)
pub async fn get_reviews(client: &Client, endpoint: &TmdbEndpoint, movie_id: u64) -> Result<Vec<String>, SourceError> {
    let url = endpoint.url(&format!("movie/{}/reviews", movie_id), &[("page", "1".to_string())]);
    let listing: TmdbPage<TmdbReview> = get_json(client, &url, Some(movie_id)).await?;
    Ok(listing.results.into_iter().map(review_snippet).collect())
}

fn review_snippet(review: TmdbReview) -> String {
    let content = review.content.trim();
    let snippet: String = content.chars().take(REVIEW_SNIPPET_CHARS).collect();
    let snippet = if snippet.len() < content.len() {
        format!("{}…", snippet.trim_end())
    } else {
        snippet
    };
    match review.author {
        Some(author) if !author.is_empty() => format!("{}: {}", author, snippet),
        _ => snippet,
    }
}

/// Fetch the base record of a single movie
pub async fn get_movie(client: &Client, endpoint: &TmdbEndpoint, movie_id: u64) -> Result<MovieCandidate, SourceError> {
    let url = endpoint.url(&format!("movie/{}", movie_id), &[]);
    let movie: TmdbMovie = get_json(client, &url, Some(movie_id)).await?;
    Ok(endpoint.to_candidate(movie))
}

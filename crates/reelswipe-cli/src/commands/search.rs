use super::cards::{movies_table, render_details};
use super::Session;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use movie_swipe_core::RatingBook;
use movie_swipe_sources::{MovieProvider, SourceError};
use serde_json::json;

pub async fn run_search(query: &str, output: &Output) -> Result<()> {
    let session = Session::load()?;
    let provider = session.provider()?;

    let results = provider
        .search_movies(query)
        .await
        .map_err(|e| eyre!("Search for '{}' failed: {}", query, e))?;
    tracing::debug!(query, results = results.len(), "Search finished");

    if output.is_human() {
        if results.is_empty() {
            output.warn(format!("No movies found for '{}'", query));
        } else {
            println!("{}", movies_table(&results));
            output.info("Rate one with: reelswipe rate <ID> --like | --dislike | --stars N");
        }
    } else {
        output.json(&json!({
            "type": "search",
            "query": query,
            "results": results,
        }));
    }
    Ok(())
}

pub async fn run_show(movie_id: u64, output: &Output) -> Result<()> {
    let session = Session::load()?;
    let provider = session.provider()?;

    let movie = match provider.get_movie_details(movie_id).await {
        Ok(movie) => movie,
        Err(SourceError::NotFound(id)) => return Err(eyre!("Movie {} does not exist", id)),
        Err(e) => return Err(eyre!("Failed to load movie {}: {}", movie_id, e)),
    };

    let book = RatingBook::new(session.rating_store()?, session.user_id());
    let rating = book.find(movie_id).await?;

    if output.is_human() {
        println!("{}", render_details(&movie, rating.as_ref()));
    } else {
        output.json(&json!({
            "type": "movie",
            "movie": movie,
            "rating": rating,
        }));
    }
    Ok(())
}

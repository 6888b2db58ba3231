use super::Session;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use movie_swipe_core::RatingBook;
use movie_swipe_models::{LikedState, StarRating};
use movie_swipe_sources::{MovieProvider, SourceError};

pub async fn run_rate(movie_id: u64, like: bool, dislike: bool, stars: Option<f32>, output: &Output) -> Result<()> {
    let liked_state = match (like, dislike) {
        (true, _) => Some(LikedState::Liked),
        (_, true) => Some(LikedState::Disliked),
        _ => None,
    };
    let stars = match stars {
        Some(value) => Some(StarRating::new(value).ok_or_else(|| {
            eyre!("Invalid star rating {}: use 0 to {} in steps of 0.5", value, StarRating::MAX)
        })?),
        None => None,
    };
    if liked_state.is_none() && stars.is_none() {
        return Err(eyre!("Nothing to rate. Pass --like, --dislike and/or --stars"));
    }

    let session = Session::load()?;
    let provider = session.provider()?;
    let movie = match provider.get_movie_details(movie_id).await {
        Ok(movie) => movie,
        Err(SourceError::NotFound(id)) => return Err(eyre!("Movie {} does not exist", id)),
        Err(e) => return Err(eyre!("Failed to load movie {}: {}", movie_id, e)),
    };

    let book = RatingBook::new(session.rating_store()?, session.user_id());
    let record = book.rate(&movie, liked_state, stars).await?;

    output.rating(&movie.title, &record);
    Ok(())
}

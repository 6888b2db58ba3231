use super::cards::ratings_table;
use super::Session;
use crate::output::Output;
use color_eyre::Result;
use movie_swipe_core::RatingBook;
use serde_json::json;

pub async fn run_ratings(liked: bool, disliked: bool, output: &Output) -> Result<()> {
    let session = Session::load()?;
    let book = RatingBook::new(session.rating_store()?, session.user_id());

    let (label, records) = if liked {
        ("liked", book.liked().await?)
    } else if disliked {
        ("disliked", book.disliked().await?)
    } else {
        ("all", book.all().await?)
    };

    if output.is_human() {
        if records.is_empty() {
            output.info("No ratings yet. Start with: reelswipe swipe");
            return Ok(());
        }
        println!("{}", ratings_table(&records));
        output.info(format!("{} rating(s) ({})", records.len(), label));
    } else {
        output.json(&json!({
            "type": "ratings",
            "filter": label,
            "ratings": records,
        }));
    }
    Ok(())
}

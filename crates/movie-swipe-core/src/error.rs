use crate::controller::ControllerState;
use movie_swipe_models::SwipeDirection;
use movie_swipe_sources::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwipeError {
    #[error("movie provider request failed: {0}")]
    ProviderFetch(#[source] SourceError),

    #[error("failed to persist rating for movie {movie_id}: {source}")]
    Persist {
        movie_id: u64,
        #[source]
        source: SourceError,
    },

    #[error("failed to load rating history: {0}")]
    History(#[source] SourceError),

    #[error("card stack is busy ({0:?}); wait until it is idle")]
    Busy(ControllerState),

    #[error("swipe direction {0} is not allowed")]
    DirectionNotAllowed(SwipeDirection),

    #[error("no card to swipe")]
    NoCard,

    #[error("no swiped card to restore")]
    NothingToRestore,

    #[error("card stack requires a Tokio runtime: {0}")]
    Runtime(String),
}

use crate::commands::cards::rating_summary;
use clap::ValueEnum;
use movie_swipe_core::{CommittedSwipe, SwipeError};
use movie_swipe_models::{LikedState, RatingRecord};
use owo_colors::OwoColorize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Human-readable output that is actually going to be printed
    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human && !self.quiet
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        self.message("success", format!("{} ", "✓".green()), msg.as_ref());
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.message("info", String::new(), msg.as_ref());
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.message("warning", format!("{} ", "⚠".yellow()), msg.as_ref());
    }

    /// One line per card that left the stack
    pub fn swipe(&self, committed: &CommittedSwipe) {
        if self.is_human() {
            println!("{} {}", liked_badge(committed.liked_state), committed.movie.title.bold());
        } else {
            self.json(&swipe_json(committed));
        }
    }

    pub fn rating(&self, title: &str, record: &RatingRecord) {
        if self.is_human() {
            println!("{} {}: {}", liked_badge(record.liked_state), title.bold(), rating_summary(record));
        } else {
            self.json(&json!({
                "type": "rating",
                "rating": record,
            }));
        }
    }

    /// Background errors the swipe session kept going through
    pub fn failure(&self, failure: &SwipeError) {
        match failure {
            SwipeError::Persist { movie_id, source } => {
                self.warn(format!("Rating for movie {} not saved ({}); swipe it again to retry", movie_id, source))
            }
            _ => self.warn(failure.to_string()),
        }
    }

    pub fn json(&self, data: &Value) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(data).unwrap_or_default()),
            OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(data).unwrap_or_default()),
            OutputFormat::Human => println!("{}", data),
        }
    }

    fn message(&self, kind: &str, prefix: String, msg: &str) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => println!("{}{}", prefix, msg),
            OutputFormat::Json | OutputFormat::JsonPretty => self.json(&json!({
                "type": kind,
                "message": msg,
            })),
        }
    }
}

fn liked_badge(state: LikedState) -> String {
    match state {
        LikedState::Liked => format!("{}", "♥ liked".green()),
        LikedState::Disliked => format!("{}", "✗ disliked".red()),
        LikedState::Neither => format!("{}", "· skipped".dimmed()),
    }
}

fn swipe_json(committed: &CommittedSwipe) -> Value {
    json!({
        "type": "swipe",
        "movie_id": committed.movie.id,
        "title": committed.movie.title,
        "direction": committed.direction.to_string(),
        "liked_state": committed.liked_state,
    })
}

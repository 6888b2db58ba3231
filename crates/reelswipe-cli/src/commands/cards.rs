use comfy_table::{Attribute, Cell, Color, Table};
use movie_swipe_models::{LikedState, MovieCandidate, RatingRecord};
use owo_colors::OwoColorize;

const OVERVIEW_WIDTH: usize = 72;
const CARD_CAST: usize = 4;

pub fn styled_table() -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

pub fn title_line(movie: &MovieCandidate) -> String {
    match movie.year() {
        Some(year) => format!("{} ({})", movie.title, year),
        None => movie.title.clone(),
    }
}

/// The front card as printed by the swipe menu
pub fn render_card(movie: &MovieCandidate, position: usize, queued: usize) -> String {
    let mut lines = vec![
        String::new(),
        format!("{} {}", title_line(movie).bright_cyan().bold(), format!("[{}/{}]", position, queued).bright_black()),
    ];
    if let Some(score) = movie.vote_average {
        lines.push(format!("{} {:.1}/10", "★".yellow(), score));
    }
    if !movie.overview.is_empty() {
        lines.extend(wrap(&movie.overview, OVERVIEW_WIDTH));
    }
    if !movie.cast.is_empty() {
        let cast: Vec<&str> = movie.cast.iter().take(CARD_CAST).map(String::as_str).collect();
        lines.push(format!("{} {}", "Cast:".bold(), cast.join(", ")));
    }
    if let Some(director) = movie.crew.iter().find(|c| c.ends_with("(Director)")) {
        lines.push(format!("{} {}", "Crew:".bold(), director));
    }
    lines.join("\n")
}

/// Full details, including every credit and review
pub fn render_details(movie: &MovieCandidate, rating: Option<&RatingRecord>) -> String {
    let mut table = styled_table();
    table.set_header(vec![
        Cell::new(title_line(movie)).fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new(format!("#{}", movie.id)),
    ]);
    if let Some(score) = movie.vote_average {
        table.add_row(vec![Cell::new("Score"), Cell::new(format!("{:.1}/10", score))]);
    }
    if let Some(rating) = rating {
        table.add_row(vec![Cell::new("Your rating"), Cell::new(rating_summary(rating))]);
    }
    if !movie.overview.is_empty() {
        table.add_row(vec![Cell::new("Overview"), Cell::new(wrap(&movie.overview, OVERVIEW_WIDTH).join("\n"))]);
    }
    if !movie.cast.is_empty() {
        table.add_row(vec![Cell::new("Cast"), Cell::new(movie.cast.join("\n"))]);
    }
    if !movie.crew.is_empty() {
        table.add_row(vec![Cell::new("Crew"), Cell::new(movie.crew.join("\n"))]);
    }
    for (i, review) in movie.reviews.iter().enumerate() {
        table.add_row(vec![
            Cell::new(format!("Review {}", i + 1)),
            Cell::new(wrap(review, OVERVIEW_WIDTH).join("\n")),
        ]);
    }
    table.to_string()
}

pub fn movies_table(movies: &[MovieCandidate]) -> Table {
    let mut table = styled_table();
    table.set_header(vec!["ID", "Title", "Year", "Score"]);
    for movie in movies {
        table.add_row(vec![
            movie.id.to_string(),
            movie.title.clone(),
            movie.year().map(|y| y.to_string()).unwrap_or_default(),
            movie.vote_average.map(|s| format!("{:.1}", s)).unwrap_or_default(),
        ]);
    }
    table
}

pub fn ratings_table(records: &[RatingRecord]) -> Table {
    let mut table = styled_table();
    table.set_header(vec!["ID", "Title", "Rating", "Stars", "Rated"]);
    for record in records {
        table.add_row(vec![
            Cell::new(record.movie_id),
            Cell::new(&record.name),
            liked_cell(record.liked_state),
            Cell::new(record.star_rating.map(|s| format!("{:.1}", s.stars())).unwrap_or_default()),
            Cell::new(record.created_at.format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }
    table
}

pub fn rating_summary(record: &RatingRecord) -> String {
    match record.star_rating {
        Some(stars) => format!("{} ({:.1} stars)", record.liked_state.as_str(), stars.stars()),
        None => record.liked_state.as_str().to_string(),
    }
}

fn liked_cell(state: LikedState) -> Cell {
    match state {
        LikedState::Liked => Cell::new("liked").fg(Color::Green),
        LikedState::Disliked => Cell::new("disliked").fg(Color::Red),
        LikedState::Neither => Cell::new("-"),
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + word.len() + 1 > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

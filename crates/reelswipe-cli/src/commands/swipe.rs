use super::cards::{render_card, render_details};
use super::prompts::prompt_select;
use super::Session;
use crate::output::Output;
use clap::ValueEnum;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use movie_swipe_core::{CardStackController, CursorStorage, SwipeError};
use movie_swipe_models::{CatalogType, SwipeDirection};
use serde_json::json;
use std::io::IsTerminal;
use std::time::Duration;

/// Frame step used to play card animations to completion
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AutoDecision {
    Like,
    Dislike,
}

impl AutoDecision {
    fn direction(self) -> SwipeDirection {
        match self {
            AutoDecision::Like => SwipeDirection::Right,
            AutoDecision::Dislike => SwipeDirection::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Swipe(SwipeDirection),
    Undo,
    Details,
    Quit,
}

impl MenuAction {
    fn label(&self) -> &'static str {
        match self {
            MenuAction::Swipe(SwipeDirection::Right) => "👍 Like",
            MenuAction::Swipe(SwipeDirection::Left) => "👎 Dislike",
            MenuAction::Swipe(_) => "🙈 Not interested",
            MenuAction::Undo => "↩ Undo last swipe",
            MenuAction::Details => "ℹ Details",
            MenuAction::Quit => "Quit",
        }
    }
}

pub async fn run_swipe(catalog: Option<CatalogType>, auto: Option<AutoDecision>, count: usize, output: &Output) -> Result<()> {
    let session = Session::load()?;
    let catalog = catalog.unwrap_or(session.config.provider.catalog);
    let provider = session.provider()?;
    let store = session.rating_store()?;

    let cursor_storage = CursorStorage::new(&session.paths.cursor_file());
    let cursor = cursor_storage.load(catalog);
    tracing::info!(catalog = %catalog, page = cursor.page_index, "Starting swipe session");

    let mut controller = CardStackController::new(provider, store, &session.config, cursor)
        .wrap_err("Failed to create card stack")?
        .with_cursor_storage(cursor_storage);
    let loaded = controller
        .load_rating_history()
        .await
        .wrap_err("Failed to load rating history")?;
    tracing::debug!(loaded, "Rating history loaded");

    let swiped = match auto {
        Some(decision) => run_auto(&mut controller, decision, count, output).await?,
        None => run_interactive(&mut controller, &session, output).await?,
    };

    controller.flush_persistence().await;
    report_failures(&mut controller, output);
    controller.shutdown();

    if output.is_human() {
        output.success(format!(
            "Swiped {} movie(s); next session continues {} at page {}",
            swiped,
            catalog,
            controller.cursor().page_index
        ));
    } else {
        output.json(&json!({
            "type": "summary",
            "swiped": swiped,
            "catalog": catalog.to_string(),
            "next_page": controller.cursor().page_index,
        }));
    }
    Ok(())
}

async fn run_auto(controller: &mut CardStackController, decision: AutoDecision, count: usize, output: &Output) -> Result<usize> {
    let direction = decision.direction();
    let mut swiped = 0;

    while swiped < count {
        if !ensure_cards(controller, output).await {
            output.warn("The catalog has no more unrated movies");
            break;
        }

        match controller.swipe_programmatically(direction) {
            Ok(()) => {}
            Err(SwipeError::DirectionNotAllowed(direction)) => {
                return Err(eyre!("Swiping {} is disabled in the configuration", direction));
            }
            Err(e) => return Err(e.into()),
        }
        if let Some(committed) = controller.run_until_idle(FRAME) {
            output.swipe(&committed);
            swiped += 1;
        }
        report_failures(controller, output);
    }
    Ok(swiped)
}

async fn run_interactive(controller: &mut CardStackController, session: &Session, output: &Output) -> Result<usize> {
    if !std::io::stdin().is_terminal() {
        return Err(eyre!("Interactive swiping needs a terminal; use --auto like|dislike instead"));
    }

    let actions = menu_actions(session);
    let labels: Vec<&str> = actions.iter().map(MenuAction::label).collect();
    let mut swiped = 0usize;

    loop {
        if !ensure_cards(controller, output).await {
            output.warn("The catalog has no more unrated movies");
            break;
        }
        let Some(movie) = controller.front_card().cloned() else {
            break;
        };
        println!("{}", render_card(&movie, swiped + 1, swiped + controller.queue_len()));
        if let Some(next) = controller.next_card() {
            tracing::debug!(next_id = next.id, "Next card ready");
        }

        let choice = tokio::task::block_in_place(|| prompt_select("Your call", &labels))?;
        let Some(action) = choice.and_then(|i| actions.get(i).copied()) else {
            break;
        };

        match action {
            MenuAction::Swipe(direction) => {
                controller.swipe_programmatically(direction)?;
                if let Some(committed) = controller.run_until_idle(FRAME) {
                    output.swipe(&committed);
                    swiped += 1;
                }
            }
            MenuAction::Undo => match controller.restore_card() {
                Ok(movie) => {
                    output.info(format!("Restored {}", movie.title));
                    swiped = swiped.saturating_sub(1);
                }
                Err(SwipeError::NothingToRestore) => output.warn("Nothing to undo"),
                Err(e) => return Err(e.into()),
            },
            MenuAction::Details => {
                println!("{}", render_details(&movie, None));
            }
            MenuAction::Quit => break,
        }

        // Apply ratings and refills that finished while the prompt was open
        controller.tick(Duration::ZERO);
        report_failures(controller, output);
    }
    Ok(swiped)
}

fn menu_actions(session: &Session) -> Vec<MenuAction> {
    let swipe = &session.config.swipe;
    let mut actions = Vec::new();
    for direction in [SwipeDirection::Right, SwipeDirection::Left] {
        if swipe.is_allowed(direction) {
            actions.push(MenuAction::Swipe(direction));
        }
    }
    if let Some(direction) = [SwipeDirection::Up, SwipeDirection::Down]
        .into_iter()
        .find(|d| swipe.is_allowed(*d))
    {
        actions.push(MenuAction::Swipe(direction));
    }
    actions.extend([MenuAction::Undo, MenuAction::Details, MenuAction::Quit]);
    actions
}

/// Make sure there is a front card, waiting on a refill if needed
///
/// Returns false when the catalog produced nothing new.
async fn ensure_cards(controller: &mut CardStackController, output: &Output) -> bool {
    controller.tick(Duration::ZERO);
    if controller.front_card().is_some() {
        return true;
    }
    if !controller.is_replenishing() {
        controller.request_replenish();
    }

    let spinner = fetch_spinner(output);
    controller.wait_for_replenish().await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    report_failures(controller, output);
    controller.front_card().is_some()
}

fn fetch_spinner(output: &Output) -> Option<ProgressBar> {
    if !output.is_human() || !std::io::stderr().is_terminal() {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .map(|s| s.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"))
    {
        spinner.set_style(style);
    }
    spinner.set_message("Fetching movies...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

fn report_failures(controller: &mut CardStackController, output: &Output) {
    for failure in controller.take_failures() {
        output.failure(&failure);
    }
}

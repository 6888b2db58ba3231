use crate::output::Output;
use color_eyre::Result;
use movie_swipe_config::PathManager;
use movie_swipe_core::CursorStorage;
use std::fs;

pub async fn run_clear(all: bool, cursor: bool, ratings: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();

    if all {
        clear_cursor(&path_manager, output)?;
        clear_ratings(&path_manager, output)?;
        output.success("Cursor and rating history cleared");
        return Ok(());
    }

    let mut cleared_anything = false;

    if cursor {
        clear_cursor(&path_manager, output)?;
        cleared_anything = true;
    }

    if ratings {
        clear_ratings(&path_manager, output)?;
        cleared_anything = true;
    }

    if !cleared_anything {
        output.warn("No clear option specified. Use --cursor, --ratings, or --all");
        output.info("\nExample: reelswipe clear --cursor");
    }

    Ok(())
}

fn clear_cursor(path_manager: &PathManager, output: &Output) -> Result<()> {
    let storage = CursorStorage::new(&path_manager.cursor_file());
    let removed = storage
        .clear()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to remove cursor at {}: {}", storage.path().display(), e))?;

    if removed {
        output.success(format!("Cleared catalog cursor: {}", storage.path().display()));
    } else {
        output.info("No catalog cursor found to clear");
    }
    Ok(())
}

fn clear_ratings(path_manager: &PathManager, output: &Output) -> Result<()> {
    let ratings_dir = path_manager.ratings_dir();

    if ratings_dir.exists() {
        fs::remove_dir_all(&ratings_dir).map_err(|e| {
            color_eyre::eyre::eyre!("Failed to remove rating history at {}: {}", ratings_dir.display(), e)
        })?;
        tracing::info!(ratings_dir = %ratings_dir.display(), "Cleared rating history");
        output.success(format!("Cleared rating history: {}", ratings_dir.display()));
    } else {
        output.info("No rating history found to clear");
    }
    Ok(())
}

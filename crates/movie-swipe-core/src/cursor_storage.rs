use anyhow::Result;
use movie_swipe_models::{CatalogType, PaginationCursor};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Persists the pagination cursor between sessions
///
/// Stored as JSON, written atomically (temp file, then rename).
#[derive(Debug, Clone)]
pub struct CursorStorage {
    cursor_path: PathBuf,
}

impl CursorStorage {
    pub fn new(cursor_path: &Path) -> Self {
        Self {
            cursor_path: cursor_path.to_path_buf(),
        }
    }

    /// Load the saved cursor for `catalog`
    ///
    /// A missing or unreadable file, or a cursor saved for another catalog,
    /// yields a fresh cursor at page 1.
    pub fn load(&self, catalog: CatalogType) -> PaginationCursor {
        if !self.cursor_path.exists() {
            debug!("Cursor file does not exist, starting at page 1");
            return PaginationCursor::new(catalog);
        }

        let cursor = std::fs::read_to_string(&self.cursor_path)
            .map_err(anyhow::Error::from)
            .and_then(|content| serde_json::from_str::<PaginationCursor>(&content).map_err(anyhow::Error::from));

        match cursor {
            Ok(cursor) if cursor.catalog_type == catalog => {
                info!(catalog = %catalog, page = cursor.page_index, "Resuming catalog cursor");
                cursor
            }
            Ok(cursor) => {
                info!(
                    "Saved cursor is for catalog {}, starting {} at page 1",
                    cursor.catalog_type, catalog
                );
                PaginationCursor::new(catalog)
            }
            Err(e) => {
                warn!("Failed to read cursor file {:?}: {}. Starting at page 1.", self.cursor_path, e);
                PaginationCursor::new(catalog)
            }
        }
    }

    pub fn save(&self, cursor: &PaginationCursor) -> Result<()> {
        if let Some(parent) = self.cursor_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(cursor)?;

        let temp_path = self.cursor_path.with_extension("tmp");
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, &self.cursor_path)?;
        debug!(page = cursor.page_index, "Saved catalog cursor");
        Ok(())
    }

    pub fn clear(&self) -> Result<bool> {
        if self.cursor_path.exists() {
            std::fs::remove_file(&self.cursor_path)?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn path(&self) -> &Path {
        &self.cursor_path
    }
}

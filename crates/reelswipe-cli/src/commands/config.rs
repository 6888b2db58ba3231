use super::cards::styled_table;
use super::prompts::{prompt_string, prompt_yes_no};
use crate::output::Output;
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color};
use movie_swipe_config::{Config, PathManager};
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, output),
        ConfigCommands::Init { force } => init_config(force, output),
        ConfigCommands::SetApiKey { key } => set_api_key(key, output),
    }
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Defaults are used until you run 'reelswipe config init' or 'reelswipe config set-api-key'.");
    }

    let config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    let api_key = if full {
        config.provider.api_key.clone()
    } else {
        mask_string(&config.provider.api_key)
    };

    if !output.is_human() {
        let mut value = serde_json::to_value(&config)?;
        value["provider"]["api_key"] = json!(api_key);
        output.json(&json!({
            "type": "config",
            "path": config_file.display().to_string(),
            "config": value,
        }));
        return Ok(());
    }

    println!("\n{}", "Configuration".bright_cyan().bold());
    println!("{} {}\n", "File:".bold(), config_file.display());

    let mut provider_table = styled_table();
    provider_table.set_header(vec![Cell::new("Provider").fg(Color::Cyan).add_attribute(Attribute::Bold)]);
    provider_table.add_row(vec![Cell::new("API Key"), Cell::new(api_key)]);
    provider_table.add_row(vec![Cell::new("Base URL"), Cell::new(&config.provider.base_url)]);
    provider_table.add_row(vec![Cell::new("Language"), Cell::new(&config.provider.language)]);
    provider_table.add_row(vec![Cell::new("Catalog"), Cell::new(config.provider.catalog)]);
    println!("{}\n", provider_table);

    let swipe = &config.swipe;
    let directions: Vec<String> = swipe.allowed_directions.iter().map(|d| d.to_string()).collect();
    let mut swipe_table = styled_table();
    swipe_table.set_header(vec![Cell::new("Swipe").fg(Color::Cyan).add_attribute(Attribute::Bold)]);
    swipe_table.add_row(vec![Cell::new("Low-water mark"), Cell::new(swipe.low_water_mark)]);
    swipe_table.add_row(vec![Cell::new("Target queue size"), Cell::new(swipe.target_queue_size)]);
    swipe_table.add_row(vec![Cell::new("Max pages per refill"), Cell::new(swipe.max_pages_per_cycle)]);
    swipe_table.add_row(vec![Cell::new("Requirement"), Cell::new(format!("{:?}", swipe.requirement))]);
    swipe_table.add_row(vec![Cell::new("Threshold"), Cell::new(swipe.threshold())]);
    swipe_table.add_row(vec![Cell::new("Allowed directions"), Cell::new(directions.join(", "))]);
    println!("{}\n", swipe_table);

    let mut user_table = styled_table();
    user_table.set_header(vec![Cell::new("User").fg(Color::Cyan).add_attribute(Attribute::Bold)]);
    user_table.add_row(vec![Cell::new("User ID"), Cell::new(&config.user.user_id)]);
    user_table.add_row(vec![
        Cell::new("Screen"),
        Cell::new(format!("{} x {}", config.screen.width, config.screen.height)),
    ]);
    println!("{}", user_table);
    Ok(())
}

fn init_config(force: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if config_file.exists() && !force {
        let overwrite = output.is_human()
            && prompt_yes_no(&format!("{} already exists. Overwrite?", config_file.display()), Some(false))?;
        if !overwrite {
            output.info("Keeping the existing configuration");
            return Ok(());
        }
    }

    path_manager
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create directories: {}", e))?;
    Config::default()
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to write {}: {}", config_file.display(), e))?;
    tracing::info!(config_file = %config_file.display(), "Wrote default configuration");
    output.success(format!("Wrote default configuration to {}", config_file.display()));
    Ok(())
}

fn set_api_key(key: Option<String>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();
    let mut config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    let key = match key {
        Some(key) => key,
        None => prompt_string("TMDB API key", None)?,
    };
    let key = key.trim().to_string();
    if key.is_empty() {
        return Err(eyre!("API key cannot be empty"));
    }

    config.provider.api_key = key;
    config
        .validate()
        .map_err(|e| eyre!("Configuration is invalid: {}", e))?;
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to write {}: {}", config_file.display(), e))?;
    output.success(format!("API key saved to {}", config_file.display()));
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() || s == "YOUR_API_KEY" {
        return "<not set>".to_string();
    }
    if s.len() <= 4 {
        return "*".repeat(s.len());
    }
    format!("{}***{}", &s[..2], &s[s.len() - 2..])
}

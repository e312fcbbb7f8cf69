//! Config command - show and edit the Ramses Out configuration

use clap::{Args, Subcommand};
use ramses_out::config::{default_config_path, default_history_path};
use ramses_out::OutConfig;
use std::path::PathBuf;

/// Arguments for the config command
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,

    /// Emit JSON instead of text (show only)
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Set the project root
    SetRoot { path: PathBuf },
    /// Set the project code
    SetCode { code: String },
    /// Set the user recorded in markers and history
    SetUser { name: String },
    /// Set the collection path, relative to the project root
    SetCollectionPath { path: String },
}

/// Execute the config command
pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let mut config = OutConfig::load();

    let Some(action) = args.action else {
        return show(&config, args.json);
    };

    match action {
        ConfigAction::SetRoot { path } => config.project_root = Some(path),
        ConfigAction::SetCode { code } => config.project_code = Some(code),
        ConfigAction::SetUser { name } => config.user = Some(name),
        ConfigAction::SetCollectionPath { path } => {
            config.review.default_collection_path = path;
        }
    }
    config.save()?;
    println!("Saved {}", default_config_path()?.display());
    Ok(())
}

fn show(config: &OutConfig, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    println!("Config:  {}", default_config_path()?.display());
    println!("History: {}", default_history_path()?.display());
    println!(
        "Project root:    {}",
        config
            .project_root
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(unset)".to_string())
    );
    println!(
        "Project code:    {}",
        config.project_code.as_deref().unwrap_or("(unset)")
    );
    println!("User:            {}", config.current_user());
    println!(
        "Collection path: {}",
        if config.review.default_collection_path.is_empty() {
            "(unset)"
        } else {
            &config.review.default_collection_path
        }
    );
    Ok(())
}

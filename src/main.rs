use clap::Parser;
use slashpad::app::{self, AppOptions};
use slashpad::config::{self, Config, ConfigError};
use slashpad::document::markdown::{parse_document, welcome_document};
use slashpad::logging;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "slashpad")]
#[command(about = "A terminal rich-text editor with slash commands")]
#[command(version)]
struct Args {
    /// Markdown file to load as initial content
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Character that opens the command menu
    #[arg(short, long)]
    trigger: Option<String>,

    /// Config file (default: ~/.config/slashpad.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `slashpad=trace`
    #[arg(long)]
    log_level: Option<String>,
}

fn load(path: Option<&PathBuf>) -> Result<Config, ConfigError> {
    let result = match path {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    };
    match result {
        // A missing default file just means defaults; a missing explicit one is an error.
        Err(ConfigError::NotFound(_)) if path.is_none() => Ok(Config::default()),
        other => other,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut cfg = load(args.config.as_ref())?;
    cfg.merge_cli(args.trigger, args.log_level);
    let trigger = cfg.trigger()?;

    let log_dir = cfg.log_dir.clone().unwrap_or_else(logging::default_log_dir);
    let _log_guard = logging::init(cfg.log_level.as_deref(), &log_dir);
    tracing::info!(trigger = %trigger, history_depth = cfg.history_depth, "starting slashpad");

    let content = match &args.file {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            tracing::debug!(file = %path.display(), bytes = text.len(), "loaded initial content");
            parse_document(&text)
        }
        None => welcome_document(),
    };

    app::run(AppOptions {
        content,
        trigger,
        history_depth: cfg.history_depth,
    })?;

    tracing::info!("exiting");
    Ok(())
}

use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing::info;

use examdesk::cache::{clear_cache, CachingProvider};
use examdesk::cli::Cli;
use examdesk::config::Config;
use examdesk::extract::{ExtractionProvider, GeminiProvider};
use examdesk::report;
use examdesk::state::App;
use examdesk::{logging, tui};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().apply_cli(&cli);

    if cli.clear_cache {
        clear_cache(&config.cache_dir).map_err(|e| anyhow!(e))?;
        eprintln!("Extraction cache cleared.");
        return Ok(());
    }

    if let Err(e) = logging::init(&config.log_file) {
        eprintln!("Warning: {}", e);
    }
    info!(
        model = %config.model,
        cache = config.use_cache,
        api_key = config.api_key.is_some(),
        "starting"
    );

    let gemini = GeminiProvider::new(config.gemini()).context("Cannot set up extraction client")?;
    let provider: Arc<dyn ExtractionProvider> = if config.use_cache {
        Arc::new(CachingProvider::new(gemini, config.cache_dir.clone()))
    } else {
        Arc::new(gemini)
    };

    let mut app = App::new(config);
    if let Some(ref pdf) = cli.pdf {
        app.path_input = pdf.clone();
    }

    let app = tui::run_tui(app, provider).map_err(|e| anyhow!(e))?;

    if let Some(finished) = app.session.report() {
        print!("{}", report::format_summary(finished));
        if let Some(ref path) = app.exported_to {
            println!("Report written to {}", path.display());
        }
    }
    info!("exiting");
    Ok(())
}

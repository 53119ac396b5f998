//! NephroScreen: Chronic Kidney Disease Screening Dashboard
//!
//! Main entry point for the terminal application.

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nephroscreen::application::ScreeningService;
use nephroscreen::tui::App;

fn main() -> Result<()> {
    // Initialize logging.
    //
    // IMPORTANT: writing logs to the terminal will corrupt the TUI (alternate screen).
    // Default behavior:
    // - interactive TTY: log to a file
    // - non-interactive: log to stdout (so `docker logs` works)
    let log_mode =
        std::env::var("NEPHROSCREEN_LOG_MODE").unwrap_or_else(|_| "auto".to_string());

    let interactive = std::io::stdout().is_terminal();
    let use_file = match log_mode.as_str() {
        "file" => true,
        "stdout" => false,
        // auto
        _ => interactive,
    };

    let (writer, _guard) = if use_file {
        let log_file = std::env::var("NEPHROSCREEN_LOG_FILE")
            .unwrap_or_else(|_| "nephroscreen.log".to_string());

        if let Some(parent) = Path::new(&log_file).parent() {
            // Best-effort: don't fail startup just because the directory is missing.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    tracing::info!("Starting NephroScreen...");

    // Load the screening artifacts before any UI exists; absence is fatal.
    let model_dir =
        std::env::var("NEPHROSCREEN_MODEL_DIR").unwrap_or_else(|_| "models".to_string());
    let (schema, model) = nephroscreen::load_artifacts(Path::new(&model_dir))
        .with_context(|| format!("Failed to load screening artifacts from '{model_dir}'"))?;

    let service = ScreeningService::new(Arc::new(schema), Arc::new(model));

    // Run the TUI application
    let mut app = App::new(Arc::new(service));
    app.run()?;

    tracing::info!("NephroScreen shutdown complete.");
    Ok(())
}

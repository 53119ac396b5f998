//! NephroScreen web form: browser front-end over the same screening service.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nephroscreen::application::ScreeningService;

#[tokio::main]
async fn main() -> Result<()> {
    // A server never owns the terminal, so logs always go to stdout.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting NephroScreen web form...");

    // Load the screening artifacts before binding; absence is fatal.
    let model_dir =
        std::env::var("NEPHROSCREEN_MODEL_DIR").unwrap_or_else(|_| "models".to_string());
    let (schema, model) = nephroscreen::load_artifacts(Path::new(&model_dir))
        .with_context(|| format!("Failed to load screening artifacts from '{model_dir}'"))?;

    let service = ScreeningService::new(Arc::new(schema), Arc::new(model));
    let app = nephroscreen::web::router(Arc::new(service));

    let bind =
        std::env::var("NEPHROSCREEN_BIND").unwrap_or_else(|_| "127.0.0.1:5000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind '{bind}'"))?;

    tracing::info!("Listening on http://{bind}");
    axum::serve(listener, app).await?;

    Ok(())
}

//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development and debugging when you only want the REST server
//! (with OpenAPI/Swagger UI). The workspace's main `dcr-run` binary runs the
//! REST server and the reminder poller together.

use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_rest::{ApiDoc, AppState};
use dcr_core::{CoreConfig, NonEmptyText, DEFAULT_CLINIC_DATA_DIR};

/// Main entry point for the DCR REST API server.
///
/// # Environment Variables
/// - `DCR_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `CLINIC_DATA_DIR`: Directory for clinic data storage (default: "clinic_data")
/// - `DCR_CLINIC_NAME`: Clinic display name (default: "DCR Dental Clinic")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the clinic data directory does not exist,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("DCR_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting DCR REST API on {}", addr);

    let clinic_data_dir =
        std::env::var("CLINIC_DATA_DIR").unwrap_or_else(|_| DEFAULT_CLINIC_DATA_DIR.into());
    let clinic_data_path = Path::new(&clinic_data_dir);
    if !clinic_data_path.exists() {
        anyhow::bail!(
            "Clinic data directory does not exist: {}",
            clinic_data_path.display()
        );
    }

    let clinic_name = std::env::var("DCR_CLINIC_NAME").unwrap_or_else(|_| "DCR Dental Clinic".into());
    let clinic_name = NonEmptyText::new(clinic_name)
        .map_err(|e| anyhow::anyhow!("invalid DCR_CLINIC_NAME: {e}"))?;

    let cfg = Arc::new(CoreConfig::new(clinic_data_path.to_path_buf(), clinic_name)?);

    let state = AppState { cfg };

    let app = api_rest::router(state).merge(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

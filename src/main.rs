//! Main DCR binary: REST API server plus the reminder polling job.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_rest::{ApiDoc, AppState};
use dcr_core::{
    CoreConfig, NonEmptyText, ReminderDispatcher, TracingSender, DEFAULT_CLINIC_DATA_DIR,
};

/// Main entry point for the DCR application.
///
/// Runs two things concurrently under one runtime:
/// - the REST API server (with OpenAPI/Swagger documentation), and
/// - the appointment reminder poller, one pass per configured interval.
///
/// # Environment Variables
/// - `DCR_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CLINIC_DATA_DIR`: Directory for clinic data storage (default: "clinic_data")
/// - `DCR_CLINIC_NAME`: Clinic display name (default: "DCR Dental Clinic")
/// - `DCR_REMINDER_POLL_SECS`: Seconds between reminder polls (default: 300)
///
/// # Errors
/// Returns an error if startup configuration is invalid, the address cannot
/// be bound, or the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("dcr=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("DCR_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let clinic_data_dir =
        std::env::var("CLINIC_DATA_DIR").unwrap_or_else(|_| DEFAULT_CLINIC_DATA_DIR.into());
    let clinic_data_path = Path::new(&clinic_data_dir);
    if !clinic_data_path.exists() {
        anyhow::bail!(
            "Clinic data directory does not exist: {}",
            clinic_data_path.display()
        );
    }

    let clinic_name =
        std::env::var("DCR_CLINIC_NAME").unwrap_or_else(|_| "DCR Dental Clinic".into());
    let clinic_name = NonEmptyText::new(clinic_name)
        .map_err(|e| anyhow::anyhow!("invalid DCR_CLINIC_NAME: {e}"))?;

    let poll_secs: u64 = std::env::var("DCR_REMINDER_POLL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(300);

    let cfg = Arc::new(CoreConfig::new(clinic_data_path.to_path_buf(), clinic_name)?);

    tracing::info!("++ Starting DCR REST on {}", rest_addr);
    tracing::info!("++ Reminder poll every {}s", poll_secs);

    // REST server
    let state = AppState { cfg: cfg.clone() };
    let app = api_rest::router(state).merge(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    let rest_server = tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(&rest_addr).await.unwrap();
        axum::serve(listener, app).await.unwrap();
    });

    // Reminder poller. The tracing sender logs instead of delivering; a real
    // WhatsApp gateway adapter plugs in here via the MessageSender trait.
    let dispatcher = ReminderDispatcher::new(cfg, Arc::new(TracingSender));
    let poller = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(poll_secs));
        loop {
            ticker.tick().await;
            match dispatcher.poll_once(chrono::Utc::now()) {
                Ok(summary) => {
                    if summary.considered > 0 {
                        tracing::info!(
                            sent = summary.sent,
                            failed = summary.failed,
                            skipped_no_phone = summary.skipped_no_phone,
                            skipped_already_sent = summary.skipped_already_sent,
                            "reminder poll complete"
                        );
                    }
                }
                Err(e) => tracing::error!("reminder poll failed: {:?}", e),
            }
        }
    });

    // Run both
    let (rest_result, poll_result) = tokio::join!(rest_server, poller);
    rest_result.map_err(anyhow::Error::from)?;
    poll_result.map_err(anyhow::Error::from)?;

    Ok(())
}

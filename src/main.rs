use std::sync::Arc;

use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use skillswap::config::{AppConfig, GatewayConfig};
use skillswap::gateway::{ProfileGateway, RestGateway};
use skillswap::navigation::RedirectNavigator;
use skillswap::wizard::{wizard_routes, WizardEngine, WizardRouteState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing: env-filtered stderr plus a daily rolling file.
    let file_appender = tracing_appender::rolling::daily("./logs", "skillswap.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(file_writer)
        .with_target(false)
        .with_ansi(false)
        .init();

    let app_config = AppConfig::from_env();
    let gateway_config = GatewayConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export SKILLSWAP_BACKEND_URL=https://<project>.example.com");
        eprintln!("  export SKILLSWAP_SERVICE_KEY=<service-role-key>");
        std::process::exit(1);
    });

    // Session owner. Real deployments put an auth layer in front; the
    // wizard itself only needs the opaque identifier.
    let user_id: Option<Uuid> = std::env::var("SKILLSWAP_USER_ID")
        .ok()
        .and_then(|v| v.parse().ok());

    eprintln!("🛠  Skillswap wizard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", gateway_config.base_url);
    eprintln!("   Photo bucket: {}", gateway_config.photo_bucket);
    eprintln!(
        "   Wizard API: http://0.0.0.0:{}/api/wizard/status",
        app_config.port
    );

    let gateway: Arc<dyn ProfileGateway> = Arc::new(RestGateway::new(gateway_config));
    let navigator = Arc::new(RedirectNavigator::new(app_config.dashboard_path.clone()));

    let mut engine = WizardEngine::new(user_id, Arc::clone(&gateway), navigator.clone());

    // Resume a partially completed profile where it left off.
    if let Some(owner) = user_id {
        match gateway.profile_status(owner).await {
            Ok(status) => engine.resume(&status).await,
            Err(e) => tracing::warn!(error = %e, "Could not fetch profile status"),
        }
    } else {
        eprintln!("   Warning: SKILLSWAP_USER_ID not set; saves will be rejected");
    }
    eprintln!("   Current step: {}\n", engine.state().current_step());

    let state = WizardRouteState {
        engine: Arc::new(RwLock::new(engine)),
        navigator,
    };
    let app = wizard_routes(state).layer(CorsLayer::permissive());

    let listener =
        tokio::net::TcpListener::bind(format!("0.0.0.0:{}", app_config.port)).await?;
    tracing::info!(port = app_config.port, "Wizard REST server started");
    axum::serve(listener, app).await?;

    Ok(())
}

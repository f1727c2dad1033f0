mod api;
mod middleware;
mod scan_log;
mod scheduler;
mod sink;
#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

use leadscan_core::{load_targets, Environment, SystemClock};
use leadscan_qualify::{CallPolicy, GeminiClient, LeadQualifier};
use leadscan_sources::{CollectorSource, CollectorSourceConfig, ContentSource};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
    scan_log::{ScanLog, DEFAULT_CAPACITY},
    scheduler::{ScanConfig, ScanDeps, ScanOrchestrator, DEFAULT_PANIC_BACKOFF},
    sink::JsonlLeadSink,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = leadscan_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let targets = load_targets(&config.targets_path)?;

    let model = GeminiClient::new(
        &config.gemini_api_key,
        &config.gemini_model,
        &config.gemini_base_url,
        config.ai_timeout_secs,
    )?;
    let policy = CallPolicy::new(
        config.ai_timeout_secs,
        config.ai_max_retries,
        config.ai_retry_backoff_ms,
    );
    let qualifier = LeadQualifier::new(Arc::new(model), policy, config.min_text_chars);

    let sources: Vec<Arc<dyn ContentSource>> = match &config.collector_url {
        Some(url) => CollectorSource::for_scan_platforms(&CollectorSourceConfig {
            base_url: url.clone(),
            max_items_per_target: config.max_items_per_target,
            timeout_secs: config.source_timeout_secs,
        })?,
        None => {
            tracing::warn!("LEADSCAN_COLLECTOR_URL not set; no content sources registered");
            Vec::new()
        }
    };

    let deps = ScanDeps {
        qualifier: Arc::new(qualifier),
        sources,
        sink: Arc::new(JsonlLeadSink::new(config.leads_path.clone())),
        scan_log: Arc::new(ScanLog::open(config.scan_log_path.clone(), DEFAULT_CAPACITY).await),
        clock: Arc::new(SystemClock),
        source_timeout: Duration::from_secs(config.source_timeout_secs),
        panic_backoff: DEFAULT_PANIC_BACKOFF,
    };
    let orchestrator = ScanOrchestrator::new(
        deps,
        ScanConfig {
            targets,
            interval_minutes: config.scan_interval_minutes,
        },
    )
    .await?;

    let auth = AuthState::from_env(matches!(config.env, Environment::Development))?;
    let app = build_app(
        AppState {
            orchestrator: orchestrator.clone(),
        },
        auth,
        default_rate_limit_state(),
    );

    tracing::info!(addr = %config.bind_addr, "leadscan server listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    orchestrator.stop().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}

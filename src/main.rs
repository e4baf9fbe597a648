//! Diagnostic probe: loads configuration, wires the services and exercises
//! the read surface against the configured backend.

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use wallet_service_core::AppConfig;
use wallet_service_core::app::{AppState, CancellationToken};
use wallet_service_core::config::LogFormat;
use wallet_service_core::domain::ContentFilter;

fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

/// One pass over the read surface. Failures are reported, not fatal.
async fn probe(state: &AppState, cancel: &CancellationToken) {
    match state.storage.session_token().await {
        Some(_) => info!("   ✓ Session token present"),
        None => warn!("   ✗ No session token stored, requests are unauthenticated"),
    }
    info!(
        onboarding_seen = state.storage.has_seen_onboarding().await,
        biometric = state.storage.is_biometric_enabled().await,
        "   ✓ Preferences readable"
    );

    match state
        .learning
        .get_educational_content(&ContentFilter::default().with_limit(5), cancel)
        .await
    {
        Ok(content) => info!(items = content.len(), "   ✓ Educational content reachable"),
        Err(e) if e.is_cancelled() => return,
        Err(e) => error!(error = %e, "   ✗ Educational content unavailable"),
    }

    match state.onramp.get_supported_currencies(cancel).await {
        Ok(currencies) => info!(
            fiat = currencies.fiat.len(),
            crypto = currencies.crypto.len(),
            "   ✓ On-ramp currencies reachable"
        ),
        Err(e) if e.is_cancelled() => return,
        Err(e) => error!(error = %e, "   ✗ On-ramp currencies unavailable"),
    }

    match state.wallet.get_wallet(cancel).await {
        Ok(wallet) => info!(
            wallet_id = %wallet.id,
            balances = wallet.balances.len(),
            "   ✓ Wallet reachable"
        ),
        Err(e) if e.is_cancelled() => {}
        Err(e) => error!(error = %e, "   ✗ Wallet unavailable"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    init_tracing(config.log_format);

    info!("👛 Wallet service core v{}", env!("CARGO_PKG_VERSION"));
    info!("📦 Initializing services...");

    let state = AppState::from_config(&config).context("Failed to build application state")?;
    info!("   ✓ Backend: {}", config.api_base_url);
    info!("   ✓ Storage: {}", config.storage_dir.display());

    let cancel = CancellationToken::new();
    info!("🔍 Probing backend...");
    tokio::select! {
        () = probe(&state, &cancel) => info!("Probe complete"),
        () = shutdown_signal() => {
            cancel.cancel();
            warn!("Probe cancelled");
        }
    }

    Ok(())
}

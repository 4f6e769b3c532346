//! PDF Validator API server
//!
//! REST front end for VPN request form validation. Provides endpoints for:
//!
//! - Single and batch PDF validation
//! - Health and configuration inspection
//!
//! The server starts without `GOOGLE_API_KEY`; validation requests then
//! return results with `error` status describing the configuration problem.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use validator_core::{Settings, ValidatorAgent};

mod api;
mod error;

use api::AppState;

/// Command-line arguments for the validator server
#[derive(Parser, Debug)]
#[command(name = "validator-api")]
#[command(about = "REST API for VPN request form validation")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = Settings::from_env().context("Failed to load configuration")?;

    let directive = if args.verbose {
        "debug".to_string()
    } else {
        settings.log_level.to_lowercase()
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let agent = ValidatorAgent::from_settings(settings.clone());
    if let Err(e) = &agent {
        warn!("Validation is unavailable: {}", e);
    }
    let state = AppState::new(settings, agent);

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .context("Invalid rate limiter configuration")?,
    );

    let app = api::router(state).layer(GovernorLayer {
        config: governor_conf,
    });

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

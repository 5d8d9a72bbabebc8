//! Bibrec - a bibliographic record server.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bibrec::{
    config::{Cli, Command, ServeConfig, TokenConfig, TokenOutputFormat},
    server::{auth::ApiTokenAuth, create_router, RouterConfig},
    service::RecordService,
    store::MemoryStore,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Token(config) => run_token(config),
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Configuration:");
    info!("  Base URL: {}", config.resolved_base_url());

    // Auth status with warning if disabled
    if config.auth_enabled {
        info!("  Auth: enabled");
    } else {
        warn!(
            "  Auth: DISABLED - every request runs as user '{}'",
            config.dev_user
        );
        warn!("        Enable for production: --auth-enabled --auth-secret=<secret>");
    }

    if let Some(ref schemes) = config.pid_schemes {
        info!("  PID schemes: {}", schemes.join(", "));
    }

    // Create the record service over the in-memory store
    let mut service = RecordService::new(MemoryStore::new(), config.resolved_link_secret());
    if let Some(ref schemes) = config.pid_schemes {
        service = service.with_pid_schemes(schemes.clone());
    }

    // Build router configuration
    let router_config = build_router_config(&config);

    // Create router
    let router = create_router(service, router_config);

    // Bind and serve
    let addr = config.bind_address();

    info!("");
    info!("Server listening on: http://{}", addr);
    info!("");
    info!("Try these endpoints:");
    info!("  curl http://{}/health", addr);
    info!("  curl http://{}/records/<id>/manifest", addr);
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "bibrec=debug,tower_http=debug"
    } else {
        "bibrec=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = if config.auth_enabled {
        RouterConfig::new(config.auth_secret_or_empty())
    } else {
        RouterConfig::without_auth().with_dev_user(config.dev_user.clone())
    };

    router_config = router_config
        .with_base_url(config.resolved_base_url())
        .with_cache_max_age(config.cache_max_age);

    // Apply CORS origins
    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    // Apply tracing setting
    router_config = router_config.with_tracing(!config.no_tracing);

    router_config
}

// =============================================================================
// Token Command
// =============================================================================

fn run_token(config: TokenConfig) -> ExitCode {
    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let auth = ApiTokenAuth::new(&config.secret);
    let (token, expiry) = auth.issue(&config.user, Duration::from_secs(config.ttl));

    match config.format {
        TokenOutputFormat::Token => {
            println!("{}", token);
        }
        TokenOutputFormat::Json => {
            let json = serde_json::json!({
                "token": token,
                "user": config.user,
                "expiry": expiry,
                "ttl": config.ttl,
            });
            match serde_json::to_string_pretty(&json) {
                Ok(pretty) => println!("{}", pretty),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}

//! Keygate server - Main entry point.
//!
//! Starts the Actix-web server with the activated route table and the
//! API key gate middleware.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use keygate_lib::api;
use keygate_lib::auth::GatePolicy;
use keygate_lib::config::{API_KEY_HEADER, Config};
use keygate_lib::db::ProbeHandle;
use keygate_lib::middleware::{ApiKeyGate, RequestLogger};
use keygate_lib::routes::RouteRegistry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - API_KEYS is a comma-separated list of valid keys");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Keygate Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }
    if config.auth_disabled {
        warn!("API key authentication is DISABLED via DISABLE_API_AUTH");
    }
    if config.api_keys.is_empty() {
        error!("No API keys configured. Authentication will fail for all requests.");
    } else {
        info!("{} API key(s) configured", config.api_keys.len());
    }

    // Declare and activate routes before the server binds, so no request
    // can observe a partially-activated table.
    let mut registry = RouteRegistry::new();
    api::declare_routes(&mut registry);
    registry.activate();
    let registry = Arc::new(registry);
    info!("{} route(s) activated", registry.list().count());

    // Optional Postgres connection for the debug probe
    let probe = ProbeHandle::connect(config.database_url.as_deref()).await;

    let policy = Arc::new(GatePolicy::from_config(&config));
    let bind_address = config.bind_address();
    let is_development = config.is_development();

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    // Start HTTP server
    let server = HttpServer::new(move || {
        // Configure CORS
        let cors = if is_development {
            // Permissive CORS for development
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec![
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::CONTENT_TYPE,
                    API_KEY_HEADER.parse().unwrap(),
                ])
                .max_age(3600)
        } else {
            // Restrictive CORS for production (same-origin only)
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec![
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::CONTENT_TYPE,
                    API_KEY_HEADER.parse().unwrap(),
                ])
                .max_age(3600)
        };

        let registry = Arc::clone(&registry);
        App::new()
            // Outermost: request logging; then CORS; the gate runs last
            // before dispatch so preflights never hit it
            .wrap(ApiKeyGate::new(Arc::clone(&policy)))
            .wrap(cors)
            .wrap(RequestLogger)
            // Shared state
            .app_data(actix_web::web::Data::from(Arc::clone(&registry)))
            .app_data(actix_web::web::Data::new(probe.clone()))
            // The activated route table
            .configure(|cfg| registry.configure(cfg))
    });

    server.workers(worker_count).bind(&bind_address)?.run().await
}

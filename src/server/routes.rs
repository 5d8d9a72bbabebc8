//! Router configuration for the record API.
//!
//! This module defines the HTTP routes and applies middleware for identity
//! resolution and CORS.
//!
//! # Route Structure
//!
//! ```text
//! /health                                        - Health check (public)
//! /records                                       - Create a draft
//! /records/{id}                                  - Read a published record
//! /records/{id}/draft                            - Read/update/discard a draft
//! /records/{id}/draft/files                      - Register file entries
//! /records/{id}/draft/actions/publish            - Publish a draft
//! /records/{id}/draft/review                     - Review request CRUD
//! /records/{id}/draft/actions/submit-review      - Submit for review
//! /records/{id}/draft/pids/{scheme}              - Reserve/discard a PID
//! /records/{id}/access/links                     - List/create secret links
//! /records/{id}/access/links/{link_id}           - Secret link CRUD
//! /records/{id}/manifest                         - IIIF manifest (record)
//! /records/{id}/draft/manifest                   - IIIF manifest (draft)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use bibrec::server::routes::{create_router, RouterConfig};
//! use bibrec::service::RecordService;
//! use bibrec::store::MemoryStore;
//!
//! let service = RecordService::new(MemoryStore::new(), "link-secret");
//!
//! let config = RouterConfig::new("api-secret")
//!     .with_base_url("https://records.example.org");
//!
//! let router = create_router(service, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use http::header::{AUTHORIZATION, CONTENT_TYPE, IF_MATCH};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::ApiTokenAuth;
use super::handlers::{
    add_draft_files, create_record, delete_draft, draft_manifest, health_handler, links_create,
    links_delete, links_partial_update, links_read, links_search, links_update_not_allowed,
    pids_discard, pids_reserve, publish_draft, read_draft, read_record, record_manifest,
    review_delete, review_read, review_submit, review_update, update_draft, AppState,
};
use crate::service::RecordService;
use crate::store::RecordStore;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Secret key for bearer-token authentication
    pub auth_secret: String,

    /// Whether bearer-token authentication is enabled
    pub auth_enabled: bool,

    /// Identity injected into every request when auth is disabled
    pub dev_user: String,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Externally visible server root, used in manifest URLs
    pub base_url: String,

    /// Cache-Control max-age for manifest responses, in seconds
    pub cache_max_age: u32,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a new router configuration with the given auth secret.
    ///
    /// By default:
    /// - Authentication is enabled
    /// - CORS allows any origin
    /// - Base URL is `http://localhost:3000`
    /// - Manifest cache max-age is 1 hour (3600 seconds)
    /// - Tracing is enabled
    pub fn new(auth_secret: impl Into<String>) -> Self {
        Self {
            auth_secret: auth_secret.into(),
            auth_enabled: true,
            dev_user: "dev".to_string(),
            cors_origins: None, // Allow any origin by default
            base_url: "http://localhost:3000".to_string(),
            cache_max_age: 3600,
            enable_tracing: true,
        }
    }

    /// Create a configuration with authentication disabled.
    ///
    /// Every request runs as the `dev` user. **Warning**: this should only be
    /// used for development/testing.
    pub fn without_auth() -> Self {
        Self {
            auth_secret: String::new(),
            auth_enabled: false,
            dev_user: "dev".to_string(),
            cors_origins: None,
            base_url: "http://localhost:3000".to_string(),
            cache_max_age: 3600,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    /// Pass None (or don't call this method) to allow any origin.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Set the externally visible server root (no trailing slash).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the Cache-Control max-age for manifest responses.
    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    /// Enable or disable authentication.
    pub fn with_auth_enabled(mut self, enabled: bool) -> Self {
        self.auth_enabled = enabled;
        self
    }

    /// Set the identity used when authentication is disabled.
    pub fn with_dev_user(mut self, user: impl Into<String>) -> Self {
        self.dev_user = user.into();
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// This function builds the complete Axum router with:
/// - Public routes (health check)
/// - The record API with identity-resolution middleware
/// - CORS configuration
/// - Request tracing (optional)
pub fn create_router<S>(service: RecordService<S>, config: RouterConfig) -> Router
where
    S: RecordStore,
{
    let app_state = AppState::new(service, config.base_url.clone(), config.cache_max_age);

    let cors = build_cors_layer(&config);

    // The identity middleware only resolves the caller; authorization is
    // enforced per handler (mutations require an identity, reads fall back
    // to link tokens or anonymous access).
    let record_routes = build_record_routes(app_state);
    let record_routes = if config.auth_enabled {
        let auth = ApiTokenAuth::new(&config.auth_secret);
        record_routes.layer(middleware::from_fn_with_state(
            auth,
            super::auth::identity_middleware,
        ))
    } else {
        record_routes.layer(middleware::from_fn_with_state(
            config.dev_user.clone(),
            super::auth::dev_identity_middleware,
        ))
    };

    let router = Router::new()
        .merge(record_routes)
        .route("/health", get(health_handler))
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the `/records` route tree.
fn build_record_routes<S>(app_state: AppState<S>) -> Router
where
    S: RecordStore,
{
    Router::new()
        .route("/records", post(create_record::<S>))
        .route("/records/{id}", get(read_record::<S>))
        .route(
            "/records/{id}/draft",
            get(read_draft::<S>)
                .put(update_draft::<S>)
                .delete(delete_draft::<S>),
        )
        .route("/records/{id}/draft/files", post(add_draft_files::<S>))
        .route(
            "/records/{id}/draft/actions/publish",
            post(publish_draft::<S>),
        )
        .route(
            "/records/{id}/draft/review",
            get(review_read::<S>)
                .put(review_update::<S>)
                .delete(review_delete::<S>),
        )
        .route(
            "/records/{id}/draft/actions/submit-review",
            post(review_submit::<S>),
        )
        .route(
            "/records/{id}/draft/pids/{scheme}",
            post(pids_reserve::<S>).delete(pids_discard::<S>),
        )
        .route(
            "/records/{id}/access/links",
            get(links_search::<S>).post(links_create::<S>),
        )
        .route(
            "/records/{id}/access/links/{link_id}",
            get(links_read::<S>)
                .put(links_update_not_allowed)
                .patch(links_partial_update::<S>)
                .delete(links_delete::<S>),
        )
        .route("/records/{id}/draft/manifest", get(draft_manifest::<S>))
        .route("/records/{id}/manifest", get(record_manifest::<S>))
        .with_state(app_state)
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::OPTIONS,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, IF_MATCH])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => {
            // No origins allowed - this effectively disables CORS
            cors
        }
        Some(origins) => {
            // Parse origins into HeaderValues
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Create a development router with authentication disabled.
///
/// **Warning**: This should only be used for local development and testing.
/// Never use this in production.
pub fn create_dev_router<S>(service: RecordService<S>) -> Router
where
    S: RecordStore,
{
    create_router(service, RouterConfig::without_auth())
}

/// Create a production router with the given secret key.
///
/// Uses secure defaults:
/// - Authentication enabled
/// - 1 hour manifest cache max-age
/// - Tracing enabled
/// - CORS allows any origin (configure as needed)
pub fn create_production_router<S>(
    service: RecordService<S>,
    auth_secret: impl Into<String>,
) -> Router
where
    S: RecordStore,
{
    create_router(service, RouterConfig::new(auth_secret))
}

// =============================================================================
// Tests
// =============================================================================

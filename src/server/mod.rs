//! HTTP server layer for the record API.
//!
//! This module provides the REST surface over the record services.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │    /records/{id}/draft/...   /records/{id}/access/links/...     │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │    auth     │  │        routes           │  │
//! │  │ (requests)  │  │ (API token) │  │  (router config)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod handlers;
pub mod routes;

pub use auth::{identity_middleware, ApiTokenAuth, AuthError, OptionalIdentity};
pub use handlers::{
    health_handler, AccessQuery, AppState, ErrorResponse, HealthResponse, LinkListResponse,
};
pub use routes::{create_dev_router, create_production_router, create_router, RouterConfig};

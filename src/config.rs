//! Configuration management for the record server.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `BIBREC_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use bibrec::config::{Cli, Command};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! match cli.into_command() {
//!     Command::Serve(config) => { /* start the server */ }
//!     Command::Token(config) => { /* mint an API token */ }
//! }
//! ```
//!
//! # Environment Variables
//!
//! All configuration options can be set via environment variables with the `BIBREC_` prefix:
//!
//! - `BIBREC_HOST` - Server bind address (default: 0.0.0.0)
//! - `BIBREC_PORT` - Server port (default: 3000)
//! - `BIBREC_BASE_URL` - Externally visible root for manifest URLs
//! - `BIBREC_AUTH_SECRET` - HMAC secret for API tokens
//! - `BIBREC_AUTH_ENABLED` - Enable authentication (default: true)
//! - `BIBREC_LINK_SECRET` - HMAC secret for secret-link tokens
//! - `BIBREC_PID_SCHEMES` - Allowed PID schemes (default: doi,oai)
//! - `BIBREC_CACHE_MAX_AGE` - Manifest cache max-age seconds (default: 3600)
//! - `BIBREC_CORS_ORIGINS` - Allowed CORS origins (default: any)

use clap::{Args, Parser, Subcommand, ValueEnum};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default manifest cache max-age in seconds (1 hour).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 3600;

/// Default API token lifetime in seconds (1 hour).
pub const DEFAULT_TOKEN_TTL: u64 = 3600;

/// Default identity when authentication is disabled.
pub const DEFAULT_DEV_USER: &str = "dev";

// =============================================================================
// CLI
// =============================================================================

/// Bibrec - a bibliographic record server.
///
/// Serves a REST API for managing record drafts, review requests, PID
/// reservations and secret links, and exposes IIIF Presentation manifests
/// for records with image files.
#[derive(Parser, Debug, Clone)]
#[command(name = "bibrec")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeConfig,
}

impl Cli {
    /// Resolve the command to run; plain `bibrec` serves.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve(ServeConfig),

    /// Mint an API token for a user.
    Token(TokenConfig),
}

// =============================================================================
// Serve Configuration
// =============================================================================

/// Configuration for the `serve` command.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "BIBREC_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "BIBREC_PORT")]
    pub port: u16,

    /// Externally visible server root, used in manifest URLs.
    ///
    /// If not specified, derived from the bind address.
    #[arg(long, env = "BIBREC_BASE_URL")]
    pub base_url: Option<String>,

    // =========================================================================
    // Authentication Configuration
    // =========================================================================
    /// Secret key for HMAC-SHA256 API token authentication.
    ///
    /// If not provided and auth is enabled, the server will fail to start.
    #[arg(long, env = "BIBREC_AUTH_SECRET")]
    pub auth_secret: Option<String>,

    /// Enable API token authentication.
    ///
    /// When disabled, every request runs as the dev user.
    /// WARNING: Only disable authentication in development/testing.
    #[arg(long, default_value_t = true, env = "BIBREC_AUTH_ENABLED")]
    pub auth_enabled: bool,

    /// Identity injected into every request when auth is disabled.
    #[arg(long, default_value = DEFAULT_DEV_USER, env = "BIBREC_DEV_USER")]
    pub dev_user: String,

    /// Secret key for deriving secret-link tokens.
    ///
    /// Falls back to the auth secret if not set. Changing it invalidates
    /// all previously issued links.
    #[arg(long, env = "BIBREC_LINK_SECRET")]
    pub link_secret: Option<String>,

    // =========================================================================
    // PID Configuration
    // =========================================================================
    /// PID schemes available for reservation (comma-separated).
    ///
    /// If not specified, allows "doi" and "oai".
    #[arg(long, env = "BIBREC_PID_SCHEMES", value_delimiter = ',')]
    pub pid_schemes: Option<Vec<String>>,

    // =========================================================================
    // HTTP Configuration
    // =========================================================================
    /// Cache-Control max-age for manifest responses, in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "BIBREC_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "BIBREC_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        // Check auth secret is provided when auth is enabled
        if self.auth_enabled && self.auth_secret.is_none() {
            return Err(
                "Authentication is enabled but no secret provided. \
                 Set --auth-secret or BIBREC_AUTH_SECRET, or disable auth with --auth-enabled=false"
                    .to_string(),
            );
        }

        // A link secret must be derivable from somewhere
        if self.link_secret.is_none() && self.auth_secret.is_none() {
            return Err(
                "No link secret available. Set --link-secret or BIBREC_LINK_SECRET \
                 (or provide an auth secret to fall back to)"
                    .to_string(),
            );
        }

        if let Some(schemes) = &self.pid_schemes {
            if schemes.iter().any(|s| s.is_empty()) {
                return Err("pid_schemes must not contain empty entries".to_string());
            }
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the externally visible server root (no trailing slash).
    pub fn resolved_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}", self.bind_address()),
        }
    }

    /// Get the auth secret, or empty if not set (call validate() first).
    pub fn auth_secret_or_empty(&self) -> &str {
        self.auth_secret.as_deref().unwrap_or("")
    }

    /// Get the secret-link key, falling back to the auth secret.
    pub fn resolved_link_secret(&self) -> &str {
        self.link_secret
            .as_deref()
            .or(self.auth_secret.as_deref())
            .unwrap_or("")
    }
}

// =============================================================================
// Token Configuration
// =============================================================================

/// Output format of the `token` command.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOutputFormat {
    /// Print the bare token.
    Token,

    /// Print a JSON object with token, user and expiry.
    Json,
}

/// Configuration for the `token` command.
#[derive(Args, Debug, Clone)]
pub struct TokenConfig {
    /// User to mint the token for.
    #[arg(long)]
    pub user: String,

    /// Secret key (must match the server's auth secret).
    #[arg(long, env = "BIBREC_AUTH_SECRET")]
    pub secret: String,

    /// Token lifetime in seconds.
    #[arg(long, default_value_t = DEFAULT_TOKEN_TTL)]
    pub ttl: u64,

    /// Output format.
    #[arg(long, value_enum, default_value_t = TokenOutputFormat::Token)]
    pub format: TokenOutputFormat,
}

impl TokenConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.user.is_empty() {
            return Err("user must not be empty".to_string());
        }
        if self.secret.is_empty() {
            return Err("secret must not be empty".to_string());
        }
        if self.ttl == 0 {
            return Err("ttl must be greater than 0".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use petcare_config::ConfigError;
use petcare_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const UNAVAILABLE: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the Petcare service at {url}")]
    #[diagnostic(
        code(petcare::connection_failed),
        help("Check network access. Reason: {reason}")
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("No result from {resource}")]
    #[diagnostic(
        code(petcare::unavailable),
        help("The service rejected the request or the session could not be renewed. Retry later.")
    )]
    Unavailable { resource: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Login refused for profile '{profile}'")]
    #[diagnostic(
        code(petcare::auth_failed),
        help(
            "Verify the account email and password.\n\
             Run: petcare config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(petcare::no_credentials),
        help("Set email in the profile, and PETCARE_PASSWORD or a keyring entry.")
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Device '{identifier}' not found")]
    #[diagnostic(
        code(petcare::not_found),
        help("Run: petcare flaps (or hubs, pets) to see available ids")
    )]
    NotFound { identifier: String },

    #[error("Lock mode {mode} was not confirmed for flap {flap_id}")]
    #[diagnostic(
        code(petcare::lock_unconfirmed),
        help("The flap may still be applying the change. Check with: petcare flaps")
    )]
    LockUnconfirmed { flap_id: i64, mode: String },

    #[error("Malformed response: {message}")]
    #[diagnostic(code(petcare::malformed))]
    Malformed { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(petcare::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(petcare::profile_not_found),
        help(
            "Add a [profiles.{name}] table to {path}\n\
             or set PETCARE_EMAIL and PETCARE_PASSWORD."
        )
    )]
    ProfileNotFound { name: String, path: String },

    #[error(transparent)]
    #[diagnostic(code(petcare::config))]
    Config(ConfigError),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(petcare::timeout),
        help("Increase the timeout with --timeout or retry later.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Unavailable { .. } | Self::LockUnconfirmed { .. } => exit_code::UNAVAILABLE,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            other => CliError::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::Unavailable { resource } => CliError::Unavailable { resource },
            CoreError::MalformedResponse { message } => CliError::Malformed { message },
            CoreError::DeviceNotFound { identifier } => CliError::NotFound { identifier },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "request".into(),
                reason: message,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(msg) => CliError::Internal(msg),
        }
    }
}

// petcare-api: Async Rust client for the Sure Petcare cloud API

pub mod auth;
pub mod client;
pub mod error;
pub mod headers;
pub mod models;
pub mod session;
pub mod transport;

pub use client::{Credentials, DEFAULT_BASE_URL, PetcareClient};
pub use error::Error;
pub use reqwest::Method;
pub use session::{RateLimits, RateWindow, Session};
pub use transport::{RetryPolicy, TlsMode, TransportConfig};

//! Typed access to the DocBase REST API.

pub mod client;
pub mod executor;
pub mod types;

pub use client::{ClientConfig, DocbaseClient};
pub use executor::{Clock, RateLimitExecutor, SystemClock};

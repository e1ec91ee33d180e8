//! Bangumi API v0 client.
//!
//! A rate-limited client for the public catalog API. It performs no retries;
//! retry policy belongs to the caller.

pub mod client;
pub mod rate_limiter;
pub mod types;

pub use client::BangumiClient;
pub use rate_limiter::RateLimiter;
pub use types::*;

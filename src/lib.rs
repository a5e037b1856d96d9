//! Financial news sentiment scoring and its correlation with next-day stock returns.
//!
//! The core pipeline (score, categorize, aggregate, align, correlate) is synchronous and
//! lives in [`services`]. Data providers live in [`external`] and the fetch/monitor
//! layers wrap them with rate limiting and failure caching.

pub mod config;
pub mod errors;
pub mod external;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;

//! Utility modules: HTTP client setup, retry.

pub mod http;
pub mod retry;

//! Outbound HTTP utilities for service-to-service calls.

pub mod retry;

pub use retry::{RetryConfig, is_retryable_status, retry_http_call};

pub mod client;
pub mod error;
pub mod retry;

#[cfg(test)]
mod test_server;

pub use client::ApiClient;
pub use cyclegraph_api;
pub use error::{ApiError, Result};
pub use retry::RetryConfig;

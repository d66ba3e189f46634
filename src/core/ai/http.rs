use reqwest::Client;
use std::time::Duration;

use crate::infrastructure::error::{Result, ReviewError};

/// Build the HTTP client used for model calls. The caller owns it and hands
/// it to the provider; nothing here is process-global.
///
/// Without `timeout` a request waits for the runtime as long as it takes.
pub fn build_http_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(30));

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| ReviewError::config(format!("failed to create HTTP client: {e}")))
}

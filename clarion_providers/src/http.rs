use std::time::Duration;

use anyhow::Context;
use reqwest::Client;

const USER_AGENT: &str = concat!("clarion/", env!("CARGO_PKG_VERSION"));

/// Shared client settings for every outbound source call.
pub fn build_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to create HTTP client")
}

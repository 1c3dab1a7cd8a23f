// # HTTP Address Observer
//
// This crate provides the public-address observer for DNSSync.
//
// ## Architecture
//
// Performs one bounded-timeout GET against an external IP-echo
// endpoint (the kind that answers with the caller's address as a plain
// text body) and parses the result as an IPv4 address.
//
// Any failure (timeout, non-2xx status, unparseable body) surfaces
// as an `ObserveError`, which the Reconciler treats as fatal for the
// run: without a trusted public address there is nothing safe to
// converge toward.
//
// No retries and no caching here; the external timer that drives
// invocations is the retry mechanism.

use std::net::Ipv4Addr;
use std::time::Duration;

use dnssync_core::traits::{AddressObserver, ObserveError};

/// Default IP-echo endpoint, returns the caller's address as plain text
pub const DEFAULT_ECHO_URL: &str = "https://api.ipify.org";

/// Timeout for the echo request
const OBSERVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Public-address observer backed by an HTTP echo service
pub struct HttpAddressObserver {
    url: String,
    client: reqwest::Client,
}

impl HttpAddressObserver {
    /// Create an observer for the given echo endpoint
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::builder()
                .timeout(OBSERVE_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for HttpAddressObserver {
    fn default() -> Self {
        Self::new(DEFAULT_ECHO_URL)
    }
}

#[async_trait::async_trait]
impl AddressObserver for HttpAddressObserver {
    async fn observe(&self) -> Result<Ipv4Addr, ObserveError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ObserveError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ObserveError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ObserveError::Network(format!("failed to read response: {e}")))?;

        let trimmed = body.trim();
        let ip: Ipv4Addr = trimmed
            .parse()
            .map_err(|_| ObserveError::Malformed(truncate_for_diagnostics(trimmed)))?;

        tracing::debug!("observed public address {ip} via {}", self.url);
        Ok(ip)
    }
}

/// Bound the echoed body carried in error messages; a misconfigured URL
/// can return arbitrarily large HTML.
fn truncate_for_diagnostics(body: &str) -> String {
    const MAX: usize = 80;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &body[..end])
    }
}

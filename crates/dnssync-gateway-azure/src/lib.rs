// # Azure DNS Gateway
//
// This crate provides the authoritative-provider gateway for DNSSync,
// speaking the Azure DNS management REST API.
//
// ## Implementation notes
//
// - One GET and at most one PUT per reconciliation pass; no retry
//   logic, no backoff, no caching beyond the access token. Retry is
//   retry-by-recurrence, owned by the external timer.
// - `get_record` maps 404 to "record set absent" rather than an error;
//   the Reconciler folds an absent or unreadable record into the
//   comparison as an unknown provider value.
// - `upsert_record` replaces the whole record set with a single value.
//   Multi-value sets collapse to their first address; the remainder is
//   discarded on update, matching single-A-record semantics.
// - The bearer token never appears in logs.
//
// ## API Reference
//
// - Record sets: GET/PUT
//   `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Network/dnsZones/{zone}/A/{name}`
// - api-version: 2018-05-01

pub mod auth;

pub use auth::{ClientCertificateCredential, TokenCredential};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use dnssync_core::traits::{DnsGateway, GatewayError, RecordSet, UpsertOutcome};

/// Management API base URL
const ARM_BASE: &str = "https://management.azure.com";

/// Record-set API version
const API_VERSION: &str = "2018-05-01";

/// OAuth2 scope for the management API
const ARM_SCOPE: &str = "https://management.azure.com/.default";

/// Default HTTP timeout for API requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Azure DNS gateway
pub struct AzureDnsGateway {
    subscription_id: String,
    resource_group: String,
    credential: Arc<dyn TokenCredential>,
    client: reqwest::Client,
}

/// Wire format of an A record-set resource
#[derive(Debug, Serialize, Deserialize)]
struct RecordSetResource {
    properties: RecordSetProperties,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RecordSetProperties {
    #[serde(rename = "TTL", skip_serializing_if = "Option::is_none")]
    ttl: Option<u32>,

    #[serde(rename = "ARecords", default)]
    a_records: Vec<ARecordEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ARecordEntry {
    #[serde(rename = "ipv4Address")]
    ipv4_address: String,
}

impl RecordSetResource {
    fn single(ttl: u32, value: Ipv4Addr) -> Self {
        Self {
            properties: RecordSetProperties {
                ttl: Some(ttl),
                a_records: vec![ARecordEntry {
                    ipv4_address: value.to_string(),
                }],
            },
        }
    }

    fn into_record_set(self) -> Result<RecordSet, GatewayError> {
        let mut addresses = Vec::with_capacity(self.properties.a_records.len());
        for entry in &self.properties.a_records {
            let ip = entry.ipv4_address.parse::<Ipv4Addr>().map_err(|_| {
                GatewayError::Malformed(format!(
                    "record set carries a non-IPv4 value: {:?}",
                    entry.ipv4_address
                ))
            })?;
            addresses.push(ip);
        }
        Ok(RecordSet {
            ttl: self.properties.ttl,
            addresses,
        })
    }
}

impl AzureDnsGateway {
    /// Create a gateway for the given subscription and resource group
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        credential: Arc<dyn TokenCredential>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            credential,
            client: reqwest::Client::builder()
                .timeout(DEFAULT_HTTP_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    fn record_url(&self, zone: &str, name: &str) -> String {
        format!(
            "{ARM_BASE}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/dnsZones/{zone}/A/{name}?api-version={API_VERSION}",
            self.subscription_id, self.resource_group
        )
    }

    async fn api_error(status: reqwest::StatusCode, response: reqwest::Response) -> GatewayError {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error response".to_string());
        match status.as_u16() {
            401 | 403 => GatewayError::Auth(format!(
                "management API rejected the credential (status {status})"
            )),
            _ => GatewayError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl DnsGateway for AzureDnsGateway {
    async fn get_record(
        &self,
        zone: &str,
        name: &str,
    ) -> Result<Option<RecordSet>, GatewayError> {
        let token = self.credential.access_token(ARM_SCOPE).await?;
        let url = self.record_url(zone, name);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            tracing::debug!("record set {name}.{zone} does not exist");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Self::api_error(status, response).await);
        }

        let resource: RecordSetResource = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;
        resource.into_record_set().map(Some)
    }

    async fn upsert_record(
        &self,
        zone: &str,
        name: &str,
        ttl: u32,
        value: Ipv4Addr,
    ) -> Result<UpsertOutcome, GatewayError> {
        // Read first, so a missing or unreadable record set becomes a
        // create rather than a failure, and so the previous value is
        // known for the outcome.
        let existing = match self.get_record(zone, name).await {
            Ok(existing) => existing,
            Err(e) => {
                tracing::warn!("pre-update read of {name}.{zone} failed, treating as create: {e}");
                None
            }
        };

        let token = self.credential.access_token(ARM_SCOPE).await?;
        let url = self.record_url(zone, name);
        let body = RecordSetResource::single(ttl, value);

        tracing::info!("upserting record set {name}.{zone} -> {value} (ttl {ttl})");

        let response = self
            .client
            .put(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::api_error(status, response).await);
        }

        match existing {
            Some(set) => Ok(UpsertOutcome::Replaced {
                previous: set.first(),
            }),
            None => Ok(UpsertOutcome::Created),
        }
    }
}

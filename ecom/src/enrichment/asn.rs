use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;
use std::{net::IpAddr, time::Duration};
use url::Url;

use super::EnrichmentError;
use crate::model::AsnInfo;

/// IP to network operator lookup. Never fails outward: a failed lookup is an
/// empty [`AsnInfo`].
#[async_trait]
pub trait AsnLookup: Send + Sync {
    async fn lookup(&self, ip: &str) -> AsnInfo;
}

/// Splits an ipinfo style `org` (`AS17494 BDCOM Online Limited`) into number
/// and name. Anything not starting with `AS` yields an empty result.
pub fn parse_org(org: &str) -> AsnInfo {
    let org = org.trim();
    if !org.starts_with("AS") {
        return AsnInfo::default();
    }
    let (number, name) = org.split_once(' ').unwrap_or((org, ""));
    AsnInfo {
        asn: Some(number.to_string()),
        org: Some(name.trim().to_string()).filter(|n| !n.is_empty()),
    }
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    #[serde(default)]
    org: Option<String>,
}

/// ASN lookup against an ipinfo.io compatible `{base}/{ip}/json` endpoint.
pub struct IpInfoAsnLookup {
    client: reqwest::Client,
    base: Url,
}

impl IpInfoAsnLookup {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EnrichmentError> {
        let base = Url::parse(base_url).map_err(|source| EnrichmentError::Url {
            url: base_url.to_string(),
            source,
        })?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    async fn fetch(&self, ip: &str) -> Result<AsnInfo, EnrichmentError> {
        let ip: IpAddr = ip
            .trim()
            .parse()
            .map_err(|_| EnrichmentError::InvalidIp(ip.to_string()))?;
        let url = self
            .base
            .join(&format!("{ip}/json"))
            .map_err(|source| EnrichmentError::Url {
                url: format!("{}{ip}/json", self.base),
                source,
            })?;

        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(EnrichmentError::Status {
                endpoint: url.to_string(),
                status: response.status(),
            });
        }
        let body: IpInfoResponse = response.json().await?;
        Ok(body.org.as_deref().map(parse_org).unwrap_or_default())
    }
}

#[async_trait]
impl AsnLookup for IpInfoAsnLookup {
    async fn lookup(&self, ip: &str) -> AsnInfo {
        match self.fetch(ip).await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(ip, error = %e, "ASN lookup failed");
                counter!("enrichment_lookup_failures_total", "lookup" => "asn").increment(1);
                AsnInfo::default()
            }
        }
    }
}

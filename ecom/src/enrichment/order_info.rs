use async_trait::async_trait;
use common::config::EnrichmentConfig;
use processing::{enrichment::Enricher, model::GenericError};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::{EnrichmentError, is_target_country};
use crate::model::{AsnInfo, DeviceInfo, EnrichmentSignals, RawOrder};

/// Body returned by the order-info service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderInfoResponse {
    #[serde(default)]
    pub asn: Option<AsnInfo>,
    #[serde(default)]
    pub device_info: Option<DeviceInfo>,
    #[serde(default)]
    pub district_detected: Option<String>,
}

impl OrderInfoResponse {
    pub fn signals(&self, markers: &[String]) -> EnrichmentSignals {
        let asn = self.asn.clone().unwrap_or_default();
        let device = self.device_info.clone().unwrap_or_default();
        let is_target = asn
            .org
            .as_deref()
            .is_some_and(|org| is_target_country(org, markers));

        EnrichmentSignals {
            asn_number: asn.asn,
            asn_org: asn.org,
            browser_family: device.browser.clone(),
            os_family: device.os.clone(),
            device_type: Some(device.device_type().to_string()),
            district: self.district_detected.clone(),
            is_target_country: is_target,
        }
    }
}

/// Enriches orders through the remote order-info API.
///
/// The order is posted as JSON. The customer's user agent and IP travel as
/// the `User-Agent` and `X-Forwarded-For` headers and the shipping address as
/// the `address` query parameter, which is where the service reads them.
pub struct OrderInfoClient {
    client: reqwest::Client,
    endpoint: Url,
    markers: Vec<String>,
}

impl OrderInfoClient {
    pub fn new(config: &EnrichmentConfig) -> Result<Self, EnrichmentError> {
        let endpoint = Url::parse(&config.order_info_url).map_err(|source| EnrichmentError::Url {
            url: config.order_info_url.clone(),
            source,
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            markers: config.target_country_markers.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn fetch(&self, order: &RawOrder) -> Result<OrderInfoResponse, EnrichmentError> {
        let mut url = self.endpoint.clone();
        if let Some(address) = order.shipping_address.as_deref().filter(|a| !a.trim().is_empty()) {
            url.query_pairs_mut().append_pair("address", address);
        }

        let mut request = self.client.post(url).json(order);
        if let Some(user_agent) = order.user_agent.as_deref() {
            request = request.header(reqwest::header::USER_AGENT, user_agent);
        }
        if let Some(ip) = order.ip_address.as_deref() {
            request = request.header("X-Forwarded-For", ip);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(EnrichmentError::Status {
                endpoint: self.endpoint.to_string(),
                status: response.status(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Enricher<RawOrder> for OrderInfoClient {
    async fn enrich(&self, record: &RawOrder) -> Result<RawOrder, GenericError> {
        let response = self.fetch(record).await?;
        let signals = response.signals(&self.markers);
        tracing::debug!(?signals, "Order-info enrichment");
        Ok(record.merged(&signals))
    }
}

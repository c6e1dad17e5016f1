use async_trait::async_trait;
use processing::{enrichment::Enricher, model::GenericError};
use std::sync::Arc;

use super::{AsnLookup, UserAgentParser, is_target_country};
use crate::{
    district::DistrictClassifier,
    model::{EnrichmentSignals, RawOrder},
};

/// Enriches in process: ASN lookup, user agent parsing and district
/// classification of the shipping address. Never fails; missing inputs leave
/// their signals empty.
pub struct LocalEnricher {
    asn: Arc<dyn AsnLookup>,
    user_agents: Arc<dyn UserAgentParser>,
    classifier: DistrictClassifier,
    markers: Vec<String>,
}

impl LocalEnricher {
    pub fn new(
        asn: Arc<dyn AsnLookup>,
        user_agents: Arc<dyn UserAgentParser>,
        classifier: DistrictClassifier,
        markers: Vec<String>,
    ) -> Self {
        Self {
            asn,
            user_agents,
            classifier,
            markers,
        }
    }

    pub async fn signals(&self, order: &RawOrder) -> EnrichmentSignals {
        let mut signals = EnrichmentSignals::default();

        if let Some(ip) = order.ip_address.as_deref().filter(|ip| !ip.trim().is_empty()) {
            let asn = self.asn.lookup(ip).await;
            signals.is_target_country = asn
                .org
                .as_deref()
                .is_some_and(|org| is_target_country(org, &self.markers));
            signals.asn_number = asn.asn;
            signals.asn_org = asn.org;
        }

        if let Some(user_agent) = order.user_agent.as_deref().filter(|ua| !ua.trim().is_empty()) {
            let device = self.user_agents.parse(user_agent);
            signals.device_type = Some(device.device_type().to_string());
            signals.browser_family = device.browser;
            signals.os_family = device.os;
        }

        signals.district = order
            .shipping_address
            .as_deref()
            .and_then(|address| self.classifier.classify(address))
            .map(str::to_string);

        signals
    }
}

#[async_trait]
impl Enricher<RawOrder> for LocalEnricher {
    async fn enrich(&self, record: &RawOrder) -> Result<RawOrder, GenericError> {
        let signals = self.signals(record).await;
        tracing::debug!(?signals, "Local enrichment");
        Ok(record.merged(&signals))
    }
}

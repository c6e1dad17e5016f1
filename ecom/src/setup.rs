use common::config::Config;
use processing::{dataset::JsonDataset, engine::ScoringEngine, schema::SchemaError};
use std::{sync::Arc, time::Duration};

use crate::{
    district::DistrictClassifier,
    encoder::OrderEncoder,
    enrichment::{EnrichmentError, IpInfoAsnLookup, LocalEnricher, RegexUserAgentParser},
    gazetteer::bangladesh_districts,
    model::RawOrder,
};

pub type OrderEngine = ScoringEngine<RawOrder, OrderEncoder>;

pub fn district_classifier(config: &Config) -> DistrictClassifier {
    DistrictClassifier::new(bangladesh_districts(), config.district.threshold)
}

pub fn order_dataset(config: &Config) -> JsonDataset<RawOrder> {
    JsonDataset::new(&config.engine.dataset_path, &config.engine.dataset_key)
}

/// Engine over the configured catalog, training from the configured dataset
/// on first use.
pub fn order_engine(config: &Config) -> Result<OrderEngine, SchemaError> {
    let encoder = OrderEncoder::new(config.encoder.clone(), district_classifier(config))?;
    Ok(ScoringEngine::new(encoder, config.engine.clone())
        .with_default_source(Arc::new(order_dataset(config))))
}

pub fn local_enricher(config: &Config) -> Result<LocalEnricher, EnrichmentError> {
    let asn = IpInfoAsnLookup::new(
        &config.enrichment.asn_lookup_url,
        Duration::from_millis(config.enrichment.timeout_ms),
    )?;
    Ok(LocalEnricher::new(
        Arc::new(asn),
        Arc::new(RegexUserAgentParser),
        district_classifier(config),
        config.enrichment.target_country_markers.clone(),
    ))
}

#![allow(dead_code)]

use async_trait::async_trait;
use common::config::{EngineConfig, RangeConfig};
use mockall::mock;
use serde::Deserialize;
use std::time::Duration;

use processing::{
    dataset::DatasetSource,
    encoder::{FeatureEncoder, normalize},
    enrichment::Enricher,
    model::{FeatureValue, FeatureVector, GenericError, LabeledRecord},
    schema::{FeatureKind, SchemaDescriptor},
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToyOrder {
    pub amount: f64,
    pub risky: bool,
    /// Only encoded when present, so vectors differ in width
    pub tag: Option<String>,
}

impl ToyOrder {
    pub fn new(amount: f64, risky: bool) -> Self {
        Self {
            amount,
            risky,
            tag: None,
        }
    }

    pub fn tagged(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }
}

/// Encoder whose output width depends on the record.
pub struct SparseEncoder {
    descriptor: SchemaDescriptor,
}

impl SparseEncoder {
    pub fn new() -> Self {
        let mut descriptor = SchemaDescriptor::new(1);
        descriptor.push("amount", FeatureKind::Continuous).unwrap();
        descriptor.push("risky", FeatureKind::Indicator).unwrap();
        Self { descriptor }
    }
}

impl FeatureEncoder<ToyOrder> for SparseEncoder {
    fn descriptor(&self) -> &SchemaDescriptor {
        &self.descriptor
    }

    fn encode(&self, record: &ToyOrder) -> FeatureVector {
        let mut vector = FeatureVector::with_capacity(3);
        vector.push(
            "amount",
            FeatureValue::Scaled(normalize(record.amount, RangeConfig::new(0.0, 100.0))),
        );
        vector.push("risky", FeatureValue::Indicator(record.risky));
        if let Some(tag) = &record.tag {
            vector.push(format!("tag_{tag}"), FeatureValue::Indicator(true));
        }
        vector
    }
}

/// `rows` records: every third one is risky and cancelled, amounts above 40 are fraud.
pub fn dataset(rows: usize) -> Vec<LabeledRecord<ToyOrder>> {
    (0..rows)
        .map(|i| {
            let amount = (i % 80) as f64;
            let risky = i % 3 == 0;
            LabeledRecord::new(ToyOrder::new(amount, risky), risky, amount > 40.0)
        })
        .collect()
}

pub fn engine_config() -> EngineConfig {
    EngineConfig {
        enrichment_timeout_ms: 50,
        ..EngineConfig::default()
    }
}

mock! {
    pub Source {}
    impl DatasetSource<ToyOrder> for Source {
        fn load(&self) -> Result<Vec<LabeledRecord<ToyOrder>>, GenericError>;
        fn describe(&self) -> String;
    }
}

mock! {
    pub Enrich {}
    #[async_trait]
    impl Enricher<ToyOrder> for Enrich {
        async fn enrich(&self, record: &ToyOrder) -> Result<ToyOrder, GenericError>;
    }
}

/// Enricher that never answers within the engine's timeout.
pub struct StalledEnricher;

#[async_trait]
impl Enricher<ToyOrder> for StalledEnricher {
    async fn enrich(&self, record: &ToyOrder) -> Result<ToyOrder, GenericError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(record.clone().tagged("late"))
    }
}

#![allow(dead_code)]

use common::config::Config;
use ecom::{
    district::DistrictClassifier,
    encoder::OrderEncoder,
    gazetteer::bangladesh_districts,
    model::{LabeledOrder, RawOrder},
    setup::OrderEngine,
};
use processing::{dataset::JsonDataset, engine::ScoringEngine};
use std::path::PathBuf;

pub fn sample_dataset_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/sample_orders.json")
}

pub fn sample_dataset() -> JsonDataset<RawOrder> {
    JsonDataset::new(sample_dataset_path(), "orders")
}

pub fn classifier() -> DistrictClassifier {
    DistrictClassifier::new(bangladesh_districts(), 80.0)
}

pub fn encoder() -> OrderEncoder {
    OrderEncoder::new(Config::default().encoder, classifier()).unwrap()
}

pub fn engine() -> OrderEngine {
    ScoringEngine::new(encoder(), Config::default().engine)
}

/// Small labeled set where midnight orders without a known ASN are fraud and
/// orders above 15000 get cancelled.
pub fn labeled_orders(rows: usize) -> Vec<LabeledOrder> {
    (0..rows)
        .map(|i| {
            let value = (i * 397 % 20_000) as f64;
            let midnight = i % 4 == 0;
            let order = RawOrder {
                order_value: Some(value),
                order_hour: Some(if midnight { 0 } else { 14 }),
                browser: Some(["Chrome", "Firefox", "Safari"][i % 3].to_string()),
                district: Some(["Dhaka", "Sylhet"][i % 2].to_string()),
                ..RawOrder::default()
            };
            LabeledOrder::new(order, value > 15_000.0, midnight)
        })
        .collect()
}

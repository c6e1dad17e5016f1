mod test_utils;

use std::sync::Arc;

use processing::{
    dataset::JsonDataset,
    engine::{ScoringEngine, ScoringError},
    trainer::TrainingPipeline,
};
use test_utils::{MockSource, SparseEncoder, ToyOrder, dataset, engine_config};

fn engine() -> Arc<ScoringEngine<ToyOrder, SparseEncoder>> {
    Arc::new(ScoringEngine::new(SparseEncoder::new(), engine_config()))
}

#[test]
fn test_run_fits_and_returns_report() {
    let mut source = MockSource::new();
    source.expect_describe().return_const("mock".to_string());
    source.expect_load().times(1).returning(|| Ok(dataset(75)));

    let pipeline = TrainingPipeline::new(Arc::new(source), engine());
    let outcome = pipeline.run().unwrap();

    assert_eq!(outcome.records, 75);
    let report = outcome.report.expect("report");
    assert_eq!(report.test_size, 15);
    assert_eq!(report.train_size, 60);
    assert!(pipeline.engine().is_fitted());
}

#[test]
fn test_run_on_small_dataset_has_no_report() {
    let mut source = MockSource::new();
    source.expect_describe().return_const("mock".to_string());
    source.expect_load().returning(|| Ok(dataset(5)));

    let outcome = TrainingPipeline::new(Arc::new(source), engine()).run().unwrap();
    assert_eq!(outcome.records, 5);
    assert!(outcome.report.is_none());
}

#[test]
fn test_run_on_empty_dataset_fails() {
    let mut source = MockSource::new();
    source.expect_describe().return_const("mock".to_string());
    source.expect_load().returning(|| Ok(Vec::new()));

    let pipeline = TrainingPipeline::new(Arc::new(source), engine());
    assert!(matches!(pipeline.run(), Err(ScoringError::EmptyDataset)));
    assert!(!pipeline.engine().is_fitted());
}

#[test]
fn test_run_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.json");
    let rows: Vec<String> = (0..12)
        .map(|i| {
            format!(
                r#"{{"amount": {}, "risky": {}, "was_cancelled": {}, "is_fraud": false}}"#,
                i * 5,
                i % 2 == 0,
                i % 2 == 0
            )
        })
        .collect();
    std::fs::write(&path, format!(r#"{{"orders": [{}]}}"#, rows.join(","))).unwrap();

    let source = Arc::new(JsonDataset::<ToyOrder>::new(&path, "orders"));
    let pipeline = TrainingPipeline::new(source, engine());
    let outcome = pipeline.run().unwrap();
    assert_eq!(outcome.records, 12);
    assert!(pipeline.engine().predict(&ToyOrder::new(5.0, true)).is_ok());
}

#[test]
fn test_missing_file_surfaces_dataset_error() {
    let source = Arc::new(JsonDataset::<ToyOrder>::new("/nonexistent/orders.json", "orders"));
    let err = TrainingPipeline::new(source, engine()).run().unwrap_err();
    assert!(matches!(err, ScoringError::DatasetLoad { .. }));
}

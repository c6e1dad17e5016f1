use arc_swap::ArcSwapOption;
use common::config::EngineConfig;
use metrics::{counter, histogram};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use parking_lot::Mutex;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    dataset::DatasetSource,
    encoder::FeatureEncoder,
    enrichment::Enricher,
    evaluation::{ClassificationReport, EvaluationReport},
    logistic::{LogisticParams, LogisticRegression},
    model::{FeatureVector, GenericError, LabeledRecord, Prediction, RiskLabel},
    scaler::StandardScaler,
    schema::{FeatureSchema, SchemaError},
    split::train_test_split,
};

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("cannot fit on an empty dataset")]
    EmptyDataset,
    #[error("model is not fitted")]
    NotFitted,
    #[error("model is not fitted and no default dataset source is configured")]
    NoDefaultSource,
    #[error("failed to load dataset {origin}: {error}")]
    DatasetLoad {
        origin: String,
        #[source]
        error: GenericError,
    },
    #[error("feature schema divergence: {0}")]
    SchemaDivergence(#[from] SchemaError),
    #[error("training matrix has an inconsistent shape: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Everything a prediction reads, published as one unit.
#[derive(Debug)]
struct TrainedModel {
    schema: FeatureSchema,
    scaler: StandardScaler,
    cancellation: LogisticRegression,
    fraud: LogisticRegression,
}

/// Dual-classifier scoring engine.
///
/// Starts unfitted. `fit` builds a complete [`TrainedModel`] off to the side
/// and swaps it in atomically, so concurrent `predict` calls see either the
/// previous model or the new one. Fits are serialized by a lock.
///
/// The first `predict` on an unfitted engine trains against the default
/// dataset source through [`ScoringEngine::ensure_fitted`], so that call is
/// slow.
pub struct ScoringEngine<R, E> {
    encoder: E,
    config: EngineConfig,
    model: ArcSwapOption<TrainedModel>,
    fit_lock: Mutex<()>,
    default_source: Option<Arc<dyn DatasetSource<R>>>,
}

impl<R, E> ScoringEngine<R, E>
where
    E: FeatureEncoder<R>,
{
    pub fn new(encoder: E, config: EngineConfig) -> Self {
        info!(
            slots = encoder.descriptor().len(),
            schema_version = encoder.descriptor().version(),
            "Initializing new ScoringEngine"
        );
        Self {
            encoder,
            config,
            model: ArcSwapOption::empty(),
            fit_lock: Mutex::new(()),
            default_source: None,
        }
    }

    /// Dataset used to train implicitly when a prediction arrives first.
    pub fn with_default_source(mut self, source: Arc<dyn DatasetSource<R>>) -> Self {
        self.default_source = Some(source);
        self
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn is_fitted(&self) -> bool {
        self.model.load().is_some()
    }

    /// Columns of the published model, if any.
    pub fn schema(&self) -> Option<FeatureSchema> {
        self.model.load().as_ref().map(|model| model.schema.clone())
    }

    /// Trains both classifiers and publishes the result.
    ///
    /// Above `evaluation_min_records` rows a seeded train/test split is held
    /// out and the returned report describes it; otherwise every row trains
    /// and no report is produced.
    pub fn fit(
        &self,
        dataset: &[LabeledRecord<R>],
    ) -> Result<Option<EvaluationReport>, ScoringError> {
        let _guard = self.fit_lock.lock();
        self.fit_locked(dataset)
    }

    /// Trains against the default source unless a model is already published.
    pub fn ensure_fitted(&self) -> Result<(), ScoringError> {
        if self.is_fitted() {
            return Ok(());
        }

        let _guard = self.fit_lock.lock();
        // another caller may have trained while we waited
        if self.is_fitted() {
            return Ok(());
        }

        let source = self
            .default_source
            .as_ref()
            .ok_or(ScoringError::NoDefaultSource)?;
        info!(
            source = %source.describe(),
            "Model not fitted, training against default dataset before first prediction"
        );
        let dataset = source.load().map_err(|error| ScoringError::DatasetLoad {
            origin: source.describe(),
            error,
        })?;

        if let Some(report) = self.fit_locked(&dataset)? {
            info!("Implicit training evaluation:\n{report}");
        }
        Ok(())
    }

    pub fn predict(&self, record: &R) -> Result<Prediction, ScoringError> {
        self.ensure_fitted()?;
        let model = self.model.load_full().ok_or(ScoringError::NotFitted)?;

        let vector = self.encoder.encode(record);
        let row = model.schema.reindex(&vector).inspect_err(|e| {
            error!(error = %e, "Encoded order diverges from the frozen feature schema");
        })?;
        let row = model.scaler.transform_row(ArrayView1::from(&row));

        let cancellation_probability = model.cancellation.predict_proba(row.view());
        let fraud_probability = model.fraud.predict_proba(row.view());
        counter!("scoring_predictions_total").increment(1);

        let prediction = Prediction {
            cancellation_probability,
            fraud_probability,
            likely_cancelled: self.decide(cancellation_probability),
            likely_fraud: self.decide(fraud_probability),
        };
        debug!(?prediction, "Scored order");
        Ok(prediction)
    }

    /// Enriches the record through `enricher`, then scores it.
    ///
    /// Enrichment is bounded by `enrichment_timeout_ms`. A failed or timed out
    /// enrichment is logged and the unenriched record is scored instead.
    ///
    /// Scoring itself is synchronous. On an unfitted engine it loads the
    /// default dataset and trains on the calling thread, so async callers
    /// should run [`ScoringEngine::ensure_fitted`] up front, off the runtime
    /// (for instance through `tokio::task::spawn_blocking`).
    pub async fn predict_from_external_source<N>(
        &self,
        record: &R,
        enricher: &N,
    ) -> Result<Prediction, ScoringError>
    where
        N: Enricher<R> + ?Sized,
    {
        let timeout = Duration::from_millis(self.config.enrichment_timeout_ms);
        match tokio::time::timeout(timeout, enricher.enrich(record)).await {
            Ok(Ok(enriched)) => self.predict(&enriched),
            Ok(Err(e)) => {
                warn!(error = %e, "Enrichment failed, scoring unenriched order");
                counter!("scoring_enrichment_fallbacks_total", "reason" => "error").increment(1);
                self.predict(record)
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.config.enrichment_timeout_ms,
                    "Enrichment timed out, scoring unenriched order"
                );
                counter!("scoring_enrichment_fallbacks_total", "reason" => "timeout").increment(1);
                self.predict(record)
            }
        }
    }

    fn decide(&self, probability: f64) -> bool {
        probability > self.config.decision_threshold
    }

    fn params(&self) -> LogisticParams {
        LogisticParams {
            regularization: self.config.regularization,
            max_iterations: self.config.max_iterations,
            tolerance: self.config.tolerance,
        }
    }

    fn fit_locked(
        &self,
        dataset: &[LabeledRecord<R>],
    ) -> Result<Option<EvaluationReport>, ScoringError> {
        if dataset.is_empty() {
            return Err(ScoringError::EmptyDataset);
        }
        let started = Instant::now();
        let rows = dataset.len();

        let vectors: Vec<FeatureVector> = dataset
            .iter()
            .map(|row| self.encoder.encode(&row.record))
            .collect();
        let schema = FeatureSchema::freeze(&vectors);

        let mut flat = Vec::with_capacity(rows * schema.len());
        for vector in &vectors {
            flat.extend(schema.reindex(vector)?);
        }
        let raw = Array2::from_shape_vec((rows, schema.len()), flat)?;
        let scaler = StandardScaler::fit(raw.view());
        let x = scaler.transform(raw.view());

        let y_cancel = label_column(dataset, RiskLabel::Cancellation);
        let y_fraud = label_column(dataset, RiskLabel::Fraud);

        let split = (rows > self.config.evaluation_min_records)
            .then(|| train_test_split(rows, self.config.test_fraction, self.config.seed));
        let train_rows: Vec<usize> = match &split {
            Some(split) => split.train.clone(),
            None => (0..rows).collect(),
        };

        let x_train = x.select(Axis(0), &train_rows);
        let params = self.params();
        let cancellation = LogisticRegression::fit(
            x_train.view(),
            y_cancel.select(Axis(0), &train_rows).view(),
            params,
        );
        let fraud = LogisticRegression::fit(
            x_train.view(),
            y_fraud.select(Axis(0), &train_rows).view(),
            params,
        );

        let report = split.map(|split| {
            let x_test = x.select(Axis(0), &split.test);
            EvaluationReport {
                train_size: split.train.len(),
                test_size: split.test.len(),
                cancellation: self.evaluate(&cancellation, &x_test, &y_cancel, &split.test),
                fraud: self.evaluate(&fraud, &x_test, &y_fraud, &split.test),
            }
        });

        info!(
            rows,
            columns = schema.len(),
            fingerprint = %format!("{:08x}", schema.fingerprint()),
            evaluated = report.is_some(),
            cancellation_iterations = cancellation.iterations(),
            fraud_iterations = fraud.iterations(),
            "Publishing trained model"
        );
        self.model.store(Some(Arc::new(TrainedModel {
            schema,
            scaler,
            cancellation,
            fraud,
        })));
        histogram!("scoring_fit_seconds").record(started.elapsed().as_secs_f64());

        Ok(report)
    }

    fn evaluate(
        &self,
        classifier: &LogisticRegression,
        x_test: &Array2<f64>,
        labels: &Array1<f64>,
        test_rows: &[usize],
    ) -> ClassificationReport {
        let truth: Vec<bool> = test_rows.iter().map(|&i| labels[i] > 0.5).collect();
        let predicted: Vec<bool> = classifier
            .predict_proba_batch(x_test.view())
            .iter()
            .map(|&p| self.decide(p))
            .collect();
        ClassificationReport::from_predictions(&truth, &predicted)
    }
}

fn label_column<R>(dataset: &[LabeledRecord<R>], label: RiskLabel) -> Array1<f64> {
    dataset
        .iter()
        .map(|row| if row.label(label) { 1.0 } else { 0.0 })
        .collect()
}

use std::sync::Arc;

use crate::{
    dataset::DatasetSource,
    encoder::FeatureEncoder,
    engine::{ScoringEngine, ScoringError},
    evaluation::EvaluationReport,
};

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub records: usize,
    pub report: Option<EvaluationReport>,
}

/// Loads a labeled dataset and fits the engine with it.
pub struct TrainingPipeline<R, E> {
    source: Arc<dyn DatasetSource<R>>,
    engine: Arc<ScoringEngine<R, E>>,
}

impl<R, E> TrainingPipeline<R, E>
where
    E: FeatureEncoder<R>,
{
    pub fn new(source: Arc<dyn DatasetSource<R>>, engine: Arc<ScoringEngine<R, E>>) -> Self {
        tracing::info!("Initializing new TrainingPipeline");
        Self { source, engine }
    }

    pub fn engine(&self) -> &Arc<ScoringEngine<R, E>> {
        &self.engine
    }

    pub fn run(&self) -> Result<TrainingOutcome, ScoringError> {
        let origin = self.source.describe();
        tracing::debug!(source = %origin, "Loading training dataset");

        let dataset = self
            .source
            .load()
            .map_err(|error| ScoringError::DatasetLoad {
                origin: origin.clone(),
                error,
            })?;
        tracing::info!(records = dataset.len(), source = %origin, "Loaded training dataset");

        let report = self.engine.fit(&dataset)?;
        match &report {
            Some(report) => tracing::info!("Model evaluation results:\n{report}"),
            None => tracing::info!(
                records = dataset.len(),
                "Dataset too small for held-out evaluation, trained on all records"
            ),
        }

        Ok(TrainingOutcome {
            records: dataset.len(),
            report,
        })
    }
}

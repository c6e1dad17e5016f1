use async_trait::async_trait;

use crate::model::GenericError;

/// External collaborator that fills in signals a record cannot carry itself
/// (network operator, device details, resolved location).
///
/// Returns the record with the signals merged in. Errors are the caller's to
/// absorb; [`crate::engine::ScoringEngine::predict_from_external_source`] falls
/// back to the unenriched record.
#[async_trait]
pub trait Enricher<R>: Send + Sync {
    async fn enrich(&self, record: &R) -> Result<R, GenericError>;
}

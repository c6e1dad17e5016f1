use serde::de::DeserializeOwned;
use std::{fmt::Debug, fs, marker::PhantomData, path::PathBuf};
use thiserror::Error;

use crate::model::{GenericError, LabeledRecord};

/// Where labeled training records come from.
pub trait DatasetSource<R>: Send + Sync {
    fn load(&self) -> Result<Vec<LabeledRecord<R>>, GenericError>;
    fn describe(&self) -> String;
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("dataset {path} is not valid json: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("dataset {path} has no array under key '{key}'")]
    MissingKey { path: PathBuf, key: String },
}

/// JSON file holding the records as an array under one top-level key.
///
/// Entries that fail to deserialize are skipped with a warning; the rest of
/// the file still loads.
pub struct JsonDataset<R> {
    path: PathBuf,
    key: String,
    _record: PhantomData<fn() -> R>,
}

impl<R> JsonDataset<R> {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            _record: PhantomData,
        }
    }

    pub fn parse(&self, contents: &str) -> Result<Vec<LabeledRecord<R>>, DatasetError>
    where
        R: DeserializeOwned,
    {
        let mut document: serde_json::Value =
            serde_json::from_str(contents).map_err(|source| DatasetError::Json {
                path: self.path.clone(),
                source,
            })?;

        let entries = match document.get_mut(&self.key).map(serde_json::Value::take) {
            Some(serde_json::Value::Array(entries)) => entries,
            _ => {
                return Err(DatasetError::MissingKey {
                    path: self.path.clone(),
                    key: self.key.clone(),
                });
            }
        };

        let total = entries.len();
        let records: Vec<LabeledRecord<R>> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping malformed dataset record");
                    None
                }
            })
            .collect();

        tracing::debug!(
            path = %self.path.display(),
            loaded = records.len(),
            skipped = total - records.len(),
            "Parsed dataset"
        );
        Ok(records)
    }
}

impl<R> DatasetSource<R> for JsonDataset<R>
where
    R: DeserializeOwned + Send + Sync,
{
    fn load(&self) -> Result<Vec<LabeledRecord<R>>, GenericError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| DatasetError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(self.parse(&contents)?)
    }

    fn describe(&self) -> String {
        format!("{} [{}]", self.path.display(), self.key)
    }
}

impl<R> Debug for JsonDataset<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonDataset")
            .field("path", &self.path)
            .field("key", &self.key)
            .finish()
    }
}

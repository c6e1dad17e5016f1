use serde::{Deserialize, Serialize};
use std::error::Error;
use strum_macros::{Display as EnumDisplay, EnumIter};

pub type GenericError = Box<dyn Error + Send + Sync>;

/// The two independent risks every order is scored for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumDisplay, EnumIter)]
pub enum RiskLabel {
    #[strum(to_string = "cancellation")]
    Cancellation,
    #[strum(to_string = "fraud")]
    Fraud,
}

#[derive(Debug, Clone, Copy)]
pub enum FeatureValue {
    /// One-hot indicator, encoded as 0 or 1
    Indicator(bool),
    /// Continuous value already clipped and rescaled into [0, 1]
    Scaled(f64),
    /// Integer used as-is
    Raw(i64),
}

impl FeatureValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            FeatureValue::Indicator(true) => 1.0,
            FeatureValue::Indicator(false) => 0.0,
            FeatureValue::Scaled(v) => *v,
            FeatureValue::Raw(v) => *v as f64,
        }
    }
}

impl PartialEq for FeatureValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FeatureValue::Indicator(a), FeatureValue::Indicator(b)) => a == b,
            (FeatureValue::Scaled(a), FeatureValue::Scaled(b)) => a == b,
            (FeatureValue::Raw(a), FeatureValue::Raw(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub name: String,
    pub value: FeatureValue,
}

/// Ordered mapping from feature name to value, as produced by an encoder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    features: Vec<Feature>,
}

impl FeatureVector {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            features: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: FeatureValue) {
        self.features.push(Feature {
            name: name.into(),
            value,
        });
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.features
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.get(name).map(FeatureValue::as_f64)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl FromIterator<Feature> for FeatureVector {
    fn from_iter<T: IntoIterator<Item = Feature>>(iter: T) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

/// Training row: a record plus its two outcome labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledRecord<R> {
    #[serde(flatten)]
    pub record: R,
    #[serde(default, deserialize_with = "crate::lenient::flag")]
    pub was_cancelled: bool,
    #[serde(default, deserialize_with = "crate::lenient::flag")]
    pub is_fraud: bool,
}

impl<R> LabeledRecord<R> {
    pub fn new(record: R, was_cancelled: bool, is_fraud: bool) -> Self {
        Self {
            record,
            was_cancelled,
            is_fraud,
        }
    }

    pub fn label(&self, label: RiskLabel) -> bool {
        match label {
            RiskLabel::Cancellation => self.was_cancelled,
            RiskLabel::Fraud => self.is_fraud,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub cancellation_probability: f64,
    pub fraud_probability: f64,
    pub likely_cancelled: bool,
    pub likely_fraud: bool,
}

impl Prediction {
    pub fn probability(&self, label: RiskLabel) -> f64 {
        match label {
            RiskLabel::Cancellation => self.cancellation_probability,
            RiskLabel::Fraud => self.fraud_probability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_lookup_keeps_order() {
        let mut vector = FeatureVector::with_capacity(3);
        vector.push("order_value", FeatureValue::Scaled(0.25));
        vector.push("is_sunday", FeatureValue::Indicator(true));
        vector.push("day_of_month", FeatureValue::Raw(14));

        assert_eq!(vector.names().collect::<Vec<_>>(), ["order_value", "is_sunday", "day_of_month"]);
        assert_eq!(vector.value("is_sunday"), Some(1.0));
        assert_eq!(vector.value("day_of_month"), Some(14.0));
        assert_eq!(vector.value("missing"), None);
    }

    #[test]
    fn test_labeled_record_flattens_record_fields() {
        #[derive(Debug, Deserialize)]
        struct Row {
            amount: f64,
        }

        let row: LabeledRecord<Row> =
            serde_json::from_str(r#"{"amount": 12.5, "is_fraud": true}"#).unwrap();
        assert_eq!(row.record.amount, 12.5);
        assert!(!row.label(RiskLabel::Cancellation));
        assert!(row.label(RiskLabel::Fraud));
    }

    #[test]
    fn test_labels_accept_integers_and_null() {
        #[derive(Debug, Deserialize)]
        struct Row {}

        let row: LabeledRecord<Row> =
            serde_json::from_str(r#"{"was_cancelled": 1, "is_fraud": null}"#).unwrap();
        assert!(row.was_cancelled);
        assert!(!row.is_fraud);

        let row: LabeledRecord<Row> =
            serde_json::from_str(r#"{"was_cancelled": 0, "is_fraud": 1.0}"#).unwrap();
        assert!(!row.was_cancelled);
        assert!(row.is_fraud);
    }
}

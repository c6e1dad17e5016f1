use common::config::RangeConfig;

use crate::{model::FeatureVector, schema::SchemaDescriptor};

/// Turns a domain record into a flat numeric feature vector.
///
/// Implementations must emit every slot of [`FeatureEncoder::descriptor`] for
/// every input, whatever fields the record happens to carry.
pub trait FeatureEncoder<R>: Send + Sync {
    fn descriptor(&self) -> &SchemaDescriptor;
    fn encode(&self, record: &R) -> FeatureVector;
}

/// Clips `value` into the range and rescales it linearly to [0, 1].
///
/// Saturates outside the range, infinities included. NaN and a degenerate
/// range map to 0.
pub fn normalize(value: f64, range: RangeConfig) -> f64 {
    let span = range.max - range.min;
    if value.is_nan() || !span.is_finite() || span <= 0.0 {
        return 0.0;
    }
    (value.clamp(range.min, range.max) - range.min) / span
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGE: RangeConfig = RangeConfig::new(0.0, 20_000.0);

    #[test]
    fn test_normalize_endpoints() {
        assert_eq!(normalize(0.0, RANGE), 0.0);
        assert_eq!(normalize(20_000.0, RANGE), 1.0);
        assert_eq!(normalize(10_000.0, RANGE), 0.5);
    }

    #[test]
    fn test_normalize_saturates() {
        assert_eq!(normalize(25_000.0, RANGE), 1.0);
        assert_eq!(normalize(-3.0, RANGE), 0.0);
        assert_eq!(normalize(f64::NAN, RANGE), 0.0);
    }

    #[test]
    fn test_normalize_saturates_infinities() {
        assert_eq!(normalize(f64::INFINITY, RANGE), 1.0);
        assert_eq!(normalize(f64::NEG_INFINITY, RANGE), 0.0);
    }

    #[test]
    fn test_normalize_is_monotonic_and_bounded() {
        let offset = RangeConfig::new(100.0, 50_000.0);
        let mut previous = f64::NEG_INFINITY;
        for step in -10..=120 {
            let x = step as f64 * 500.0;
            let y = normalize(x, offset);
            assert!((0.0..=1.0).contains(&y));
            assert!(y >= previous);
            previous = y;
        }
    }

    #[test]
    fn test_degenerate_range() {
        assert_eq!(normalize(5.0, RangeConfig::new(3.0, 3.0)), 0.0);
    }
}

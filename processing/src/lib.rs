pub mod dataset;
pub mod encoder;
pub mod engine;
pub mod enrichment;
pub mod evaluation;
pub mod executable_utils;
pub mod lenient;
pub mod logistic;
pub mod model;
pub mod scaler;
pub mod schema;
pub mod split;
pub mod trainer;

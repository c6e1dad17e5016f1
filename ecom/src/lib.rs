pub mod converter;
pub mod district;
pub mod email;
pub mod encoder;
pub mod enrichment;
pub mod fuzzy;
pub mod gazetteer;
pub mod model;
pub mod phone;
pub mod setup;

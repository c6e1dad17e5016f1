pub mod config;
pub mod yaml_include;

/// Common utilities shared across the order risk scoring workspace
///
/// This crate provides the pieces every other crate leans on:
///
/// - The configuration model and its YAML loader
/// - `!include` composition of YAML config files
pub mod docs {
    //! Configuration is loaded once per executable and handed down by value.
}

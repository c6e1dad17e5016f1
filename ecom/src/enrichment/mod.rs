//! Collaborators that fill in what an order cannot tell about itself:
//! network operator, device and resolved district.

pub mod asn;
pub mod local;
pub mod order_info;
pub mod user_agent;

pub use asn::{AsnLookup, IpInfoAsnLookup};
pub use local::LocalEnricher;
pub use order_info::OrderInfoClient;
pub use user_agent::{RegexUserAgentParser, UserAgentParser};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("invalid endpoint url '{url}': {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("'{0}' is not an ip address")]
    InvalidIp(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{endpoint} answered with status {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },
}

/// True when the ASN organization names one of the target-country markers.
pub fn is_target_country(org: &str, markers: &[String]) -> bool {
    markers
        .iter()
        .filter(|m| !m.is_empty())
        .any(|marker| org.contains(marker.as_str()))
}

use serde::Serialize;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmailProvider {
    Gmail,
    Yahoo,
    Microsoft,
    Apple,
    Educational,
    Government,
    Corporate,
    Other,
}

/// Classifies an address by its domain.
pub fn email_provider(email: &str) -> EmailProvider {
    let domain = email
        .rsplit('@')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    match domain.as_str() {
        "gmail.com" => EmailProvider::Gmail,
        "yahoo.com" | "yahoo.com.bd" => EmailProvider::Yahoo,
        "outlook.com" | "hotmail.com" | "live.com" => EmailProvider::Microsoft,
        "icloud.com" | "me.com" => EmailProvider::Apple,
        d if d.ends_with(".edu") => EmailProvider::Educational,
        d if d.ends_with(".gov") => EmailProvider::Government,
        d if d.contains('.') => EmailProvider::Corporate,
        _ => EmailProvider::Other,
    }
}

use serde::Serialize;
use strum_macros::Display;

/// Mobile operator inferred from the number prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum SimOperator {
    Grameenphone,
    Banglalink,
    Teletalk,
    Airtel,
    Robi,
    Unknown,
}

/// Three-digit operator prefix (`017`, `019`...) of a Bangladesh number.
///
/// Formatting characters and a leading `88` country code are ignored. Numbers
/// whose local part does not start with `0` have no prefix.
pub fn phone_prefix(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let local = match digits.strip_prefix("88") {
        Some(rest) if rest.starts_with('0') => rest,
        _ => digits.as_str(),
    };
    if local.len() >= 3 && local.starts_with('0') {
        Some(local[..3].to_string())
    } else {
        None
    }
}

pub fn operator_for_prefix(prefix: &str) -> SimOperator {
    match prefix.get(..3) {
        Some("013" | "017") => SimOperator::Grameenphone,
        Some("014" | "019") => SimOperator::Banglalink,
        Some("015") => SimOperator::Teletalk,
        Some("016") => SimOperator::Airtel,
        Some("018") => SimOperator::Robi,
        _ => SimOperator::Unknown,
    }
}

pub fn operator_for_phone(phone: &str) -> SimOperator {
    phone_prefix(phone)
        .map(|prefix| operator_for_prefix(&prefix))
        .unwrap_or(SimOperator::Unknown)
}

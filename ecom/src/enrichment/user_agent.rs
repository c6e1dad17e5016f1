use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::DeviceInfo;

pub trait UserAgentParser: Send + Sync {
    fn parse(&self, user_agent: &str) -> DeviceInfo;
}

struct Family {
    name: &'static str,
    pattern: Regex,
}

fn families(table: &[(&'static str, &str)]) -> Vec<Family> {
    table
        .iter()
        .filter_map(|&(name, pattern)| match Regex::new(pattern) {
            Ok(pattern) => Some(Family { name, pattern }),
            Err(e) => {
                tracing::error!(family = name, error = %e, "Invalid user agent pattern");
                None
            }
        })
        .collect()
}

// first match wins, so the more specific tokens come first
static BROWSERS: Lazy<Vec<Family>> = Lazy::new(|| {
    families(&[
        ("Edge", r"Edg(e|A|iOS)?/"),
        ("Opera", r"OPR/|Opera|OPiOS/"),
        ("Firefox", r"Firefox/|FxiOS/"),
        ("Chrome", r"Chrome/|CriOS/"),
        ("Safari", r"Version/[\d.]+.*Safari/"),
    ])
});

static OPERATING_SYSTEMS: Lazy<Vec<Family>> = Lazy::new(|| {
    families(&[
        ("Windows", r"Windows NT|Windows Phone"),
        ("iOS", r"iPhone|iPad|iPod"),
        ("Android", r"Android"),
        ("Mac OS X", r"Mac OS X|Macintosh"),
        ("Linux", r"Linux|X11"),
    ])
});

static TABLET: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"iPad|Tablet|PlayBook|Kindle").ok());
static MOBILE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"Mobi|iPhone|iPod|Windows Phone").ok());
static BOT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)bot|crawler|spider").ok());

fn first_family(table: &[Family], user_agent: &str) -> Option<String> {
    table
        .iter()
        .find(|f| f.pattern.is_match(user_agent))
        .map(|f| f.name.to_string())
}

fn hits(pattern: &Option<Regex>, user_agent: &str) -> bool {
    pattern.as_ref().is_some_and(|p| p.is_match(user_agent))
}

/// Regex based parser for the browser and OS families the encoder knows.
#[derive(Debug, Default, Clone)]
pub struct RegexUserAgentParser;

impl UserAgentParser for RegexUserAgentParser {
    fn parse(&self, user_agent: &str) -> DeviceInfo {
        let user_agent = user_agent.trim();
        if user_agent.is_empty() {
            return DeviceInfo::default();
        }

        let browser = first_family(&BROWSERS, user_agent);
        let os = first_family(&OPERATING_SYSTEMS, user_agent);
        // Android without a Mobile token is a tablet
        let is_tablet = hits(&TABLET, user_agent)
            || (os.as_deref() == Some("Android") && !hits(&MOBILE, user_agent));
        let is_mobile = !is_tablet && hits(&MOBILE, user_agent);
        let is_pc = !is_tablet
            && !is_mobile
            && !hits(&BOT, user_agent)
            && matches!(os.as_deref(), Some("Windows" | "Mac OS X" | "Linux"));

        let device = if user_agent.contains("iPhone") {
            "iPhone"
        } else if user_agent.contains("iPad") {
            "iPad"
        } else if is_mobile {
            "Generic Smartphone"
        } else if is_tablet {
            "Generic Tablet"
        } else {
            "Other"
        };

        DeviceInfo {
            browser,
            os,
            is_mobile,
            is_tablet,
            is_pc,
            device: Some(device.to_string()),
        }
    }
}

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Weekday};
use common::config::EncoderConfig;
use processing::{
    encoder::{FeatureEncoder, normalize},
    model::{FeatureValue, FeatureVector},
    schema::{FeatureKind, SchemaDescriptor, SchemaError},
};

use crate::{district::DistrictClassifier, model::RawOrder, phone::phone_prefix};

/// Bumped whenever the slot list changes shape.
pub const SCHEMA_VERSION: u32 = 1;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Feature-name fragment for a catalog value: `Mac OS X` -> `mac_os_x`,
/// `Cox's Bazar` -> `coxs_bazar`.
pub fn slug(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .split_whitespace()
        .map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Where a slot takes its value from. Parallel to the descriptor's slots.
#[derive(Debug, Clone)]
enum SlotSource {
    OrderValue,
    CartItemCount,
    MerchantReturnRate,
    MerchantOrderCount,
    ProductCategory(String),
    Weekday(Weekday),
    DayOfMonth,
    MidnightHour,
    PhonePrefix(String),
    AsnKnown,
    TargetCountry,
    Browser(String),
    Os(String),
    Device(String),
    District(String),
    CouponUsed,
}

/// Order fields resolved once per encode. Text values are lowercased.
#[derive(Debug, Default)]
struct Resolved {
    order_value: f64,
    cart_item_count: f64,
    merchant_return_rate: f64,
    merchant_order_count: f64,
    category: Option<String>,
    weekday: Option<Weekday>,
    day_of_month: Option<u32>,
    hour: Option<u32>,
    phone_prefix: Option<String>,
    asn_known: bool,
    target_country: bool,
    browser: Option<String>,
    os: Option<String>,
    device: Option<String>,
    district: Option<String>,
    coupon_used: bool,
}

fn lowered(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

fn is_match(value: &Option<String>, catalog_entry: &str) -> bool {
    value.as_deref() == Some(catalog_entry)
}

/// Reads RFC 3339, or a naive date-time taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

/// Encodes [`RawOrder`]s against a fixed catalog.
///
/// The slot list is built once from the encoder config and the shared
/// gazetteer. Every encode walks it in order, so every order yields the same
/// names in the same order whatever fields it carries.
pub struct OrderEncoder {
    config: EncoderConfig,
    classifier: DistrictClassifier,
    descriptor: SchemaDescriptor,
    sources: Vec<SlotSource>,
}

impl OrderEncoder {
    pub fn new(config: EncoderConfig, classifier: DistrictClassifier) -> Result<Self, SchemaError> {
        let mut descriptor = SchemaDescriptor::new(SCHEMA_VERSION);
        let mut sources = Vec::new();
        let mut slot = |name: String, kind: FeatureKind, source: SlotSource| {
            descriptor.push(name, kind)?;
            sources.push(source);
            Ok::<(), SchemaError>(())
        };

        slot("order_value".into(), FeatureKind::Continuous, SlotSource::OrderValue)?;
        slot("cart_item_count".into(), FeatureKind::Continuous, SlotSource::CartItemCount)?;
        slot("merchant_return_rate".into(), FeatureKind::Continuous, SlotSource::MerchantReturnRate)?;
        slot("merchant_order_count".into(), FeatureKind::Continuous, SlotSource::MerchantOrderCount)?;

        for category in &config.product_categories {
            slot(
                format!("is_product_{}", slug(category)),
                FeatureKind::Indicator,
                SlotSource::ProductCategory(category.trim().to_lowercase()),
            )?;
        }
        for day in WEEKDAYS {
            slot(format!("is_{}", weekday_name(day)), FeatureKind::Indicator, SlotSource::Weekday(day))?;
        }
        slot("day_of_month".into(), FeatureKind::Raw, SlotSource::DayOfMonth)?;
        slot("is_h00".into(), FeatureKind::Indicator, SlotSource::MidnightHour)?;
        for prefix in &config.phone_prefixes {
            slot(
                format!("is_{}", slug(prefix)),
                FeatureKind::Indicator,
                SlotSource::PhonePrefix(prefix.trim().to_string()),
            )?;
        }
        slot("asn_known".into(), FeatureKind::Indicator, SlotSource::AsnKnown)?;
        slot("asn_bd".into(), FeatureKind::Indicator, SlotSource::TargetCountry)?;
        for browser in &config.browsers {
            slot(
                format!("is_browser_{}", slug(browser)),
                FeatureKind::Indicator,
                SlotSource::Browser(browser.trim().to_lowercase()),
            )?;
        }
        for os in &config.operating_systems {
            slot(
                format!("is_os_{}", slug(os)),
                FeatureKind::Indicator,
                SlotSource::Os(os.trim().to_lowercase()),
            )?;
        }
        for device in &config.devices {
            slot(
                format!("is_device_{}", slug(device)),
                FeatureKind::Indicator,
                SlotSource::Device(device.trim().to_lowercase()),
            )?;
        }
        for district in classifier.gazetteer().canonical_names() {
            slot(
                format!("is_district_{}", slug(district)),
                FeatureKind::Indicator,
                SlotSource::District(district.to_lowercase()),
            )?;
        }
        slot("is_coupon_used".into(), FeatureKind::Indicator, SlotSource::CouponUsed)?;

        tracing::info!(
            slots = descriptor.len(),
            version = SCHEMA_VERSION,
            "Built order feature catalog"
        );

        Ok(Self {
            config,
            classifier,
            descriptor,
            sources,
        })
    }

    pub fn classifier(&self) -> &DistrictClassifier {
        &self.classifier
    }

    /// The order's own district if it names one, else the district classified
    /// from the shipping address.
    pub fn resolve_district(&self, order: &RawOrder) -> Option<String> {
        if let Some(district) = order.district.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            return Some(district.to_string());
        }
        order
            .shipping_address
            .as_deref()
            .and_then(|address| self.classifier.classify(address))
            .map(str::to_string)
    }

    fn resolve(&self, order: &RawOrder) -> Resolved {
        let timestamp = order.created_at.as_deref().and_then(|raw| {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                tracing::debug!(created_at = raw, "Unparseable order timestamp, time features left neutral");
            }
            parsed
        });

        let weekday = order
            .order_day
            .as_deref()
            .and_then(|day| day.trim().parse::<Weekday>().ok())
            .or_else(|| timestamp.map(|t| t.weekday()));

        // an explicit prefix may be longer than three digits
        let prefix = order
            .customer_phone_prefix
            .as_deref()
            .and_then(phone_prefix)
            .or_else(|| order.customer_phone.as_deref().and_then(phone_prefix));

        let asn_known = order
            .asn
            .as_ref()
            .and_then(|asn| asn.asn.as_deref())
            .is_some_and(|asn| asn.trim().starts_with("AS"));

        Resolved {
            order_value: order.order_value.unwrap_or(0.0),
            cart_item_count: order.effective_cart_item_count(),
            merchant_return_rate: order.merchant_return_rate.unwrap_or(0.0),
            merchant_order_count: order.merchant_order_count.unwrap_or(0.0),
            category: lowered(order.effective_product_category()),
            weekday,
            day_of_month: order.day_of_month.or_else(|| timestamp.map(|t| t.day())),
            hour: order.order_hour.or_else(|| timestamp.map(|t| t.hour())),
            phone_prefix: prefix,
            asn_known,
            target_country: order.is_bangladesh,
            browser: lowered(order.browser.as_deref()),
            os: lowered(order.os.as_deref()),
            device: lowered(order.device_type.as_deref()),
            district: lowered(self.resolve_district(order).as_deref()),
            coupon_used: order.coupon_used,
        }
    }

    fn value(&self, source: &SlotSource, order: &Resolved) -> FeatureValue {
        let ranges = &self.config;
        match source {
            SlotSource::OrderValue => FeatureValue::Scaled(normalize(order.order_value, ranges.order_value)),
            SlotSource::CartItemCount => {
                FeatureValue::Scaled(normalize(order.cart_item_count, ranges.cart_item_count))
            }
            SlotSource::MerchantReturnRate => {
                FeatureValue::Scaled(normalize(order.merchant_return_rate, ranges.merchant_return_rate))
            }
            SlotSource::MerchantOrderCount => {
                FeatureValue::Scaled(normalize(order.merchant_order_count, ranges.merchant_order_count))
            }
            SlotSource::ProductCategory(category) => FeatureValue::Indicator(is_match(&order.category, category)),
            SlotSource::Weekday(day) => FeatureValue::Indicator(order.weekday == Some(*day)),
            SlotSource::DayOfMonth => FeatureValue::Raw(order.day_of_month.map_or(0, i64::from)),
            SlotSource::MidnightHour => FeatureValue::Indicator(order.hour == Some(0)),
            SlotSource::PhonePrefix(prefix) => FeatureValue::Indicator(is_match(&order.phone_prefix, prefix)),
            SlotSource::AsnKnown => FeatureValue::Indicator(order.asn_known),
            SlotSource::TargetCountry => FeatureValue::Indicator(order.target_country),
            SlotSource::Browser(browser) => FeatureValue::Indicator(is_match(&order.browser, browser)),
            SlotSource::Os(os) => FeatureValue::Indicator(is_match(&order.os, os)),
            SlotSource::Device(device) => FeatureValue::Indicator(is_match(&order.device, device)),
            SlotSource::District(district) => FeatureValue::Indicator(is_match(&order.district, district)),
            SlotSource::CouponUsed => FeatureValue::Indicator(order.coupon_used),
        }
    }
}

impl FeatureEncoder<RawOrder> for OrderEncoder {
    fn descriptor(&self) -> &SchemaDescriptor {
        &self.descriptor
    }

    fn encode(&self, record: &RawOrder) -> FeatureVector {
        let resolved = self.resolve(record);
        let mut vector = FeatureVector::with_capacity(self.descriptor.len());
        for (slot, source) in self.descriptor.slots().iter().zip(&self.sources) {
            vector.push(slot.name.clone(), self.value(source, &resolved));
        }
        vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gazetteer::bangladesh_districts;

    fn encoder() -> OrderEncoder {
        OrderEncoder::new(
            EncoderConfig::default(),
            DistrictClassifier::new(bangladesh_districts(), 80.0),
        )
        .unwrap()
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Mac OS X"), "mac_os_x");
        assert_eq!(slug("Cox's Bazar"), "coxs_bazar");
        assert_eq!(slug(" Chapai Nawabganj "), "chapai_nawabganj");
        assert_eq!(slug("013"), "013");
    }

    #[test]
    fn test_catalog_layout() {
        let encoder = encoder();
        let names: Vec<&str> = encoder.descriptor().names().collect();
        assert_eq!(names.len(), 4 + 4 + 7 + 1 + 1 + 6 + 2 + 5 + 4 + 3 + 64 + 1);
        assert_eq!(&names[..4], ["order_value", "cart_item_count", "merchant_return_rate", "merchant_order_count"]);
        assert_eq!(names[8], "is_sunday");
        assert_eq!(names[15], "day_of_month");
        assert_eq!(names[16], "is_h00");
        assert!(names.contains(&"is_os_mac_os_x"));
        assert!(names.contains(&"is_district_coxs_bazar"));
        assert_eq!(*names.last().unwrap(), "is_coupon_used");
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = NaiveDateTime::parse_from_str("2024-03-10 00:15:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(parse_timestamp("2024-03-10T00:15:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-10T06:15:00+06:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-10T00:15:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-10 00:15:00.250").map(|t| t.minute()), Some(15));
        assert_eq!(parse_timestamp("last tuesday"), None);
    }

    #[test]
    fn test_time_features_from_timestamp() {
        // 2024-03-10 was a Sunday
        let order = RawOrder {
            created_at: Some("2024-03-10T00:15:00Z".into()),
            ..RawOrder::default()
        };
        let v = encoder().encode(&order);
        assert_eq!(v.value("is_sunday"), Some(1.0));
        assert_eq!(v.value("is_monday"), Some(0.0));
        assert_eq!(v.value("day_of_month"), Some(10.0));
        assert_eq!(v.value("is_h00"), Some(1.0));
    }

    #[test]
    fn test_explicit_time_fields_win() {
        let order = RawOrder {
            created_at: Some("2024-03-10T00:15:00Z".into()),
            order_day: Some("Friday".into()),
            order_hour: Some(14),
            ..RawOrder::default()
        };
        let v = encoder().encode(&order);
        assert_eq!(v.value("is_friday"), Some(1.0));
        assert_eq!(v.value("is_sunday"), Some(0.0));
        assert_eq!(v.value("is_h00"), Some(0.0));
        assert_eq!(v.value("day_of_month"), Some(10.0));
    }

    #[test]
    fn test_bad_inputs_are_neutral() {
        let order = RawOrder {
            created_at: Some("not a date".into()),
            customer_phone: Some("call me".into()),
            browser: Some("Netscape".into()),
            ..RawOrder::default()
        };
        let v = encoder().encode(&order);
        assert_eq!(v.len(), encoder().descriptor().len());
        assert_eq!(v.value("is_h00"), Some(0.0));
        assert_eq!(v.value("day_of_month"), Some(0.0));
        assert!(v.iter().filter(|f| f.name.starts_with("is_")).all(|f| f.value.as_f64() == 0.0));
    }

    #[test]
    fn test_categorical_matching_is_case_insensitive() {
        let order = RawOrder {
            browser: Some("CHROME".into()),
            os: Some("mac os x".into()),
            device_type: Some("Phone".into()),
            customer_phone: Some("+880 1712-345678".into()),
            district: Some("dhaka".into()),
            asn: Some(crate::model::AsnInfo {
                asn: Some("AS17494".into()),
                org: None,
            }),
            is_bangladesh: true,
            coupon_used: true,
            ..RawOrder::default()
        };
        let v = encoder().encode(&order);
        for name in [
            "is_browser_chrome",
            "is_os_mac_os_x",
            "is_device_phone",
            "is_017",
            "is_district_dhaka",
            "asn_known",
            "asn_bd",
            "is_coupon_used",
        ] {
            assert_eq!(v.value(name), Some(1.0), "{name}");
        }
    }

    #[test]
    fn test_explicit_prefix_wins_over_phone() {
        let order = RawOrder {
            customer_phone: Some("01712345678".into()),
            customer_phone_prefix: Some("01912".into()),
            ..RawOrder::default()
        };
        let v = encoder().encode(&order);
        assert_eq!(v.value("is_019"), Some(1.0));
        assert_eq!(v.value("is_017"), Some(0.0));
    }

    #[test]
    fn test_district_falls_back_to_address() {
        let encoder = encoder();
        let order = RawOrder {
            shipping_address: Some("House 7, Road 3, Sylhet".into()),
            ..RawOrder::default()
        };
        assert_eq!(encoder.resolve_district(&order).as_deref(), Some("Sylhet"));
        assert_eq!(encoder.encode(&order).value("is_district_sylhet"), Some(1.0));

        let bengali = RawOrder {
            shipping_address: Some("কক্সবাজার".into()),
            ..RawOrder::default()
        };
        assert_eq!(encoder.encode(&bengali).value("is_district_coxs_bazar"), Some(1.0));
    }

    #[test]
    fn test_continuous_features_use_configured_ranges() {
        let order = RawOrder {
            order_value: Some(5_000.0),
            cart: vec![Default::default(); 30],
            merchant_return_rate: Some(0.25),
            merchant_order_count: Some(-3.0),
            ..RawOrder::default()
        };
        let v = encoder().encode(&order);
        assert_eq!(v.value("order_value"), Some(0.25));
        assert_eq!(v.value("cart_item_count"), Some(1.0));
        assert_eq!(v.value("merchant_return_rate"), Some(0.25));
        assert_eq!(v.value("merchant_order_count"), Some(0.0));
    }
}

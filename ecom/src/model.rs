use processing::{lenient, model::LabeledRecord};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AsnInfo {
    /// e.g. `AS17494`; bare numbers are normalized to that form
    #[serde(default, deserialize_with = "lenient_asn")]
    pub asn: Option<String>,
    #[serde(default)]
    pub org: Option<String>,
}

impl AsnInfo {
    pub fn is_empty(&self) -> bool {
        self.asn.as_deref().is_none_or(str::is_empty) && self.org.as_deref().is_none_or(str::is_empty)
    }
}

fn lenient_asn<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(format!("AS{n}")),
        _ => None,
    })
}

/// Parsed user agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub browser: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_mobile: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_tablet: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_pc: bool,
    #[serde(default)]
    pub device: Option<String>,
}

impl DeviceInfo {
    /// Encoder device bucket: mobile wins over tablet, tablet over pc.
    pub fn device_type(&self) -> &'static str {
        if self.is_mobile {
            "phone"
        } else if self.is_tablet {
            "tablet"
        } else if self.is_pc {
            "desktop"
        } else {
            "unknown"
        }
    }
}

/// Signals gathered outside the order itself. Lookups that fail leave their
/// fields empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentSignals {
    pub asn_number: Option<String>,
    pub asn_org: Option<String>,
    pub browser_family: Option<String>,
    pub os_family: Option<String>,
    pub device_type: Option<String>,
    pub district: Option<String>,
    pub is_target_country: bool,
}

/// Order as it arrives from the shop or a historical dataset. Every field is
/// optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawOrder {
    #[serde(alias = "order_total", skip_serializing_if = "Option::is_none")]
    pub order_value: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cart: Vec<CartItem>,
    #[serde(deserialize_with = "lenient::opt_count", skip_serializing_if = "Option::is_none")]
    pub cart_item_count: Option<u32>,
    #[serde(alias = "product_type", skip_serializing_if = "Option::is_none")]
    pub product_category: Option<String>,

    #[serde(alias = "createAt", alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(alias = "day_of_week", skip_serializing_if = "Option::is_none")]
    pub order_day: Option<String>,
    #[serde(
        alias = "hour_of_day",
        deserialize_with = "lenient::opt_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub order_hour: Option<u32>,
    #[serde(deserialize_with = "lenient::opt_count", skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,

    #[serde(deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(
        alias = "phone_number_prefix",
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_phone_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(alias = "address", skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,

    #[serde(alias = "is_coupon_used", deserialize_with = "lenient::flag")]
    pub coupon_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_return_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_order_count: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub asn: Option<AsnInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(deserialize_with = "lenient::flag")]
    pub is_bangladesh: bool,
}

impl RawOrder {
    /// Copy of the order with the enrichment signals laid over it.
    ///
    /// A signal replaces the order's own value only when it carries one; the
    /// target-country flag is or-ed.
    pub fn merged(&self, signals: &EnrichmentSignals) -> RawOrder {
        let mut order = self.clone();

        if signals.asn_number.is_some() || signals.asn_org.is_some() {
            let current = order.asn.take().unwrap_or_default();
            order.asn = Some(AsnInfo {
                asn: non_empty(&signals.asn_number).or(current.asn),
                org: non_empty(&signals.asn_org).or(current.org),
            });
        }
        overlay(&mut order.browser, &signals.browser_family);
        overlay(&mut order.os, &signals.os_family);
        overlay(&mut order.device_type, &signals.device_type);
        overlay(&mut order.district, &signals.district);
        order.is_bangladesh |= signals.is_target_country;

        order
    }

    /// Explicit count wins over the number of cart lines.
    pub fn effective_cart_item_count(&self) -> f64 {
        match self.cart_item_count {
            Some(count) => count as f64,
            None => self.cart.len() as f64,
        }
    }

    /// Explicit category, else the first cart line's.
    pub fn effective_product_category(&self) -> Option<&str> {
        self.product_category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .or_else(|| self.cart.iter().find_map(|item| item.category.as_deref()))
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

fn overlay(target: &mut Option<String>, signal: &Option<String>) {
    if let Some(value) = non_empty(signal) {
        *target = Some(value);
    }
}

pub type LabeledOrder = LabeledRecord<RawOrder>;

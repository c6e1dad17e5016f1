//! Conversion of shop-platform order exports into dataset rows.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    email::{EmailProvider, email_provider},
    model::{CartItem, RawOrder},
    phone::{SimOperator, operator_for_prefix, phone_prefix},
};

#[derive(Debug, Error)]
pub enum ConverterError {
    #[error("export is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("export has no 'data' array")]
    MissingData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Amount {
    total: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProductType {
    #[serde(rename = "type")]
    kind: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Product {
    product: ProductType,
    price: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CartLine {
    product: Product,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Customer {
    phone: Option<String>,
    email: Option<String>,
}

/// One order as the shop platform exports it.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlatformOrder {
    amount: Amount,
    cart: Vec<CartLine>,
    create_at: Option<String>,
    customer: Customer,
    customer_ip_address: Option<String>,
    customer_user_agent: Option<String>,
    shipping_address: Option<serde_json::Value>,
}

/// Dataset row produced from an export, with the customer annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertedOrder {
    #[serde(flatten)]
    pub order: RawOrder,
    pub sim_operator: SimOperator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_provider: Option<EmailProvider>,
}

/// Flattens an address that may be a plain string or a structured object.
fn address_text(value: &serde_json::Value) -> Option<String> {
    fn collect(value: &serde_json::Value, parts: &mut Vec<String>) {
        match value {
            serde_json::Value::String(s) if !s.trim().is_empty() => parts.push(s.trim().to_string()),
            serde_json::Value::Array(items) => items.iter().for_each(|v| collect(v, parts)),
            serde_json::Value::Object(map) => map.values().for_each(|v| collect(v, parts)),
            _ => {}
        }
    }

    let mut parts = Vec::new();
    collect(value, &mut parts);
    (!parts.is_empty()).then(|| parts.join(", "))
}

impl PlatformOrder {
    pub fn convert(&self) -> ConvertedOrder {
        let cart: Vec<CartItem> = self
            .cart
            .iter()
            .map(|line| CartItem {
                category: line.product.product.kind.clone(),
                name: line.product.product.name.clone(),
                price: line.product.price,
            })
            .collect();

        let prefix = self.customer.phone.as_deref().and_then(phone_prefix);
        let sim_operator = prefix
            .as_deref()
            .map(operator_for_prefix)
            .unwrap_or(SimOperator::Unknown);

        let order = RawOrder {
            order_value: self.amount.total,
            cart_item_count: Some(cart.len() as u32),
            product_category: cart.first().and_then(|item| item.category.clone()),
            cart,
            created_at: self.create_at.clone(),
            customer_phone: self.customer.phone.clone(),
            customer_phone_prefix: prefix,
            customer_email: self.customer.email.clone(),
            user_agent: self.customer_user_agent.clone(),
            ip_address: self.customer_ip_address.clone(),
            shipping_address: self.shipping_address.as_ref().and_then(address_text),
            ..RawOrder::default()
        };

        ConvertedOrder {
            sim_operator,
            email_provider: order.customer_email.as_deref().map(email_provider),
            order,
        }
    }
}

/// Converts every order of an export; entries that cannot be read are
/// skipped with a warning.
pub fn convert_export(contents: &str) -> Result<Vec<ConvertedOrder>, ConverterError> {
    let mut document: serde_json::Value = serde_json::from_str(contents)?;
    let Some(serde_json::Value::Array(entries)) = document.get_mut("data").map(serde_json::Value::take) else {
        return Err(ConverterError::MissingData);
    };

    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<PlatformOrder>(entry) {
            Ok(order) => Some(order.convert()),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping unreadable export entry");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"{
        "data": [
            {
                "amount": {"total": 2450},
                "cart": [
                    {"product": {"product": {"type": "Cosmetics", "name": "Lipstick"}, "price": 1200}},
                    {"product": {"product": {"type": "Clothing"}}}
                ],
                "createAt": "2024-05-03T18:42:10.000Z",
                "customer": {"phone": "+8801512345678", "email": "buyer@Gmail.com"},
                "customerIpAddress": "103.4.145.2",
                "customerUserAgent": "Mozilla/5.0",
                "shippingAddress": {"address": "House 4, Road 7", "city": "Khulna"}
            },
            {"amount": "free"},
            {}
        ]
    }"#;

    #[test]
    fn test_convert_export() {
        let orders = convert_export(EXPORT).unwrap();
        assert_eq!(orders.len(), 2);

        let first = &orders[0];
        assert_eq!(first.order.order_value, Some(2450.0));
        assert_eq!(first.order.cart_item_count, Some(2));
        assert_eq!(first.order.product_category.as_deref(), Some("Cosmetics"));
        assert_eq!(first.order.customer_phone_prefix.as_deref(), Some("015"));
        assert_eq!(first.sim_operator, SimOperator::Teletalk);
        assert_eq!(first.email_provider, Some(EmailProvider::Gmail));
        assert_eq!(first.order.shipping_address.as_deref(), Some("House 4, Road 7, Khulna"));
        assert_eq!(first.order.created_at.as_deref(), Some("2024-05-03T18:42:10.000Z"));
    }

    #[test]
    fn test_empty_entry_converts_to_neutral_order() {
        let orders = convert_export(EXPORT).unwrap();
        let empty = &orders[1];
        assert_eq!(empty.order.order_value, None);
        assert_eq!(empty.sim_operator, SimOperator::Unknown);
        assert_eq!(empty.email_provider, None);
    }

    #[test]
    fn test_missing_data_key() {
        assert!(matches!(convert_export(r#"{"orders": []}"#), Err(ConverterError::MissingData)));
        assert!(matches!(convert_export("nope"), Err(ConverterError::Json(_))));
    }

    #[test]
    fn test_converted_order_reads_back_as_raw_order() {
        let orders = convert_export(EXPORT).unwrap();
        let json = serde_json::to_string(&orders[0]).unwrap();
        let back: RawOrder = serde_json::from_str(&json).unwrap();
        assert_eq!(back, orders[0].order);
        assert!(json.contains(r#""sim_operator":"Teletalk""#));
    }
}

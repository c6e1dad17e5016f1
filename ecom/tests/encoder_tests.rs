mod common_utils;

use common_utils::{encoder, engine, labeled_orders};
use ecom::model::{AsnInfo, CartItem, RawOrder};
use processing::encoder::FeatureEncoder;

#[test]
fn test_high_value_electronics_without_address() {
    let encoder = encoder();
    let order = RawOrder {
        order_value: Some(25_000.0),
        cart_item_count: Some(3),
        product_category: Some("Electronics".to_string()),
        shipping_address: Some(String::new()),
        customer_phone: Some(String::new()),
        ..RawOrder::default()
    };

    let vector = encoder.encode(&order);
    assert_eq!(vector.value("order_value"), Some(1.0));
    assert_eq!(vector.value("cart_item_count"), Some(3.0 / 20.0));
    assert_eq!(vector.value("is_product_electronics"), Some(1.0));
    assert_eq!(vector.value("is_product_clothing"), Some(0.0));
    assert!(
        vector
            .iter()
            .filter(|f| f.name.starts_with("is_district_"))
            .all(|f| f.value.as_f64() == 0.0)
    );
    assert_eq!(vector.iter().filter(|f| f.name.starts_with("is_district_")).count(), 64);
    assert_eq!(encoder.resolve_district(&order), None);
}

#[test]
fn test_every_order_yields_the_full_catalog() {
    let encoder = encoder();
    let expected: Vec<&str> = encoder.descriptor().names().collect();

    let orders = [
        RawOrder::default(),
        RawOrder {
            order_value: Some(120.0),
            cart: vec![CartItem {
                category: Some("Groceries".into()),
                ..CartItem::default()
            }],
            created_at: Some("2024-01-01T00:00:00Z".into()),
            customer_phone: Some("+8801812345678".into()),
            browser: Some("Opera".into()),
            asn: Some(AsnInfo {
                asn: Some("AS58717".into()),
                org: Some("Summit Communications, BD".into()),
            }),
            shipping_address: Some("ঢাকা".into()),
            ..RawOrder::default()
        },
        RawOrder {
            product_category: Some("Furniture".into()),
            created_at: Some("garbage".into()),
            device_type: Some("smartwatch".into()),
            ..RawOrder::default()
        },
    ];

    for order in &orders {
        let vector = encoder.encode(order);
        assert_eq!(vector.names().collect::<Vec<_>>(), expected);
    }
}

#[test]
fn test_frozen_schema_is_the_catalog() {
    let engine = engine();
    engine.fit(&labeled_orders(30)).unwrap();

    let schema = engine.schema().unwrap();
    let catalog: Vec<&str> = engine.encoder().descriptor().names().collect();
    assert_eq!(schema.names(), catalog.as_slice());

    let single = engine.encoder().encode(&RawOrder::default());
    assert_eq!(single.names().collect::<Vec<_>>(), schema.names());
    assert!(engine.predict(&RawOrder::default()).is_ok());
}

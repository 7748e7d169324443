use serde_json::json;

use crate::property::{PropertyError, PropertyStore};
use crate::provisioning::Condition;

fn store_with(key: &str, value: serde_json::Value) -> Result<PropertyStore, PropertyError> {
    let mut store = PropertyStore::new();
    store.set(key, value)?;
    Ok(store)
}

#[test]
fn test_empty_key_always_holds() -> Result<(), PropertyError> {
    let store = store_with("env", json!("prod"))?;
    for must_match in [true, false] {
        for case_insensitive in [true, false] {
            let condition = Condition {
                property_key: String::new(),
                compare_value: "dev".to_string(),
                must_match,
                case_insensitive,
            };
            assert!(condition.matches(&store), "{:?}", condition);
        }
    }
    assert!(Condition::unconditional().matches(&PropertyStore::new()));
    Ok(())
}

#[test]
fn test_on_property_present_value() -> Result<(), PropertyError> {
    let dev = store_with("env", json!("dev"))?;
    let prod = store_with("env", json!("prod"))?;
    let condition = Condition::on_property("env", "dev");

    assert!(condition.matches(&dev));
    assert!(!condition.matches(&prod));
    Ok(())
}

#[test]
fn test_miss_matches_only_empty_compare_value() {
    let empty = PropertyStore::new();
    assert!(Condition::on_property("env", "").matches(&empty));
    assert!(!Condition::on_property("env", "dev").matches(&empty));
    assert!(Condition::not_on_property("env", "dev").matches(&empty));
}

#[test]
fn test_null_value_counts_as_miss() -> Result<(), PropertyError> {
    let store = store_with("env", json!(null))?;
    assert!(Condition::on_property("env", "").matches(&store));
    assert!(!Condition::on_property("env", "null").matches(&store));
    Ok(())
}

#[test]
fn test_case_folding() -> Result<(), PropertyError> {
    let store = store_with("env", json!("dev"))?;

    assert!(Condition::on_property("env", "DEV").matches(&store));
    assert!(
        !Condition::on_property("env", "DEV")
            .case_sensitive(true)
            .matches(&store)
    );
    assert!(
        Condition::on_property("env", "dev")
            .case_sensitive(true)
            .matches(&store)
    );
    Ok(())
}

#[test]
fn test_not_on_property_is_exact_negation() -> Result<(), PropertyError> {
    let stores = [
        PropertyStore::new(),
        store_with("env", json!("dev"))?,
        store_with("env", json!("DEV"))?,
        store_with("env", json!("prod"))?,
    ];
    for store in &stores {
        for value in ["", "dev", "Dev", "prod"] {
            for case_sensitive in [true, false] {
                let on = Condition::on_property("env", value).case_sensitive(case_sensitive);
                let not_on = Condition::not_on_property("env", value).case_sensitive(case_sensitive);
                assert_ne!(on.matches(store), not_on.matches(store), "value {:?}", value);
            }
        }
    }
    Ok(())
}

#[test]
fn test_non_string_values_compare_by_text() -> Result<(), PropertyError> {
    let port = store_with("web.port", json!(8080))?;
    assert!(Condition::on_property("web.port", "8080").matches(&port));
    assert!(!Condition::on_property("web.port", "8080.0").matches(&port));

    let flag = store_with("feature.enabled", json!(true))?;
    assert!(Condition::on_property("feature.enabled", "TRUE").matches(&flag));
    assert!(
        !Condition::on_property("feature.enabled", "TRUE")
            .case_sensitive(true)
            .matches(&flag)
    );
    Ok(())
}

#[test]
fn test_display() {
    assert_eq!(Condition::unconditional().to_string(), "always");
    assert_eq!(
        Condition::on_property("app.env", "dev").to_string(),
        "app.env == 'dev' (ignore case)"
    );
    assert_eq!(
        Condition::not_on_property("app.env", "dev")
            .case_sensitive(true)
            .to_string(),
        "app.env != 'dev'"
    );
}

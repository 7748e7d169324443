use serde_json::json;

use crate::kernel::bean::{Bean, default_prototype};
use crate::property::{PropertyError, PropertyStore};
use crate::provisioning::{BeanDescriptor, Condition, ProvisionMode, ProvisioningQueue};

#[derive(Debug, Default)]
struct Marker;

impl Bean for Marker {}

fn marker(name: &str) -> BeanDescriptor {
    BeanDescriptor::instance(Marker).named(name)
}

fn names(descriptors: &[BeanDescriptor]) -> Vec<&str> {
    descriptors.iter().map(|d| d.name()).collect()
}

#[test]
fn test_flush_preserves_insertion_order() -> Result<(), PropertyError> {
    let mut store = PropertyStore::new();
    store.set("b.enabled", "no")?;

    let mut queue = ProvisioningQueue::new();
    queue.enqueue(marker("a"));
    queue.enqueue(marker("b").when(Condition::on_property("b.enabled", "yes")));
    queue.enqueue(marker("c"));

    let survivors = queue.flush(&store);
    assert_eq!(names(&survivors), vec!["a", "c"]);
    Ok(())
}

#[test]
fn test_env_scenario() -> Result<(), PropertyError> {
    let mut store = PropertyStore::new();
    store.set("app.env", "dev")?;

    let mut queue = ProvisioningQueue::new();
    queue.enqueue(marker("x"));
    queue.enqueue(marker("y").when(Condition::on_property("app.env", "dev")));
    queue.enqueue(marker("z").when(Condition::not_on_property("app.env", "dev")));

    assert_eq!(names(&queue.flush(&store)), vec!["x", "y"]);
    Ok(())
}

#[test]
fn test_duplicate_names_pass_through() {
    let mut queue = ProvisioningQueue::new();
    queue.enqueue(marker("same"));
    queue.enqueue(marker("same"));
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.flush(&PropertyStore::new()).len(), 2);
}

#[test]
fn test_plan_reports_every_descriptor() -> Result<(), PropertyError> {
    let mut store = PropertyStore::new();
    store.set("app", json!({ "env": "prod" }))?;

    let mut queue = ProvisioningQueue::new();
    queue.enqueue(BeanDescriptor::prototype(default_prototype::<Marker>()));
    queue.enqueue(marker("dev-tools").when(Condition::on_property("app.env", "dev")));

    let plan = queue.plan(&store);
    assert_eq!(plan.len(), 2);
    assert_eq!(queue.len(), 2, "plan must not consume the queue");

    assert_eq!(plan[0].position, 0);
    assert_eq!(plan[0].mode, ProvisionMode::ProvidedPrototype);
    assert!(plan[0].name.is_empty());
    assert!(plan[0].type_name.ends_with("Marker"));
    assert!(plan[0].included);

    assert_eq!(plan[1].mode, ProvisionMode::RegisteredInstance);
    assert_eq!(plan[1].name, "dev-tools");
    assert!(!plan[1].included);

    // The verdicts agree with what a flush would forward
    let survivors = queue.flush(&store);
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].mode(), ProvisionMode::ProvidedPrototype);
    Ok(())
}

#[test]
fn test_label_falls_back_to_type_name() {
    let unnamed = BeanDescriptor::instance(Marker);
    assert!(unnamed.label().ends_with("Marker"));
    assert_eq!(marker("m").label(), "m");
}

#![cfg(test)]

use crate::kernel::bean::prototype;
use crate::kernel::error::Result;
use crate::provisioning::{BeanDescriptor, Condition};
use crate::tests::integration::common::{Journal, Tracked, cancelled, quiet_dio};

fn tracked(name: &'static str, journal: &Journal) -> BeanDescriptor {
    let journal = journal.clone();
    BeanDescriptor::prototype(prototype(move |_ctx| Ok(Tracked::new(name, &journal)))).named(name)
}

#[tokio::test]
async fn test_env_scenario_end_to_end() -> Result<()> {
    let journal = Journal::default();
    let (mut dio, _memory) = quiet_dio();

    dio.set_property("app.env", "dev")?
        .enqueue(tracked("x", &journal))?
        .enqueue(tracked("y", &journal).when(Condition::on_property("app.env", "dev")))?
        .enqueue(tracked("z", &journal).when(Condition::not_on_property("app.env", "dev")))?;

    dio.run(cancelled()).await?;

    assert_eq!(journal.initialized(), vec!["x", "y"]);
    assert!(dio.get_bean("z").is_none());
    Ok(())
}

#[tokio::test]
async fn test_excluded_bean_keeps_relative_order() -> Result<()> {
    let journal = Journal::default();
    let (mut dio, _memory) = quiet_dio();

    dio.set_property("feature.b", "off")?
        .enqueue(tracked("a", &journal))?
        .enqueue(tracked("b", &journal).when(Condition::on_property("feature.b", "on")))?
        .enqueue(tracked("c", &journal))?;

    dio.run(cancelled()).await?;

    assert_eq!(journal.initialized(), vec!["a", "c"]);
    let entries = journal.entries();
    assert_eq!(&entries[entries.len() - 2..], ["destroy:c", "destroy:a"]);
    Ok(())
}

#[tokio::test]
async fn test_case_sensitivity_flag() -> Result<()> {
    let journal = Journal::default();
    let (mut dio, _memory) = quiet_dio();

    let folded = journal.clone();
    let exact = journal.clone();
    dio.set_property("app.env", "dev")?
        .provide_named_on_property(
            "folded",
            prototype(move |_ctx| Ok(Tracked::new("folded", &folded))),
            "app.env",
            "DEV",
            false,
        )?
        .provide_named_on_property(
            "exact",
            prototype(move |_ctx| Ok(Tracked::new("exact", &exact))),
            "app.env",
            "DEV",
            true,
        )?;

    dio.run(cancelled()).await?;

    assert_eq!(journal.initialized(), vec!["folded"]);
    Ok(())
}

#[tokio::test]
async fn test_after_load_can_look_up_constructed_beans() -> Result<()> {
    let journal = Journal::default();
    let (mut dio, _memory) = quiet_dio();

    let seen = journal.clone();
    dio.enqueue(tracked("store", &journal))?.after_load(move |dio| {
        let store = dio.get_by_type::<Tracked>().map(|t| t.name.clone());
        seen.push(format!("after_load:{}", store.unwrap_or_default()));
        Ok(())
    })?;

    dio.run(cancelled()).await?;

    assert!(journal.entries().contains(&"after_load:store".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_construction_failure_aborts_start() -> Result<()> {
    let journal = Journal::default();
    let (mut dio, memory) = quiet_dio();

    dio.enqueue(tracked("first", &journal))?.enqueue(
        BeanDescriptor::prototype(prototype(|_ctx| -> Result<Tracked> {
            Err("database ping failed".into())
        }))
        .named("db"),
    )?;

    let err = dio.run(cancelled()).await.unwrap_err();
    assert!(err.to_string().contains("db"), "got {}", err);
    assert!(journal.initialized().is_empty(), "no bean is initialized on a broken graph");
    assert!(memory.contains(log::Level::Error, "database ping failed"));
    Ok(())
}

//! Unit tests for the class catalogue.

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;

fn failing(descriptor: &PluginDescriptor) -> Result<Box<dyn PluginInstance>, ConstructionError> {
    Err(ConstructionError::Failed {
        class: descriptor.class().unwrap_or_default().to_owned(),
        message: "constructor exploded".into(),
    })
}

#[fixture]
fn catalogue() -> ClassCatalogue {
    ClassCatalogue::new()
        .with_class("com.foo.P1", ClassCatalogue::configured)
        .with_class("com.foo.Broken", failing)
}

#[rstest]
fn known_class_is_constructed(catalogue: ClassCatalogue) {
    let mut instance = catalogue
        .construct(&PluginDescriptor::named("p1", "com.foo.P1"))
        .expect("construct");
    instance.init().expect("init");
    instance.close().expect("close");
}

#[rstest]
fn unknown_class_is_rejected(catalogue: ClassCatalogue) {
    let result = catalogue.construct(&PluginDescriptor::named("p1", "com.foo.Nope"));
    assert!(matches!(
        result,
        Err(ConstructionError::UnknownClass { class }) if class == "com.foo.Nope"
    ));
}

#[rstest]
fn constructor_failure_is_reported(catalogue: ClassCatalogue) {
    let Err(error) = catalogue.construct(&PluginDescriptor::named("b", "com.foo.Broken")) else {
        panic!("expected construction failure");
    };
    assert_eq!(
        error.to_string(),
        "failed to construct 'com.foo.Broken': constructor exploded"
    );
}

#[test]
fn permissive_catalogue_accepts_any_class() {
    let catalogue = ClassCatalogue::permissive();
    assert!(catalogue.is_permissive());
    assert!(
        catalogue
            .construct(&PluginDescriptor::named("p", "anything.At.All"))
            .is_ok()
    );
}

#[rstest]
#[case::object(json!({"threads": 4}), true)]
#[case::null(Value::Null, true)]
#[case::string(json!("threads=4"), false)]
#[case::array(json!([1, 2]), false)]
fn configured_constructor_checks_config(#[case] config: Value, #[case] accepted: bool) {
    let descriptor = PluginDescriptor::named("p", "C").with_field(CONFIG, config);
    let result = ClassCatalogue::configured(&descriptor);
    assert_eq!(result.is_ok(), accepted);
}

#[test]
fn explicit_class_wins_over_fallback() {
    let catalogue = ClassCatalogue::permissive().with_class("com.foo.Broken", failing);
    assert!(catalogue.contains("com.foo.Broken"));
    assert!(
        catalogue
            .construct(&PluginDescriptor::named("b", "com.foo.Broken"))
            .is_err()
    );
}

#[test]
fn debug_lists_classes_in_order() {
    let catalogue = ClassCatalogue::new()
        .with_class("b", ClassCatalogue::configured)
        .with_class("a", ClassCatalogue::configured);
    assert_eq!(
        format!("{catalogue:?}"),
        r#"ClassCatalogue { classes: ["a", "b"], permissive: false }"#
    );
}

fn builds<F: PluginFactory>(factory: F) -> bool {
    factory
        .construct(&PluginDescriptor::named("p", "C"))
        .is_ok()
}

#[test]
fn factory_references_forward() {
    let catalogue = Arc::new(ClassCatalogue::permissive());
    assert!(builds(&*catalogue));
    assert!(builds(Arc::clone(&catalogue)));
}

// Cascading lookup across the two configuration files, through the public store API.

use canvas_cli::config::{ConfigScope, ConfigStore, ScopeSelection, Unset};
use serde_json::json;
use tempfile::TempDir;

fn store(dir: &TempDir) -> ConfigStore {
    ConfigStore::new(
        dir.path().join("project/.canvasconfig.json"),
        dir.path().join("home/.canvasconfig.json"),
    )
}

#[test]
fn local_values_shadow_global_ones() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store.set("course_id", json!(10), ConfigScope::Local).unwrap();
    store.set("course_id", json!(99), ConfigScope::Global).unwrap();
    store.set("assignment_id", json!(5), ConfigScope::Global).unwrap();

    assert_eq!(store.resolve("course_id", None).unwrap().as_deref(), Some("10"));
    assert_eq!(store.resolve("assignment_id", None).unwrap().as_deref(), Some("5"));
    assert_eq!(
        store.resolve("course_id", Some("7".into())).unwrap().as_deref(),
        Some("7")
    );
    assert_eq!(
        store.get("course_id", ScopeSelection::Only(ConfigScope::Global)).unwrap().as_deref(),
        Some("99")
    );
}

#[test]
fn unsetting_the_local_value_exposes_the_global_one() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store.set("host", json!("local.example.edu"), ConfigScope::Local).unwrap();
    store.set("host", json!("global.example.edu"), ConfigScope::Global).unwrap();

    assert_eq!(store.unset("host", ConfigScope::Local).unwrap(), Unset::Removed);
    assert_eq!(store.unset("host", ConfigScope::Local).unwrap(), Unset::NotFound);
    assert_eq!(
        store.resolve("host", None).unwrap().as_deref(),
        Some("global.example.edu")
    );
}

#[test]
fn listing_reports_where_each_value_lives() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store.set("token", json!("secret"), ConfigScope::Global).unwrap();
    store.set("course_id", json!(10), ConfigScope::Local).unwrap();

    let entries = store.list(ScopeSelection::Cascade).unwrap();
    let course = entries.iter().find(|e| e.key == "course_id").unwrap();
    assert_eq!(course.scope, ConfigScope::Local);
    let token = entries.iter().find(|e| e.key == "token").unwrap();
    assert_eq!(token.scope, ConfigScope::Global);
    assert_eq!(token.path.as_path(), store.path(ConfigScope::Global));
}

#[test]
fn missing_files_read_as_empty() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    assert!(store.load(ConfigScope::Local).unwrap().is_empty());
    assert_eq!(store.resolve("course_id", None).unwrap(), None);
}

// Layered configuration store.
//
// Two flat JSON objects with the same file name: one in the working directory
// (local) and one in the home directory (global). Local wins over global when
// a key is resolved, and an explicit per-call override wins over both.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

/// File name used by both scopes.
pub const CONFIG_FILE_NAME: &str = ".canvasconfig.json";

/// Key/value pairs of one scope file.
pub type Mapping = Map<String, Value>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("{} does not contain valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{} must contain a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    #[error("cannot use both --global and --local for this command")]
    AmbiguousScope,

    #[error("could not determine the home directory for the global config")]
    NoHomeDir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    Local,
    Global,
}

impl fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigScope::Local => f.write_str("local"),
            ConfigScope::Global => f.write_str("global"),
        }
    }
}

/// Which scopes a read-style command (`get`, `list`) looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeSelection {
    /// Neither or both flags: cascade across both files.
    Cascade,
    Only(ConfigScope),
}

impl ScopeSelection {
    pub fn from_flags(global: bool, local: bool) -> Self {
        match (global, local) {
            (true, false) => ScopeSelection::Only(ConfigScope::Global),
            (false, true) => ScopeSelection::Only(ConfigScope::Local),
            _ => ScopeSelection::Cascade,
        }
    }
}

/// Target scope for a write (`set`, `unset`). Both flags is ambiguous.
pub fn write_scope(global: bool, local: bool, default: ConfigScope) -> Result<ConfigScope, ConfigError> {
    match (global, local) {
        (true, true) => Err(ConfigError::AmbiguousScope),
        (true, false) => Ok(ConfigScope::Global),
        (false, true) => Ok(ConfigScope::Local),
        (false, false) => Ok(default),
    }
}

/// Result of `unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unset {
    Removed,
    NotFound,
}

/// One row of `config list`, annotated with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedEntry {
    pub key: String,
    pub value: Value,
    pub scope: ConfigScope,
    pub path: PathBuf,
}

/// Handle on the two scope files.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    local_path: PathBuf,
    global_path: PathBuf,
}

impl ConfigStore {
    pub fn new(local_path: PathBuf, global_path: PathBuf) -> Self {
        Self {
            local_path,
            global_path,
        }
    }

    /// Store rooted at the current working directory and the user's home.
    pub fn discover() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
            path: PathBuf::from("."),
            source,
        })?;
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(Self::new(
            cwd.join(CONFIG_FILE_NAME),
            home.join(CONFIG_FILE_NAME),
        ))
    }

    pub fn path(&self, scope: ConfigScope) -> &Path {
        match scope {
            ConfigScope::Local => &self.local_path,
            ConfigScope::Global => &self.global_path,
        }
    }

    /// Read a scope file. A missing file is an empty mapping.
    pub fn load(&self, scope: ConfigScope) -> Result<Mapping, ConfigError> {
        let path = self.path(scope);
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Mapping::new()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let value: Value = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(ConfigError::NotAnObject {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Overwrite a scope file with `mapping`, creating parent directories.
    pub fn save(&self, scope: ConfigScope, mapping: &Mapping) -> Result<(), ConfigError> {
        let path = self.path(scope);
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let mut body = serde_json::to_string_pretty(mapping).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        body.push('\n');
        fs::write(path, body).map_err(io_err)?;
        tracing::debug!(path = %path.display(), keys = mapping.len(), "saved config");
        Ok(())
    }

    /// Cascading lookup: override, then local, then global.
    ///
    /// A local value that is falsy (empty string, 0, false, null) falls
    /// through to the global one.
    pub fn resolve(&self, key: &str, override_value: Option<String>) -> Result<Option<String>, ConfigError> {
        if let Some(value) = override_value {
            return Ok(Some(value));
        }
        Ok(self.resolve_value(key)?.map(|v| display_value(&v)))
    }

    /// Like [`resolve`](Self::resolve) but keeps the JSON value.
    pub fn resolve_value(&self, key: &str) -> Result<Option<Value>, ConfigError> {
        let local = self.load(ConfigScope::Local)?;
        if let Some(value) = local.get(key).filter(|v| is_truthy(v)) {
            return Ok(Some(value.clone()));
        }
        let global = self.load(ConfigScope::Global)?;
        Ok(global.get(key).cloned())
    }

    pub fn get(&self, key: &str, selection: ScopeSelection) -> Result<Option<String>, ConfigError> {
        match selection {
            ScopeSelection::Cascade => self.resolve(key, None),
            ScopeSelection::Only(scope) => Ok(self.load(scope)?.get(key).map(display_value)),
        }
    }

    pub fn set(&self, key: &str, value: Value, scope: ConfigScope) -> Result<(), ConfigError> {
        let mut mapping = self.load(scope)?;
        mapping.insert(key.to_string(), value);
        self.save(scope, &mapping)
    }

    /// Remove `key` from `scope`. The file is left untouched when the key is absent.
    pub fn unset(&self, key: &str, scope: ConfigScope) -> Result<Unset, ConfigError> {
        let mut mapping = self.load(scope)?;
        if mapping.remove(key).is_none() {
            return Ok(Unset::NotFound);
        }
        self.save(scope, &mapping)?;
        Ok(Unset::Removed)
    }

    /// Entries of the selected scope(s). In cascade mode global entries are
    /// listed first and local ones replace them on key collision.
    pub fn list(&self, selection: ScopeSelection) -> Result<Vec<ListedEntry>, ConfigError> {
        let scopes: &[ConfigScope] = match selection {
            ScopeSelection::Cascade => &[ConfigScope::Global, ConfigScope::Local],
            ScopeSelection::Only(ConfigScope::Global) => &[ConfigScope::Global],
            ScopeSelection::Only(ConfigScope::Local) => &[ConfigScope::Local],
        };
        let mut entries: Vec<ListedEntry> = Vec::new();
        for &scope in scopes {
            let path = self.path(scope).to_path_buf();
            for (key, value) in self.load(scope)? {
                let entry = ListedEntry {
                    key,
                    value,
                    scope,
                    path: path.clone(),
                };
                match entries.iter_mut().find(|e| e.key == entry.key) {
                    Some(existing) => *existing = entry,
                    None => entries.push(entry),
                }
            }
        }
        Ok(entries)
    }
}

/// Loose truthiness of a JSON value: null, false, 0, "" and empty containers are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Strings print bare, everything else as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Turn a command-line string into the JSON value stored for it.
///
/// Id-like keys are stored as integers when they parse as one.
pub fn parse_value(key: &str, raw: &str) -> Value {
    if key.ends_with("_id") {
        if let Ok(n) = raw.trim().parse::<u64>() {
            return Value::from(n);
        }
    }
    Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> ConfigStore {
        ConfigStore::new(
            dir.path().join("project").join(CONFIG_FILE_NAME),
            dir.path().join("home").join(CONFIG_FILE_NAME),
        )
    }

    fn mapping(value: Value) -> Mapping {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(store.load(ConfigScope::Local).unwrap().is_empty());
        assert!(store.load(ConfigScope::Global).unwrap().is_empty());
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path(ConfigScope::Local).parent().unwrap()).unwrap();
        fs::write(store.path(ConfigScope::Local), "{not json").unwrap();
        assert!(matches!(
            store.load(ConfigScope::Local),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn non_object_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path(ConfigScope::Global).parent().unwrap()).unwrap();
        fs::write(store.path(ConfigScope::Global), "[1, 2]").unwrap();
        assert!(matches!(
            store.load(ConfigScope::Global),
            Err(ConfigError::NotAnObject { .. })
        ));
    }

    #[test]
    fn save_then_load_reproduces_mapping() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let data = mapping(json!({"course_id": 10, "host": "canvas.example.edu", "file": ""}));
        store.save(ConfigScope::Local, &data).unwrap();
        let loaded = store.load(ConfigScope::Local).unwrap();
        assert_eq!(loaded, data);

        // Saving what was loaded again changes nothing.
        let before = fs::read(store.path(ConfigScope::Local)).unwrap();
        store.save(ConfigScope::Local, &loaded).unwrap();
        let after = fs::read(store.path(ConfigScope::Local)).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn resolve_prefers_local_then_global() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(ConfigScope::Local, &mapping(json!({"k": "a"}))).unwrap();
        store.save(ConfigScope::Global, &mapping(json!({"k": "b"}))).unwrap();
        assert_eq!(store.resolve("k", None).unwrap().as_deref(), Some("a"));

        store.save(ConfigScope::Local, &Mapping::new()).unwrap();
        assert_eq!(store.resolve("k", None).unwrap().as_deref(), Some("b"));

        store.save(ConfigScope::Global, &Mapping::new()).unwrap();
        assert_eq!(store.resolve("k", None).unwrap(), None);
    }

    #[test]
    fn override_wins_regardless_of_files() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(ConfigScope::Local, &mapping(json!({"k": "a"}))).unwrap();
        assert_eq!(
            store.resolve("k", Some("z".into())).unwrap().as_deref(),
            Some("z")
        );
        assert_eq!(
            store.resolve("absent", Some("z".into())).unwrap().as_deref(),
            Some("z")
        );
    }

    #[test]
    fn falsy_local_values_fall_through() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store
            .save(ConfigScope::Local, &mapping(json!({"a": "", "b": 0, "c": false})))
            .unwrap();
        store
            .save(ConfigScope::Global, &mapping(json!({"a": "ga", "b": 7, "c": true})))
            .unwrap();
        assert_eq!(store.resolve("a", None).unwrap().as_deref(), Some("ga"));
        assert_eq!(store.resolve("b", None).unwrap().as_deref(), Some("7"));
        assert_eq!(store.resolve("c", None).unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn get_reads_only_requested_scope() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(ConfigScope::Global, &mapping(json!({"host": "g"}))).unwrap();
        assert_eq!(
            store
                .get("host", ScopeSelection::Only(ConfigScope::Local))
                .unwrap(),
            None
        );
        assert_eq!(
            store.get("host", ScopeSelection::Cascade).unwrap().as_deref(),
            Some("g")
        );
        assert_eq!(
            store.get("host", ScopeSelection::from_flags(true, true)).unwrap().as_deref(),
            Some("g")
        );
    }

    #[test]
    fn writing_to_both_scopes_is_ambiguous() {
        assert!(matches!(
            write_scope(true, true, ConfigScope::Local),
            Err(ConfigError::AmbiguousScope)
        ));
        assert_eq!(
            write_scope(false, false, ConfigScope::Local).unwrap(),
            ConfigScope::Local
        );
        assert_eq!(
            write_scope(true, false, ConfigScope::Local).unwrap(),
            ConfigScope::Global
        );
    }

    #[test]
    fn unset_absent_key_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(ConfigScope::Local, &mapping(json!({"keep": "me"}))).unwrap();
        let before = fs::read(store.path(ConfigScope::Local)).unwrap();
        assert_eq!(store.unset("missing", ConfigScope::Local).unwrap(), Unset::NotFound);
        assert_eq!(fs::read(store.path(ConfigScope::Local)).unwrap(), before);
    }

    #[test]
    fn unset_removes_only_that_key() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store
            .save(ConfigScope::Global, &mapping(json!({"a": "1", "b": "2"})))
            .unwrap();
        assert_eq!(store.unset("a", ConfigScope::Global).unwrap(), Unset::Removed);
        assert_eq!(
            store.load(ConfigScope::Global).unwrap(),
            mapping(json!({"b": "2"}))
        );
    }

    #[test]
    fn set_merges_into_existing_file() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.set("host", json!("h"), ConfigScope::Global).unwrap();
        store.set("token", json!("t"), ConfigScope::Global).unwrap();
        assert_eq!(
            store.load(ConfigScope::Global).unwrap(),
            mapping(json!({"host": "h", "token": "t"}))
        );
    }

    #[test]
    fn cascaded_list_tracks_origin() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store
            .save(ConfigScope::Global, &mapping(json!({"host": "g", "course_id": 99})))
            .unwrap();
        store.save(ConfigScope::Local, &mapping(json!({"course_id": 10}))).unwrap();

        let entries = store.list(ScopeSelection::Cascade).unwrap();
        assert_eq!(entries.len(), 2);
        let course = entries.iter().find(|e| e.key == "course_id").unwrap();
        assert_eq!(course.value, json!(10));
        assert_eq!(course.scope, ConfigScope::Local);
        assert_eq!(course.path, store.path(ConfigScope::Local));
        let host = entries.iter().find(|e| e.key == "host").unwrap();
        assert_eq!(host.scope, ConfigScope::Global);

        let only_local = store.list(ScopeSelection::Only(ConfigScope::Local)).unwrap();
        assert_eq!(only_local.len(), 1);
    }

    #[test]
    fn id_keys_are_stored_as_numbers() {
        assert_eq!(parse_value("course_id", "42"), json!(42));
        assert_eq!(parse_value("course_id", "abc"), json!("abc"));
        assert_eq!(parse_value("host", "42"), json!("42"));
    }
}

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};

use serde_json::{json, Map, Value};

pub const SETTING_WINDOW_WIDTH: &str = "window.width";
pub const SETTING_WINDOW_HEIGHT: &str = "window.height";
pub const SETTING_LAUNCH_AT_STARTUP: &str = "launchAtStartup";
pub const SETTING_LOCALE: &str = "locale";
pub const SETTING_DEVICE_ID: &str = "deviceId";

static SETTINGS_WRITE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Persisted key-value settings backed by a single JSON object file.
///
/// The file is read and rewritten whole on each access; a process-wide lock
/// serializes writers. Corrupt or non-object content is reset rather than
/// treated as fatal.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(shell_root: &Path) -> Self {
        Self {
            path: shell_root.join("settings.json"),
        }
    }

    #[cfg(test)]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot<F>(&self, log: F) -> Map<String, Value>
    where
        F: Fn(&str),
    {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) => {
                if error.kind() != std::io::ErrorKind::NotFound {
                    log(&format!(
                        "failed to read settings {}: {}",
                        self.path.display(),
                        error
                    ));
                }
                return Map::new();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                log(&format!(
                    "settings {} has non-object root, treating as empty",
                    self.path.display()
                ));
                Map::new()
            }
            Err(error) => {
                log(&format!(
                    "failed to parse settings {}: {}, treating as empty",
                    self.path.display(),
                    error
                ));
                Map::new()
            }
        }
    }

    pub fn get<F>(&self, key: &str, default: Value, log: F) -> Value
    where
        F: Fn(&str),
    {
        self.snapshot(log).remove(key).unwrap_or(default)
    }

    pub fn set<F>(&self, key: &str, value: Value, log: F) -> Result<(), String>
    where
        F: Fn(&str),
    {
        let _guard = match SETTINGS_WRITE_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut map = self.snapshot(&log);
        map.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create settings directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }
        let serialized = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|error| format!("Failed to serialize settings: {error}"))?;
        fs::write(&self.path, serialized).map_err(|error| {
            format!(
                "Failed to write settings {}: {}",
                self.path.display(),
                error
            )
        })
    }

    pub fn window_size<F>(&self, default_width: f64, default_height: f64, log: F) -> (f64, f64)
    where
        F: Fn(&str),
    {
        let map = self.snapshot(log);
        let width = map
            .get(SETTING_WINDOW_WIDTH)
            .and_then(Value::as_f64)
            .unwrap_or(default_width);
        let height = map
            .get(SETTING_WINDOW_HEIGHT)
            .and_then(Value::as_f64)
            .unwrap_or(default_height);
        (width, height)
    }

    pub fn set_window_size<F>(&self, width: f64, height: f64, log: F) -> Result<(), String>
    where
        F: Fn(&str),
    {
        self.set(SETTING_WINDOW_WIDTH, json!(width), &log)?;
        self.set(SETTING_WINDOW_HEIGHT, json!(height), &log)
    }

    pub fn locale<F>(&self, log: F) -> Option<String>
    where
        F: Fn(&str),
    {
        self.snapshot(log)
            .get(SETTING_LOCALE)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn launch_at_startup<F>(&self, log: F) -> bool
    where
        F: Fn(&str),
    {
        self.snapshot(log)
            .get(SETTING_LAUNCH_AT_STARTUP)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Stable per-install identifier, generated on first read.
    pub fn device_id<F>(&self, log: F) -> Result<String, String>
    where
        F: Fn(&str),
    {
        if let Some(existing) = self
            .snapshot(&log)
            .get(SETTING_DEVICE_ID)
            .and_then(Value::as_str)
            .filter(|value| !value.trim().is_empty())
        {
            return Ok(existing.to_string());
        }

        let generated = uuid::Uuid::new_v4().to_string();
        self.set(SETTING_DEVICE_ID, json!(generated), &log)?;
        log(&format!("generated device id {generated}"));
        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in_temp_dir() -> (tempfile::TempDir, SettingsStore) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = SettingsStore::with_path(dir.path().join("settings.json"));
        (dir, store)
    }

    #[test]
    fn get_returns_default_when_file_is_missing() {
        let (_dir, store) = store_in_temp_dir();
        let value = store.get("missing", json!("fallback"), |_| {});
        assert_eq!(value, json!("fallback"));
    }

    #[test]
    fn set_then_get_round_trips_through_the_file() {
        let (_dir, store) = store_in_temp_dir();
        store
            .set(SETTING_LAUNCH_AT_STARTUP, json!(true), |_| {})
            .expect("write setting");
        assert!(store.launch_at_startup(|_| {}));
    }

    #[test]
    fn set_preserves_unrelated_keys() {
        let (_dir, store) = store_in_temp_dir();
        store.set("other", json!(7), |_| {}).expect("write other");
        store
            .set(SETTING_LOCALE, json!("en-US"), |_| {})
            .expect("write locale");
        let map = store.snapshot(|_| {});
        assert_eq!(map.get("other"), Some(&json!(7)));
        assert_eq!(map.get(SETTING_LOCALE), Some(&json!("en-US")));
    }

    #[test]
    fn corrupt_settings_file_is_treated_as_empty() {
        let (_dir, store) = store_in_temp_dir();
        fs::create_dir_all(store.path().parent().expect("settings parent"))
            .expect("create settings dir");
        fs::write(store.path(), "not json").expect("write corrupt file");

        let mut logs = Vec::new();
        let map = store.snapshot(|line| logs.push(line.to_string()));
        assert!(map.is_empty());
        assert!(logs.iter().any(|line| line.contains("failed to parse")));
    }

    #[test]
    fn window_size_falls_back_to_defaults() {
        let (_dir, store) = store_in_temp_dir();
        assert_eq!(store.window_size(1000.0, 600.0, |_| {}), (1000.0, 600.0));

        store
            .set_window_size(1280.0, 720.0, |_| {})
            .expect("persist size");
        assert_eq!(store.window_size(1000.0, 600.0, |_| {}), (1280.0, 720.0));
    }

    #[test]
    fn device_id_is_generated_once_and_then_stable() {
        let (_dir, store) = store_in_temp_dir();
        let first = store.device_id(|_| {}).expect("generate device id");
        let second = store.device_id(|_| {}).expect("reread device id");
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }
}

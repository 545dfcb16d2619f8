use serde_json::Value;
use tauri::{AppHandle, Manager};
use tauri_plugin_opener::OpenerExt;
use url::Url;

use crate::{
    append_window_log, locale, settings_store::SettingsStore, ShellState,
    SETTING_LAUNCH_AT_STARTUP, SETTING_LOCALE,
};

#[derive(Debug, serde::Serialize)]
pub(crate) struct BridgeResult {
    pub ok: bool,
    pub reason: Option<String>,
}

impl BridgeResult {
    fn ok() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DaemonBridgeStatus {
    pub running: bool,
    pub api_address: Option<String>,
}

#[tauri::command]
pub(crate) fn webui_bridge_is_desktop_runtime() -> bool {
    true
}

#[tauri::command]
pub(crate) fn webui_bridge_get_daemon_status(app_handle: AppHandle) -> DaemonBridgeStatus {
    let state = app_handle.state::<ShellState>();
    DaemonBridgeStatus {
        running: state.daemon_running(),
        api_address: state.known_api_address(),
    }
}

#[tauri::command]
pub(crate) fn webui_bridge_get_settings(app_handle: AppHandle) -> Value {
    let store = app_handle.state::<SettingsStore>();
    Value::Object(store.snapshot(|message| append_window_log(message)))
}

#[tauri::command]
pub(crate) fn webui_bridge_set_setting(
    app_handle: AppHandle,
    key: String,
    value: Value,
) -> BridgeResult {
    let store = app_handle.state::<SettingsStore>();
    let normalized = match key.as_str() {
        SETTING_LAUNCH_AT_STARTUP => {
            if !value.is_boolean() {
                return BridgeResult::rejected("launchAtStartup expects a boolean value.");
            }
            value
        }
        SETTING_LOCALE => {
            let Some(locale_tag) = value.as_str().and_then(locale::normalize_locale) else {
                return BridgeResult::rejected("locale expects a language tag such as en-US.");
            };
            Value::String(locale_tag)
        }
        _ => return BridgeResult::rejected(format!("Setting '{key}' is not writable.")),
    };

    match store.set(&key, normalized, |message| append_window_log(message)) {
        Ok(()) => BridgeResult::ok(),
        Err(error) => BridgeResult::rejected(error),
    }
}

#[tauri::command]
pub(crate) fn webui_bridge_open_external(app_handle: AppHandle, url: String) -> BridgeResult {
    let parsed = match Url::parse(&url) {
        Ok(parsed) => parsed,
        Err(error) => return BridgeResult::rejected(format!("Invalid external url: {error}")),
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return BridgeResult::rejected(format!(
            "Refusing to open external url with scheme '{}'.",
            parsed.scheme()
        ));
    }

    match app_handle.opener().open_url(parsed.as_str(), None::<&str>) {
        Ok(()) => BridgeResult::ok(),
        Err(error) => BridgeResult::rejected(format!("Failed to open external url: {error}")),
    }
}

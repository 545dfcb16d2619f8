use tauri::{AppHandle, Manager, PhysicalSize, WebviewUrl, WebviewWindow, WebviewWindowBuilder};

use crate::{
    append_window_log, daemon, dock, locale,
    settings_store::SettingsStore,
    webui_url::{self, WebuiUrlParams},
    ShellState, DEFAULT_LOCALE, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH, MIN_WINDOW_HEIGHT,
    MIN_WINDOW_WIDTH, WEBUI_WINDOW_LABEL,
};

/// Existing webui window, if one is open. The runtime's window registry is
/// the single owner of the handle, so "at most one window" holds for free.
pub fn get_webui_window(app_handle: &AppHandle) -> Option<WebviewWindow> {
    app_handle.get_webview_window(WEBUI_WINDOW_LABEL)
}

/// Returns the open webui window or creates one. Never creates a second
/// window; a `launch` while one exists surfaces the existing instance.
pub fn launch_webui_window(app_handle: &AppHandle, route: &str) -> Result<WebviewWindow, String> {
    if let Some(window) = get_webui_window(app_handle) {
        show_webui_window(app_handle, append_window_log);
        return Ok(window);
    }

    let store = app_handle.state::<SettingsStore>();
    let (stored_width, stored_height) =
        store.window_size(DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT, |message| {
            append_window_log(message)
        });
    let (width, height) = clamp_window_size(stored_width, stored_height);
    let resolved_locale = locale::resolve_locale(&store, DEFAULT_LOCALE, |message| {
        append_window_log(message)
    });
    let device_id = store.device_id(|message| append_window_log(message))?;

    let state = app_handle.state::<ShellState>();
    let api_address = state.known_api_address().or_else(|| {
        let discovered = daemon::discover_api_address(|message| append_window_log(message));
        if discovered.is_some() {
            state.remember_api_address(discovered.clone());
        }
        discovered
    });

    let url = webui_url::build_webui_url(&WebuiUrlParams {
        api_address: api_address.clone(),
        locale: resolved_locale,
        device_id,
        route: route.to_string(),
    })?;

    // Built hidden; shown once the first page load finishes.
    let window = WebviewWindowBuilder::new(
        app_handle,
        WEBUI_WINDOW_LABEL,
        WebviewUrl::CustomProtocol(url.clone()),
    )
    .title("IPFS Desktop")
    .inner_size(width, height)
    .min_inner_size(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT)
    .visible(false)
    .build()
    .map_err(|error| format!("Failed to create webui window: {error}"))?;

    append_window_log(&format!(
        "webui window created: size={width}x{height}, api_known={}, url={url}",
        api_address.is_some()
    ));
    Ok(window)
}

pub fn clamp_window_size(width: f64, height: f64) -> (f64, f64) {
    let width = if width.is_finite() && width >= MIN_WINDOW_WIDTH {
        width
    } else {
        DEFAULT_WINDOW_WIDTH
    };
    let height = if height.is_finite() && height >= MIN_WINDOW_HEIGHT {
        height
    } else {
        DEFAULT_WINDOW_HEIGHT
    };
    (width, height)
}

/// Ready-to-show: the window was built hidden and appears only after its
/// first page load finished.
pub fn show_window_when_ready(app_handle: &AppHandle, window: &WebviewWindow) {
    match window.is_visible() {
        Ok(true) => {}
        Ok(false) => {
            if let Err(error) = window.show() {
                append_window_log(&format!("failed to show webui window: {error}"));
                return;
            }
            if let Err(error) = window.set_focus() {
                append_window_log(&format!("failed to focus webui window: {error}"));
            }
            dock::set_dock_visible(app_handle, true, append_window_log);
        }
        Err(error) => {
            append_window_log(&format!(
                "failed to read webui window visibility before show: {error}"
            ));
        }
    }
}

pub fn persist_window_size(app_handle: &AppHandle, size: &PhysicalSize<u32>) {
    let Some(window) = get_webui_window(app_handle) else {
        return;
    };
    let scale_factor = window.scale_factor().unwrap_or(1.0);
    let logical = size.to_logical::<f64>(scale_factor);
    if logical.width <= 0.0 || logical.height <= 0.0 {
        return;
    }

    let store = app_handle.state::<SettingsStore>();
    if let Err(error) = store.set_window_size(logical.width, logical.height, |message| {
        append_window_log(message)
    }) {
        append_window_log(&format!("failed to persist window size: {error}"));
    }
}

pub fn show_webui_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(window) = get_webui_window(app_handle) else {
        log("show_webui_window skipped: webui window not found");
        return;
    };

    if let Err(error) = window.unminimize() {
        log(&format!("failed to unminimize webui window: {error}"));
    }
    if let Err(error) = window.show() {
        log(&format!("failed to show webui window: {error}"));
    }
    if let Err(error) = window.set_focus() {
        log(&format!("failed to focus webui window: {error}"));
    }
    dock::set_dock_visible(app_handle, true, &log);
}

pub fn hide_webui_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(window) = get_webui_window(app_handle) else {
        log("hide_webui_window skipped: webui window not found");
        return;
    };
    if let Err(error) = window.hide() {
        log(&format!("failed to hide webui window: {error}"));
    }
    dock::set_dock_visible(app_handle, false, &log);
}

/// Tray toggle: hide a visible window, surface a hidden one, recreate a
/// closed one.
pub fn toggle_webui_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(window) = get_webui_window(app_handle) else {
        if let Err(error) = launch_webui_window(app_handle, crate::DEFAULT_ROUTE) {
            log(&format!("failed to relaunch webui window: {error}"));
        }
        return;
    };

    match window.is_visible() {
        Ok(true) => hide_webui_window(app_handle, log),
        Ok(false) => show_webui_window(app_handle, log),
        Err(error) => log(&format!(
            "failed to read webui window visibility in toggle: {error}"
        )),
    }
}

pub fn reload_webui_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(window) = get_webui_window(app_handle) else {
        log("reload_webui_window skipped: webui window not found");
        return;
    };
    if let Err(error) = window.reload() {
        log(&format!("failed to reload webui window: {error}"));
    }
}

/// Rewrites the window URL's `api` query parameter and reloads the page
/// there. Callers guarantee the address actually changed.
pub fn navigate_to_api_address(
    app_handle: &AppHandle,
    api_address: Option<&str>,
) -> Result<(), String> {
    let Some(window) = get_webui_window(app_handle) else {
        // Nothing to reload; the next launch embeds the new address.
        return Ok(());
    };

    let current = window
        .url()
        .map_err(|error| format!("Failed to read current webui url: {error}"))?;
    let updated = webui_url::with_api_address(&current, api_address);
    let updated_json =
        serde_json::to_string(updated.as_str()).unwrap_or_else(|_| "\"/\"".to_string());

    let js = format!("window.location.replace({updated_json});");
    window
        .eval(&js)
        .map_err(|error| format!("Failed to navigate webui window to new api address: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_window_size_keeps_sane_stored_values() {
        assert_eq!(clamp_window_size(1280.0, 720.0), (1280.0, 720.0));
    }

    #[test]
    fn clamp_window_size_replaces_degenerate_values() {
        assert_eq!(
            clamp_window_size(0.0, -5.0),
            (DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT)
        );
        assert_eq!(
            clamp_window_size(f64::NAN, f64::INFINITY),
            (DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT)
        );
    }
}

use tauri::AppHandle;

/// Keeps macOS dock presence in sync with window visibility. No-op on other
/// platforms.
#[cfg(target_os = "macos")]
pub fn set_dock_visible<F>(app_handle: &AppHandle, visible: bool, log: F)
where
    F: Fn(&str),
{
    use tauri::ActivationPolicy;

    let policy = if visible {
        ActivationPolicy::Regular
    } else {
        ActivationPolicy::Accessory
    };
    if let Err(error) = app_handle.set_activation_policy(policy) {
        log(&format!(
            "failed to set dock visibility to {visible}: {error}"
        ));
    }
}

#[cfg(not(target_os = "macos"))]
pub fn set_dock_visible<F>(_app_handle: &AppHandle, _visible: bool, _log: F)
where
    F: Fn(&str),
{
}

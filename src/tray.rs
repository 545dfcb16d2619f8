use tauri::{
    menu::{Menu, MenuItem, PredefinedMenuItem},
    tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
    AppHandle, Manager,
};

use crate::{
    append_shutdown_log, append_window_log, locale, settings_store::SettingsStore, webui_window,
    ShellState, DEFAULT_LOCALE, TRAY_ID, TRAY_MENU_QUIT, TRAY_MENU_RELOAD_WINDOW,
    TRAY_MENU_TOGGLE_WINDOW,
};

#[derive(Clone)]
pub struct TrayMenuState {
    toggle_item: MenuItem<tauri::Wry>,
    reload_item: MenuItem<tauri::Wry>,
    quit_item: MenuItem<tauri::Wry>,
}

pub fn setup_tray(app_handle: &AppHandle) -> Result<(), String> {
    let texts = resolve_tray_texts(app_handle);
    let toggle_label = if webui_window_visible(app_handle) {
        texts.tray_hide
    } else {
        texts.tray_open
    };

    let toggle_item = MenuItem::with_id(
        app_handle,
        TRAY_MENU_TOGGLE_WINDOW,
        toggle_label,
        true,
        None::<&str>,
    )
    .map_err(|error| format!("Failed to create tray toggle menu item: {error}"))?;
    let reload_item = MenuItem::with_id(
        app_handle,
        TRAY_MENU_RELOAD_WINDOW,
        texts.tray_reload,
        true,
        None::<&str>,
    )
    .map_err(|error| format!("Failed to create tray reload menu item: {error}"))?;
    let quit_item = MenuItem::with_id(app_handle, TRAY_MENU_QUIT, texts.tray_quit, true, None::<&str>)
        .map_err(|error| format!("Failed to create tray quit menu item: {error}"))?;
    let separator = PredefinedMenuItem::separator(app_handle)
        .map_err(|error| format!("Failed to create tray separator menu item: {error}"))?;

    let menu = Menu::with_items(app_handle, &[&toggle_item, &reload_item, &separator, &quit_item])
        .map_err(|error| format!("Failed to build tray menu: {error}"))?;

    if !app_handle.manage(TrayMenuState {
        toggle_item: toggle_item.clone(),
        reload_item: reload_item.clone(),
        quit_item: quit_item.clone(),
    }) {
        append_window_log("tray menu state already exists, skipping manage");
    }

    let tray_builder = TrayIconBuilder::with_id(TRAY_ID)
        .menu(&menu)
        .tooltip("IPFS Desktop")
        .icon(tauri::include_image!("./icons/tray.png"))
        .show_menu_on_left_click(false)
        .on_menu_event(|app, event| handle_tray_menu_event(app, event.id().as_ref()))
        .on_tray_icon_event(|tray, event| {
            if let TrayIconEvent::Click {
                button,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                update_tray_menu_labels(tray.app_handle());
                if button == MouseButton::Left {
                    webui_window::toggle_webui_window(tray.app_handle(), append_window_log);
                }
            }
        });

    #[cfg(target_os = "macos")]
    let tray_builder = tray_builder.icon_as_template(true);

    tray_builder
        .build(app_handle)
        .map_err(|error| format!("Failed to create tray icon: {error}"))?;

    update_tray_menu_labels(app_handle);
    Ok(())
}

pub fn handle_tray_menu_event(app_handle: &AppHandle, menu_id: &str) {
    match menu_id {
        TRAY_MENU_TOGGLE_WINDOW => {
            webui_window::toggle_webui_window(app_handle, append_window_log);
            update_tray_menu_labels(app_handle);
        }
        TRAY_MENU_RELOAD_WINDOW => {
            webui_window::reload_webui_window(app_handle, append_window_log)
        }
        TRAY_MENU_QUIT => {
            let state = app_handle.state::<ShellState>();
            state.request_watch_stop();
            append_shutdown_log("tray quit requested, exiting shell process");
            app_handle.exit(0);
        }
        _ => {}
    }
}

pub fn update_tray_menu_labels(app_handle: &AppHandle) {
    let Some(tray_state) = app_handle.try_state::<TrayMenuState>() else {
        return;
    };

    let texts = resolve_tray_texts(app_handle);
    let toggle_label = if webui_window_visible(app_handle) {
        texts.tray_hide
    } else {
        texts.tray_open
    };

    set_menu_text_safe(&tray_state.toggle_item, toggle_label, TRAY_MENU_TOGGLE_WINDOW);
    set_menu_text_safe(&tray_state.reload_item, texts.tray_reload, TRAY_MENU_RELOAD_WINDOW);
    set_menu_text_safe(&tray_state.quit_item, texts.tray_quit, TRAY_MENU_QUIT);
}

fn resolve_tray_texts(app_handle: &AppHandle) -> locale::ShellTexts {
    let store = app_handle.state::<SettingsStore>();
    let resolved = locale::resolve_locale(&store, DEFAULT_LOCALE, |message| {
        append_window_log(message)
    });
    locale::shell_texts_for_locale(&resolved)
}

fn webui_window_visible(app_handle: &AppHandle) -> bool {
    webui_window::get_webui_window(app_handle)
        .and_then(|window| window.is_visible().ok())
        .unwrap_or(false)
}

fn set_menu_text_safe(item: &MenuItem<tauri::Wry>, text: &str, item_name: &str) {
    if let Err(error) = item.set_text(text) {
        append_window_log(&format!(
            "failed to update tray menu text for {}: {}",
            item_name, error
        ));
    }
}

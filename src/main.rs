#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod bridge_commands;
mod config;
mod daemon;
mod daemon_http;
mod daemon_watch;
mod dock;
mod locale;
mod logging;
mod multiaddr;
mod origin_policy;
mod settings_store;
mod tray;
mod ui_dispatch;
mod webui_assets;
mod webui_protocol;
mod webui_url;
mod webui_window;

use std::{
    env,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, OnceLock,
    },
};

use tauri::{webview::PageLoadEvent, Manager, RunEvent, WindowEvent};

pub(crate) use settings_store::{SETTING_LAUNCH_AT_STARTUP, SETTING_LOCALE};

const WEBUI_WINDOW_LABEL: &str = "webui";
const DEFAULT_WINDOW_WIDTH: f64 = 1000.0;
const DEFAULT_WINDOW_HEIGHT: f64 = 600.0;
const MIN_WINDOW_WIDTH: f64 = 640.0;
const MIN_WINDOW_HEIGHT: f64 = 480.0;
const DEFAULT_ROUTE: &str = "/";
const DEFAULT_LOCALE: &str = "en-US";
const DAEMON_WATCH_INTERVAL_ENV: &str = "IPFS_DESKTOP_WATCH_INTERVAL_MS";
const DEFAULT_DAEMON_WATCH_INTERVAL_MS: u64 = 3_000;
const DAEMON_WATCH_INTERVAL_MIN_MS: u64 = 250;
const DAEMON_WATCH_INTERVAL_MAX_MS: u64 = 60_000;
const DAEMON_PING_TIMEOUT_ENV: &str = "IPFS_DESKTOP_PING_TIMEOUT_MS";
const DEFAULT_DAEMON_PING_TIMEOUT_MS: u64 = 800;
const DAEMON_PING_TIMEOUT_MIN_MS: u64 = 50;
const DAEMON_PING_TIMEOUT_MAX_MS: u64 = 30_000;
// API calls can stream large payloads; give proxied requests a long leash.
const DAEMON_PROXY_TIMEOUT_MS: u64 = 120_000;
const SHELL_LOG_FILE: &str = "desktop.log";
const SHELL_LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
const LOG_BACKUP_COUNT: usize = 5;
const TRAY_ID: &str = "ipfs-desktop-tray";
const TRAY_MENU_TOGGLE_WINDOW: &str = "tray_toggle_window";
const TRAY_MENU_RELOAD_WINDOW: &str = "tray_reload_window";
const TRAY_MENU_QUIT: &str = "tray_quit";

static SHELL_LOG_WRITE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Shared shell state: the last API multiaddress injected into the window
/// URL, the latest reachability verdict, and the watch-thread stop flag.
#[derive(Debug, Default)]
struct ShellState {
    last_api_address: Mutex<Option<String>>,
    daemon_running: AtomicBool,
    watch_stop: AtomicBool,
}

impl ShellState {
    fn known_api_address(&self) -> Option<String> {
        match self.last_api_address.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Remembers `address`, reporting whether it differs from the previous
    /// copy. Callers reload the window only on a change.
    fn remember_api_address(&self, address: Option<String>) -> bool {
        let mut guard = match self.last_api_address.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *guard == address {
            return false;
        }
        *guard = address;
        true
    }

    fn daemon_running(&self) -> bool {
        self.daemon_running.load(Ordering::Relaxed)
    }

    fn set_daemon_running(&self, running: bool) -> bool {
        self.daemon_running.swap(running, Ordering::Relaxed) != running
    }

    fn request_watch_stop(&self) {
        self.watch_stop.store(true, Ordering::Relaxed);
    }

    fn watch_stop_requested(&self) -> bool {
        self.watch_stop.load(Ordering::Relaxed)
    }
}

fn shell_root_dir() -> Option<PathBuf> {
    if let Ok(root) = env::var("IPFS_DESKTOP_ROOT") {
        let path = PathBuf::from(root.trim());
        if !path.as_os_str().is_empty() {
            return Some(path);
        }
    }
    home::home_dir().map(|home| home.join(".ipfs-desktop"))
}

fn append_shell_log_with_category(category: logging::ShellLogCategory, message: &str) {
    logging::append_shell_log(
        category,
        message,
        shell_root_dir(),
        SHELL_LOG_FILE,
        SHELL_LOG_MAX_BYTES,
        LOG_BACKUP_COUNT,
        &SHELL_LOG_WRITE_LOCK,
    )
}

fn append_startup_log(message: &str) {
    append_shell_log_with_category(logging::ShellLogCategory::Startup, message);
}

fn append_window_log(message: &str) {
    append_shell_log_with_category(logging::ShellLogCategory::Window, message);
}

fn append_daemon_log(message: &str) {
    append_shell_log_with_category(logging::ShellLogCategory::Daemon, message);
}

fn append_headers_log(message: &str) {
    append_shell_log_with_category(logging::ShellLogCategory::Headers, message);
}

fn append_shutdown_log(message: &str) {
    append_shell_log_with_category(logging::ShellLogCategory::Shutdown, message);
}

fn main() {
    append_startup_log("shell process starting");
    append_startup_log(&format!(
        "shell log path: {}",
        logging::resolve_shell_log_path(shell_root_dir(), SHELL_LOG_FILE).display()
    ));

    let shell_root = shell_root_dir().unwrap_or_else(|| env::temp_dir().join("ipfs-desktop"));

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .manage(settings_store::SettingsStore::new(&shell_root))
        .manage(ShellState::default())
        .register_uri_scheme_protocol("webui", |ctx, request| {
            webui_protocol::handle_webui_request(ctx.app_handle(), request)
        })
        .invoke_handler(tauri::generate_handler![
            bridge_commands::webui_bridge_is_desktop_runtime,
            bridge_commands::webui_bridge_get_daemon_status,
            bridge_commands::webui_bridge_get_settings,
            bridge_commands::webui_bridge_set_setting,
            bridge_commands::webui_bridge_open_external
        ])
        .on_window_event(|window, event| {
            if window.label() != WEBUI_WINDOW_LABEL {
                return;
            }

            match event {
                WindowEvent::Resized(size) => {
                    webui_window::persist_window_size(window.app_handle(), size);
                }
                WindowEvent::Destroyed => {
                    append_window_log("webui window destroyed");
                    dock::set_dock_visible(window.app_handle(), false, append_window_log);
                    tray::update_tray_menu_labels(window.app_handle());
                }
                _ => {}
            }
        })
        .on_page_load(|webview, payload| match payload.event() {
            PageLoadEvent::Started => {
                append_window_log(&format!("page-load started: {}", payload.url()));
            }
            PageLoadEvent::Finished => {
                append_window_log(&format!("page-load finished: {}", payload.url()));
                if webview.window().label() == WEBUI_WINDOW_LABEL {
                    if let Some(window) = webui_window::get_webui_window(webview.app_handle()) {
                        webui_window::show_window_when_ready(webview.app_handle(), &window);
                    }
                }
            }
        })
        .setup(|app| {
            let app_handle = app.handle().clone();
            if let Err(error) = tray::setup_tray(&app_handle) {
                append_startup_log(&format!("failed to initialize tray: {error}"));
            }
            if let Err(error) = webui_window::launch_webui_window(&app_handle, DEFAULT_ROUTE) {
                append_startup_log(&format!("failed to launch webui window: {error}"));
            }
            daemon_watch::spawn_daemon_watch(app_handle);
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            RunEvent::ExitRequested { code, api, .. } => {
                if code.is_none() {
                    // Last window closed; the shell stays resident in the tray.
                    api.prevent_exit();
                    append_window_log("webui window closed, shell stays in tray");
                    return;
                }
                let state = app_handle.state::<ShellState>();
                state.request_watch_stop();
                append_shutdown_log("exit requested, stopping daemon watch");
            }
            RunEvent::Exit => {
                append_shutdown_log("shell process exiting");
            }
            _ => {}
        });
}

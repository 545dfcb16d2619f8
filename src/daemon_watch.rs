use std::{thread, time::Duration};

use tauri::{AppHandle, Manager};

use crate::{
    append_daemon_log, config, daemon, ui_dispatch, webui_window, ShellState,
    DAEMON_PING_TIMEOUT_ENV, DAEMON_PING_TIMEOUT_MAX_MS, DAEMON_PING_TIMEOUT_MIN_MS,
    DAEMON_WATCH_INTERVAL_ENV, DAEMON_WATCH_INTERVAL_MAX_MS, DAEMON_WATCH_INTERVAL_MIN_MS,
    DEFAULT_DAEMON_PING_TIMEOUT_MS, DEFAULT_DAEMON_WATCH_INTERVAL_MS,
};

/// Watches the daemon's API address and reachability from a worker thread.
/// When the address changes, the webui URL is rebuilt and the page reloaded;
/// an unchanged address never triggers a reload.
pub fn spawn_daemon_watch(app_handle: AppHandle) {
    let config = config::resolve_daemon_watch_config(
        DAEMON_WATCH_INTERVAL_ENV,
        DEFAULT_DAEMON_WATCH_INTERVAL_MS,
        DAEMON_WATCH_INTERVAL_MIN_MS,
        DAEMON_WATCH_INTERVAL_MAX_MS,
        DAEMON_PING_TIMEOUT_ENV,
        DEFAULT_DAEMON_PING_TIMEOUT_MS,
        DAEMON_PING_TIMEOUT_MIN_MS,
        DAEMON_PING_TIMEOUT_MAX_MS,
        |message| append_daemon_log(&message),
    );
    append_daemon_log(&format!(
        "daemon watch started: poll_interval_ms={}, ping_timeout_ms={}",
        config.poll_interval_ms, config.ping_timeout_ms
    ));

    thread::spawn(move || loop {
        let state = app_handle.state::<ShellState>();
        if state.watch_stop_requested() {
            append_daemon_log("daemon watch stopped");
            break;
        }

        let status = daemon::probe_status(config.ping_timeout_ms, |message| {
            append_daemon_log(message)
        });

        if state.set_daemon_running(status.running) {
            append_daemon_log(if status.running {
                "daemon became reachable"
            } else {
                "daemon became unreachable"
            });
        }

        if state.remember_api_address(status.api_address.clone()) {
            append_daemon_log(&format!(
                "daemon api address changed: {}",
                status.api_address.as_deref().unwrap_or("<none>")
            ));
            let new_address = status.api_address.clone();
            if let Err(error) = ui_dispatch::run_on_main_thread_dispatch(
                &app_handle,
                "navigate webui to new api address",
                move |main_app| {
                    if let Err(navigate_error) =
                        webui_window::navigate_to_api_address(main_app, new_address.as_deref())
                    {
                        append_daemon_log(&navigate_error);
                    }
                },
            ) {
                append_daemon_log(&error);
            }
        }

        thread::sleep(Duration::from_millis(config.poll_interval_ms));
    });
}

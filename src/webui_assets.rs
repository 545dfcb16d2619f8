use std::{
    env, fs,
    path::{Component, Path, PathBuf},
};

use tauri::{path::BaseDirectory, AppHandle, Manager};

/// Resolves the directory holding the web UI dist. Probe order: explicit env
/// override, bundled resources, the repository `ui/` page for dev runs. Every
/// candidate must actually contain an `index.html`.
pub fn resolve_webui_dir<F>(app: &AppHandle, log: F) -> Option<PathBuf>
where
    F: Fn(&str),
{
    if let Ok(custom) = env::var("IPFS_DESKTOP_WEBUI_DIR") {
        let candidate = PathBuf::from(custom.trim());
        if candidate.join("index.html").is_file() {
            return Some(candidate);
        }
        log(&format!(
            "IPFS_DESKTOP_WEBUI_DIR has no index.html at {}, probing bundled webui",
            candidate.display()
        ));
    }

    if let Ok(resource_dir) = app.path().resolve("webui", BaseDirectory::Resource) {
        if resource_dir.join("index.html").is_file() {
            return Some(resource_dir);
        }
    }

    let dev_fallback = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("ui");
    if dev_fallback.join("index.html").is_file() {
        return Some(dev_fallback);
    }

    log("no webui directory found (env override, bundled resources, dev ui/)");
    None
}

/// Maps a request path onto a relative file path, rejecting anything that
/// could escape the webui directory. `/` maps to `index.html`.
pub fn sanitize_request_path(request_path: &str) -> Option<PathBuf> {
    let trimmed = request_path.trim_start_matches('/');
    if trimmed.is_empty() {
        return Some(PathBuf::from("index.html"));
    }

    let relative = Path::new(trimmed);
    for component in relative.components() {
        match component {
            Component::Normal(_) => {}
            _ => return None,
        }
    }
    Some(relative.to_path_buf())
}

/// Reads an asset below `webui_dir`. Extensionless misses fall back to
/// `index.html` so hash-routed pages deep-link correctly.
pub fn load_asset(webui_dir: &Path, request_path: &str) -> Option<(Vec<u8>, String)> {
    let relative = sanitize_request_path(request_path)?;
    let full_path = webui_dir.join(&relative);

    if full_path.is_file() {
        let mime = mime_guess::from_path(&full_path)
            .first_or_octet_stream()
            .to_string();
        return fs::read(&full_path).ok().map(|bytes| (bytes, mime));
    }

    if relative.extension().is_none() {
        let index = webui_dir.join("index.html");
        return fs::read(index)
            .ok()
            .map(|bytes| (bytes, "text/html".to_string()));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn webui_fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("create temp webui dir");
        fs::write(dir.path().join("index.html"), "<html>webui</html>").expect("write index");
        fs::create_dir_all(dir.path().join("static")).expect("create static dir");
        fs::write(dir.path().join("static").join("app.js"), "console.log(1)")
            .expect("write script");
        dir
    }

    #[test]
    fn sanitize_maps_root_to_index() {
        assert_eq!(sanitize_request_path("/"), Some(PathBuf::from("index.html")));
    }

    #[test]
    fn sanitize_rejects_parent_dir_traversal() {
        assert_eq!(sanitize_request_path("/../secret"), None);
        assert_eq!(sanitize_request_path("/static/../../secret"), None);
    }

    #[test]
    fn load_asset_serves_files_with_guessed_mime() {
        let dir = webui_fixture();
        let (bytes, mime) = load_asset(dir.path(), "/static/app.js").expect("load script");
        assert_eq!(bytes, b"console.log(1)");
        assert!(mime.contains("javascript"));
    }

    #[test]
    fn load_asset_falls_back_to_index_for_extensionless_misses() {
        let dir = webui_fixture();
        let (bytes, mime) = load_asset(dir.path(), "/files").expect("spa fallback");
        assert_eq!(bytes, b"<html>webui</html>");
        assert_eq!(mime, "text/html");
    }

    #[test]
    fn load_asset_misses_for_unknown_files_with_extension() {
        let dir = webui_fixture();
        assert!(load_asset(dir.path(), "/missing.png").is_none());
    }
}

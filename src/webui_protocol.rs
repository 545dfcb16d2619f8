use tauri::{
    http::{self, StatusCode},
    AppHandle, Manager,
};

use crate::{
    append_headers_log, daemon_http, multiaddr, origin_policy, webui_assets, ShellState,
    DAEMON_PROXY_TIMEOUT_MS,
};

/// Paths the embedded page addresses at the daemon rather than at the static
/// web UI bundle.
pub fn is_api_request(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

/// `path?query` request target forwarded to the daemon.
pub fn request_target(uri: &http::Uri) -> String {
    match uri.query() {
        Some(query) => format!("{}?{}", uri.path(), query),
        None => uri.path().to_string(),
    }
}

/// Response headers that must not be copied through the proxy hop. The body
/// is re-framed by the webview, so framing headers from the daemon would lie.
fn is_hop_header(name: &str) -> bool {
    name.eq_ignore_ascii_case("content-length")
        || name.eq_ignore_ascii_case("transfer-encoding")
        || name.eq_ignore_ascii_case("connection")
}

pub fn handle_webui_request(
    app: &AppHandle,
    request: http::Request<Vec<u8>>,
) -> http::Response<Vec<u8>> {
    let path = request.uri().path().to_string();
    if is_api_request(&path) {
        return proxy_api_request(app, request);
    }

    serve_asset(app, &path)
}

fn proxy_api_request(app: &AppHandle, request: http::Request<Vec<u8>>) -> http::Response<Vec<u8>> {
    let state = app.state::<ShellState>();
    let Some(api_address) = state.known_api_address() else {
        append_headers_log("api request dropped: daemon api address is not known yet");
        return error_response(
            StatusCode::BAD_GATEWAY,
            "Daemon API address is not known yet.",
        );
    };
    let Some(endpoint) = multiaddr::parse_api_multiaddr(&api_address) else {
        append_headers_log(&format!(
            "api request dropped: stored api address does not parse: {api_address}"
        ));
        return error_response(StatusCode::BAD_GATEWAY, "Daemon API address is unusable.");
    };

    let method = request.method().as_str().to_string();
    let target = request_target(request.uri());
    let content_type = request
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let origin = origin_policy::daemon_origin(Some(&api_address));
    let user_agent = origin_policy::shell_user_agent();
    let forwarded = daemon_http::forward_request(
        &endpoint,
        &method,
        &target,
        &origin,
        &user_agent,
        content_type.as_deref(),
        request.body(),
        DAEMON_PROXY_TIMEOUT_MS,
    );

    let Some(response) = forwarded else {
        append_headers_log(&format!(
            "daemon request failed: method={method}, target={target}, endpoint={}",
            endpoint.origin()
        ));
        return error_response(StatusCode::BAD_GATEWAY, "Daemon request failed.");
    };

    let mut headers: Vec<(String, String)> = response
        .headers
        .into_iter()
        .filter(|(name, _)| !is_hop_header(name))
        .collect();
    origin_policy::force_allow_origin(&mut headers);

    let mut builder = http::Response::builder().status(response.status);
    for (name, value) in &headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    match builder.body(response.body) {
        Ok(built) => built,
        Err(error) => {
            append_headers_log(&format!(
                "failed to rebuild daemon response: method={method}, target={target}, error={error}"
            ));
            error_response(StatusCode::BAD_GATEWAY, "Daemon response was unusable.")
        }
    }
}

fn serve_asset(app: &AppHandle, path: &str) -> http::Response<Vec<u8>> {
    let Some(webui_dir) = webui_assets::resolve_webui_dir(app, |message| {
        append_headers_log(message);
    }) else {
        return error_response(StatusCode::NOT_FOUND, "Web UI assets are unavailable.");
    };

    match webui_assets::load_asset(&webui_dir, path) {
        Some((body, mime)) => {
            let built = http::Response::builder()
                .status(StatusCode::OK)
                .header(http::header::CONTENT_TYPE, mime)
                .body(body);
            match built {
                Ok(response) => response,
                Err(error) => {
                    append_headers_log(&format!("failed to build asset response: {error}"));
                    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Asset response failed.")
                }
            }
        }
        None => error_response(StatusCode::NOT_FOUND, "Not found."),
    }
}

fn error_response(status: StatusCode, message: &str) -> http::Response<Vec<u8>> {
    let built = http::Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "text/plain")
        .header("Access-Control-Allow-Origin", origin_policy::page_origin())
        .body(message.as_bytes().to_vec());
    built.unwrap_or_else(|_| http::Response::new(message.as_bytes().to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_paths_are_routed_to_the_daemon() {
        assert!(is_api_request("/api"));
        assert!(is_api_request("/api/v0/id"));
        assert!(!is_api_request("/apis"));
        assert!(!is_api_request("/static/app.js"));
    }

    #[test]
    fn request_target_keeps_the_query_string() {
        let uri: http::Uri = "webui://localhost/api/v0/cat?arg=QmHash"
            .parse()
            .expect("parse uri");
        assert_eq!(request_target(&uri), "/api/v0/cat?arg=QmHash");
    }

    #[test]
    fn framing_headers_are_not_copied_through() {
        assert!(is_hop_header("Content-Length"));
        assert!(is_hop_header("transfer-encoding"));
        assert!(!is_hop_header("Content-Type"));
    }
}

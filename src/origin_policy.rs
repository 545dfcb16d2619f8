use crate::multiaddr;

/// Browser `Origin` literal meaning "no origin".
pub const NO_ORIGIN: &str = "null";

const ALLOW_ORIGIN_HEADER: &str = "Access-Control-Allow-Origin";

/// Origin the embedded page runs on. Custom schemes surface differently per
/// platform webview: wry maps them onto `http://<scheme>.localhost` on
/// Windows and keeps `<scheme>://localhost` elsewhere.
pub fn page_origin() -> &'static str {
    if cfg!(windows) {
        "http://webui.localhost"
    } else {
        "webui://localhost"
    }
}

/// `Origin` value for requests sent towards the daemon API: the HTTP origin
/// derived from its multiaddress, or the no-origin literal when no daemon
/// address is known.
pub fn daemon_origin(api_multiaddr: Option<&str>) -> String {
    api_multiaddr
        .and_then(multiaddr::parse_api_multiaddr)
        .map(|endpoint| endpoint.origin())
        .unwrap_or_else(|| NO_ORIGIN.to_string())
}

/// Descriptive client identifier attached to every request towards the
/// daemon.
pub fn shell_user_agent() -> String {
    format!("ipfs-desktop/{}", env!("CARGO_PKG_VERSION"))
}

/// Overwrites any `Access-Control-Allow-Origin` the daemon responded with so
/// the embedded page's own origin is always the one authorized, never the
/// upstream value.
pub fn force_allow_origin(headers: &mut Vec<(String, String)>) {
    headers.retain(|(name, _)| !name.eq_ignore_ascii_case(ALLOW_ORIGIN_HEADER));
    headers.push((ALLOW_ORIGIN_HEADER.to_string(), page_origin().to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daemon_origin_derives_http_origin_from_multiaddr() {
        assert_eq!(
            daemon_origin(Some("/ip4/127.0.0.1/tcp/5001")),
            "http://127.0.0.1:5001"
        );
    }

    #[test]
    fn daemon_origin_is_the_no_origin_literal_without_an_address() {
        assert_eq!(daemon_origin(None), NO_ORIGIN);
        assert_eq!(daemon_origin(Some("garbage")), NO_ORIGIN);
    }

    #[test]
    fn force_allow_origin_replaces_upstream_values() {
        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            (
                "access-control-allow-origin".to_string(),
                "http://127.0.0.1:5001".to_string(),
            ),
        ];
        force_allow_origin(&mut headers);

        let allow_values: Vec<&str> = headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("access-control-allow-origin"))
            .map(|(_, value)| value.as_str())
            .collect();
        assert_eq!(allow_values, vec![page_origin()]);
        assert!(headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("content-type")));
    }

    #[test]
    fn force_allow_origin_adds_the_header_when_upstream_omitted_it() {
        let mut headers = Vec::new();
        force_allow_origin(&mut headers);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].1, page_origin());
    }

    #[test]
    fn shell_user_agent_carries_the_crate_version() {
        assert!(shell_user_agent().starts_with("ipfs-desktop/"));
    }
}

/// HTTP endpoint derived from a daemon API multiaddress such as
/// `/ip4/127.0.0.1/tcp/5001` or `/dns4/localhost/tcp/5001/http`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    pub scheme: &'static str,
    pub host: String,
    pub port: u16,
    host_is_ipv6: bool,
}

impl ApiEndpoint {
    /// `host:port`, with IPv6 hosts bracketed.
    pub fn authority(&self) -> String {
        if self.host_is_ipv6 {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// scheme+host+port tuple in browser `Origin` form.
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.authority())
    }
}

/// Parses the subset of multiaddresses a daemon advertises for its HTTP API:
/// `/<ip4|ip6|dns|dns4|dns6|dnsaddr>/<host>/tcp/<port>[/http|/https]`.
pub fn parse_api_multiaddr(raw: &str) -> Option<ApiEndpoint> {
    let trimmed = raw.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.split('/').skip(1);
    let host_protocol = parts.next()?;
    let host = parts.next()?.to_string();
    if host.is_empty() {
        return None;
    }

    let host_is_ipv6 = match host_protocol {
        "ip4" => {
            host.parse::<std::net::Ipv4Addr>().ok()?;
            false
        }
        "ip6" => {
            host.parse::<std::net::Ipv6Addr>().ok()?;
            true
        }
        "dns" | "dns4" | "dns6" | "dnsaddr" => false,
        _ => return None,
    };

    if parts.next()? != "tcp" {
        return None;
    }
    let port = parts.next()?.parse::<u16>().ok()?;

    let scheme = match parts.next() {
        None | Some("") => "http",
        Some("http") => "http",
        Some("https") => "https",
        Some(_) => return None,
    };
    if parts.any(|segment| !segment.is_empty()) {
        return None;
    }

    Some(ApiEndpoint {
        scheme,
        host,
        port,
        host_is_ipv6,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_loopback_ip4_address() {
        let endpoint = parse_api_multiaddr("/ip4/127.0.0.1/tcp/5001").expect("parse ip4 addr");
        assert_eq!(endpoint.scheme, "http");
        assert_eq!(endpoint.host, "127.0.0.1");
        assert_eq!(endpoint.port, 5001);
        assert_eq!(endpoint.origin(), "http://127.0.0.1:5001");
    }

    #[test]
    fn parse_brackets_ip6_hosts_in_the_authority() {
        let endpoint = parse_api_multiaddr("/ip6/::1/tcp/5001").expect("parse ip6 addr");
        assert_eq!(endpoint.authority(), "[::1]:5001");
        assert_eq!(endpoint.origin(), "http://[::1]:5001");
    }

    #[test]
    fn parse_accepts_dns_hosts_and_https_suffix() {
        let endpoint =
            parse_api_multiaddr("/dns4/daemon.local/tcp/443/https").expect("parse dns addr");
        assert_eq!(endpoint.scheme, "https");
        assert_eq!(endpoint.origin(), "https://daemon.local:443");
    }

    #[test]
    fn parse_tolerates_surrounding_whitespace() {
        let endpoint = parse_api_multiaddr("  /ip4/127.0.0.1/tcp/5001\n").expect("parse trimmed");
        assert_eq!(endpoint.port, 5001);
    }

    #[test]
    fn parse_rejects_malformed_addresses() {
        assert_eq!(parse_api_multiaddr(""), None);
        assert_eq!(parse_api_multiaddr("127.0.0.1:5001"), None);
        assert_eq!(parse_api_multiaddr("/ip4/not-an-ip/tcp/5001"), None);
        assert_eq!(parse_api_multiaddr("/ip4/127.0.0.1/udp/5001"), None);
        assert_eq!(parse_api_multiaddr("/ip4/127.0.0.1/tcp/99999"), None);
        assert_eq!(parse_api_multiaddr("/ip4/127.0.0.1/tcp/5001/ws"), None);
    }
}

use std::{
    env, fs,
    net::{TcpStream, ToSocketAddrs},
    path::PathBuf,
    time::Duration,
};

use crate::multiaddr::{self, ApiEndpoint};

/// Snapshot of the daemon as seen from the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonStatus {
    pub running: bool,
    pub api_address: Option<String>,
}

/// Directory of the daemon's repository, holding the `api` file it writes on
/// startup.
pub fn daemon_repo_dir() -> Option<PathBuf> {
    if let Ok(custom) = env::var("IPFS_PATH") {
        let candidate = PathBuf::from(custom.trim());
        if !candidate.as_os_str().is_empty() {
            return Some(candidate);
        }
    }
    home::home_dir().map(|home| home.join(".ipfs"))
}

/// Current API multiaddress, if any: env override first, then the repo `api`
/// file. Addresses that do not parse are discarded.
pub fn discover_api_address<F>(log: F) -> Option<String>
where
    F: Fn(&str),
{
    if let Ok(custom) = env::var("IPFS_DESKTOP_API_ADDR") {
        let trimmed = custom.trim().to_string();
        if multiaddr::parse_api_multiaddr(&trimmed).is_some() {
            return Some(trimmed);
        }
        log(&format!(
            "IPFS_DESKTOP_API_ADDR is not a usable api multiaddress: {trimmed}"
        ));
    }

    let api_file = daemon_repo_dir()?.join("api");
    read_api_file(&api_file)
}

pub fn read_api_file(path: &std::path::Path) -> Option<String> {
    let raw = fs::read_to_string(path).ok()?;
    let trimmed = raw.trim().to_string();
    multiaddr::parse_api_multiaddr(&trimmed).map(|_| trimmed)
}

/// Bounded TCP connect against the API endpoint. Probes every resolved
/// address; any successful connect counts as reachable.
pub fn ping_endpoint(endpoint: &ApiEndpoint, timeout_ms: u64) -> bool {
    let timeout = Duration::from_millis(timeout_ms.max(50));
    let addrs = match (endpoint.host.as_str(), endpoint.port).to_socket_addrs() {
        Ok(addrs) => addrs.collect::<Vec<_>>(),
        Err(_) => return false,
    };
    addrs
        .iter()
        .any(|address| TcpStream::connect_timeout(address, timeout).is_ok())
}

pub fn ping_api_address(api_address: &str, timeout_ms: u64) -> bool {
    match multiaddr::parse_api_multiaddr(api_address) {
        Some(endpoint) => ping_endpoint(&endpoint, timeout_ms),
        None => false,
    }
}

pub fn probe_status<F>(ping_timeout_ms: u64, log: F) -> DaemonStatus
where
    F: Fn(&str),
{
    let api_address = discover_api_address(log);
    let running = api_address
        .as_deref()
        .map(|address| ping_api_address(address, ping_timeout_ms))
        .unwrap_or(false);

    DaemonStatus {
        running,
        api_address,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_api_file_accepts_a_valid_multiaddress() {
        let dir = tempfile::tempdir().expect("create temp repo dir");
        let api_path = dir.path().join("api");
        let mut file = fs::File::create(&api_path).expect("create api file");
        writeln!(file, "/ip4/127.0.0.1/tcp/5001").expect("write api file");

        assert_eq!(
            read_api_file(&api_path),
            Some("/ip4/127.0.0.1/tcp/5001".to_string())
        );
    }

    #[test]
    fn read_api_file_rejects_garbage_content() {
        let dir = tempfile::tempdir().expect("create temp repo dir");
        let api_path = dir.path().join("api");
        fs::write(&api_path, "http://127.0.0.1:5001").expect("write api file");

        assert_eq!(read_api_file(&api_path), None);
    }

    #[test]
    fn read_api_file_misses_when_the_file_is_absent() {
        let dir = tempfile::tempdir().expect("create temp repo dir");
        assert_eq!(read_api_file(&dir.path().join("api")), None);
    }

    #[test]
    fn ping_api_address_rejects_unparsable_addresses() {
        assert!(!ping_api_address("not-a-multiaddr", 100));
    }
}

use std::{
    borrow::Cow,
    io::{Read, Write},
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use crate::multiaddr::ApiEndpoint;

/// Parsed daemon response: status line code, header list in wire order, body
/// with any chunked transfer coding already removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Forwards one request to the daemon API over a short-lived HTTP/1.1
/// connection. `origin` and `user_agent` replace whatever the embedded page
/// sent; the connection always closes after the exchange.
pub fn forward_request(
    endpoint: &ApiEndpoint,
    method: &str,
    path_and_query: &str,
    origin: &str,
    user_agent: &str,
    content_type: Option<&str>,
    body: &[u8],
    timeout_ms: u64,
) -> Option<DaemonResponse> {
    let timeout = Duration::from_millis(timeout_ms.max(50));
    let addrs = (endpoint.host.as_str(), endpoint.port)
        .to_socket_addrs()
        .ok()?;
    let mut stream = addrs
        .into_iter()
        .find_map(|address| TcpStream::connect_timeout(&address, timeout).ok())?;
    let _ = stream.set_read_timeout(Some(timeout));
    let _ = stream.set_write_timeout(Some(timeout));

    let request_target = if path_and_query.is_empty() {
        "/"
    } else {
        path_and_query
    };
    let content_type_header = content_type
        .map(|value| format!("Content-Type: {value}\r\n"))
        .unwrap_or_default();
    let head = format!(
        "{method} {request_target} HTTP/1.1\r\n\
Host: {}\r\n\
Origin: {origin}\r\n\
User-Agent: {user_agent}\r\n\
Accept-Encoding: identity\r\n\
Connection: close\r\n\
{content_type_header}\
Content-Length: {}\r\n\
\r\n",
        endpoint.authority(),
        body.len()
    );

    if stream.write_all(head.as_bytes()).is_err() {
        return None;
    }
    if !body.is_empty() && stream.write_all(body).is_err() {
        return None;
    }

    let mut raw = Vec::new();
    if stream.read_to_end(&mut raw).is_err() {
        return None;
    }

    parse_response(&raw)
}

pub fn parse_response(raw: &[u8]) -> Option<DaemonResponse> {
    let (header_text, body_bytes) = parse_response_parts(raw)?;
    let status = parse_status_code(&header_text)?;
    let headers = parse_header_lines(&header_text);

    let is_chunked = headers.iter().any(|(name, value)| {
        name.eq_ignore_ascii_case("transfer-encoding")
            && value.to_ascii_lowercase().contains("chunked")
    });
    let body = if is_chunked {
        decode_chunked_body(body_bytes)?
    } else {
        body_bytes.to_vec()
    };

    Some(DaemonResponse {
        status,
        headers,
        body,
    })
}

fn parse_response_parts(raw: &[u8]) -> Option<(Cow<'_, str>, &[u8])> {
    let header_end = raw.windows(4).position(|window| window == b"\r\n\r\n")?;
    let (header_bytes, body_bytes) = raw.split_at(header_end + 4);
    Some((String::from_utf8_lossy(header_bytes), body_bytes))
}

fn parse_status_code(header_text: &str) -> Option<u16> {
    header_text
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse::<u16>().ok())
}

fn parse_header_lines(header_text: &str) -> Vec<(String, String)> {
    header_text
        .lines()
        .skip(1)
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

fn decode_chunked_body(mut input: &[u8]) -> Option<Vec<u8>> {
    let mut output = Vec::new();

    loop {
        let header_end = input.windows(2).position(|window| window == b"\r\n")?;
        let chunk_size_line = std::str::from_utf8(&input[..header_end]).ok()?;
        let chunk_size_hex = chunk_size_line.split(';').next()?.trim();
        let chunk_size = usize::from_str_radix(chunk_size_hex, 16).ok()?;
        input = &input[header_end + 2..];

        if chunk_size == 0 {
            return Some(output);
        }
        if input.len() < chunk_size + 2 {
            return None;
        }

        output.extend_from_slice(&input[..chunk_size]);
        if &input[chunk_size..chunk_size + 2] != b"\r\n" {
            return None;
        }
        input = &input[chunk_size + 2..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_response_extracts_status_headers_and_body() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nX-Upstream: daemon\r\n\r\n{\"ok\":true}";
        let response = parse_response(raw).expect("parse response");
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"{\"ok\":true}");
        assert!(response
            .headers
            .contains(&("Content-Type".to_string(), "application/json".to_string())));
        assert!(response
            .headers
            .contains(&("X-Upstream".to_string(), "daemon".to_string())));
    }

    #[test]
    fn parse_response_decodes_chunked_bodies() {
        let raw =
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nb\r\n{\"ok\":true}\r\n0\r\n\r\n";
        let response = parse_response(raw).expect("parse chunked response");
        assert_eq!(response.body, b"{\"ok\":true}");
    }

    #[test]
    fn parse_response_keeps_non_success_statuses() {
        let raw = b"HTTP/1.1 403 Forbidden\r\nContent-Length: 0\r\n\r\n";
        let response = parse_response(raw).expect("parse response");
        assert_eq!(response.status, 403);
        assert!(response.body.is_empty());
    }

    #[test]
    fn parse_response_rejects_truncated_chunked_payloads() {
        let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nabcde";
        assert!(parse_response(raw).is_none());
    }

    #[test]
    fn parse_response_rejects_missing_header_terminator() {
        assert!(parse_response(b"HTTP/1.1 200 OK\r\n").is_none());
    }
}

use std::env;

pub fn parse_clamped_ms_env<F>(
    raw: &str,
    env_name: &str,
    fallback_ms: u64,
    min_ms: u64,
    max_ms: u64,
    mut log: F,
) -> u64
where
    F: FnMut(String),
{
    match raw.trim().parse::<u128>() {
        Ok(parsed) if parsed > 0 => {
            if parsed < min_ms as u128 {
                log(format!(
                    "{}='{}' is below minimum {}ms, clamped to {}ms",
                    env_name, raw, min_ms, min_ms
                ));
                min_ms
            } else if parsed > max_ms as u128 {
                log(format!(
                    "{}='{}' is above maximum {}ms, clamped to {}ms",
                    env_name, raw, max_ms, max_ms
                ));
                max_ms
            } else {
                parsed as u64
            }
        }
        _ => {
            log(format!(
                "invalid {}='{}', fallback to {}ms",
                env_name, raw, fallback_ms
            ));
            fallback_ms
        }
    }
}

pub fn resolve_ms_env<F>(
    env_name: &str,
    fallback_ms: u64,
    min_ms: u64,
    max_ms: u64,
    mut log: F,
) -> u64
where
    F: FnMut(String),
{
    match env::var(env_name) {
        Ok(raw) => parse_clamped_ms_env(&raw, env_name, fallback_ms, min_ms, max_ms, &mut log),
        Err(_) => fallback_ms,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DaemonWatchConfig {
    pub poll_interval_ms: u64,
    pub ping_timeout_ms: u64,
}

#[allow(clippy::too_many_arguments)]
pub fn resolve_daemon_watch_config<F>(
    poll_interval_env: &str,
    poll_interval_fallback_ms: u64,
    poll_interval_min_ms: u64,
    poll_interval_max_ms: u64,
    ping_timeout_env: &str,
    ping_timeout_fallback_ms: u64,
    ping_timeout_min_ms: u64,
    ping_timeout_max_ms: u64,
    mut log: F,
) -> DaemonWatchConfig
where
    F: FnMut(String),
{
    let poll_interval_ms = resolve_ms_env(
        poll_interval_env,
        poll_interval_fallback_ms,
        poll_interval_min_ms,
        poll_interval_max_ms,
        &mut log,
    );
    let ping_timeout_ms = resolve_ms_env(
        ping_timeout_env,
        ping_timeout_fallback_ms,
        ping_timeout_min_ms,
        ping_timeout_max_ms,
        &mut log,
    );

    DaemonWatchConfig {
        poll_interval_ms,
        ping_timeout_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_clamped_ms_returns_value_in_range() {
        let value = parse_clamped_ms_env("1200", "TEST_ENV", 500, 100, 5_000, |_| {});
        assert_eq!(value, 1200);
    }

    #[test]
    fn parse_clamped_ms_clamps_too_small_value() {
        let mut logs = Vec::new();
        let value =
            parse_clamped_ms_env("20", "TEST_ENV", 500, 100, 5_000, |message| logs.push(message));
        assert_eq!(value, 100);
        assert!(logs.iter().any(|line| line.contains("below minimum")));
    }

    #[test]
    fn parse_clamped_ms_clamps_too_large_value() {
        let value = parse_clamped_ms_env("99999", "TEST_ENV", 500, 100, 3_000, |_| {});
        assert_eq!(value, 3_000);
    }

    #[test]
    fn parse_clamped_ms_falls_back_on_invalid_value() {
        let mut logs = Vec::new();
        let value = parse_clamped_ms_env("invalid", "TEST_ENV", 500, 100, 5_000, |message| {
            logs.push(message)
        });
        assert_eq!(value, 500);
        assert!(logs.iter().any(|line| line.contains("invalid TEST_ENV")));
    }

    #[test]
    fn resolve_daemon_watch_config_uses_fallbacks_when_env_missing() {
        let config = resolve_daemon_watch_config(
            "TEST_WATCH_POLL_ENV_MISSING",
            3_000,
            250,
            60_000,
            "TEST_WATCH_PING_ENV_MISSING",
            800,
            50,
            30_000,
            |_| {},
        );
        assert_eq!(config.poll_interval_ms, 3_000);
        assert_eq!(config.ping_timeout_ms, 800);
    }
}

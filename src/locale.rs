use std::env;

use crate::settings_store::SettingsStore;

#[derive(Debug, Clone, Copy)]
pub struct ShellTexts {
    pub tray_open: &'static str,
    pub tray_hide: &'static str,
    pub tray_reload: &'static str,
    pub tray_quit: &'static str,
}

pub fn shell_texts_for_locale(locale: &str) -> ShellTexts {
    if locale.to_ascii_lowercase().starts_with("zh") {
        return ShellTexts {
            tray_open: "打开 IPFS Desktop",
            tray_hide: "隐藏 IPFS Desktop",
            tray_reload: "重新加载",
            tray_quit: "退出",
        };
    }

    ShellTexts {
        tray_open: "Open IPFS Desktop",
        tray_hide: "Hide IPFS Desktop",
        tray_reload: "Reload",
        tray_quit: "Quit",
    }
}

/// Normalizes `en_US.UTF-8` style tags into `en-US` form. Returns `None` for
/// values that do not look like a locale tag.
pub fn normalize_locale(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "C" || raw == "POSIX" {
        return None;
    }

    let tag = raw.split(['.', '@']).next().unwrap_or(raw);
    let mut parts = tag.split(['-', '_']);
    let language = parts.next().filter(|part| {
        (2..=3).contains(&part.len()) && part.chars().all(|ch| ch.is_ascii_alphabetic())
    })?;
    let region = parts.next().filter(|part| {
        part.len() == 2 && part.chars().all(|ch| ch.is_ascii_alphabetic())
    });

    let mut normalized = language.to_ascii_lowercase();
    if let Some(region) = region {
        normalized.push('-');
        normalized.push_str(&region.to_ascii_uppercase());
    }
    Some(normalized)
}

pub fn resolve_locale<F>(store: &SettingsStore, default_locale: &str, log: F) -> String
where
    F: Fn(&str),
{
    if let Some(locale) = store.locale(&log).as_deref().and_then(normalize_locale) {
        return locale;
    }

    for env_key in ["IPFS_DESKTOP_LOCALE", "LC_ALL", "LANG"] {
        if let Ok(value) = env::var(env_key) {
            if let Some(locale) = normalize_locale(&value) {
                return locale;
            }
        }
    }

    default_locale.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_locale_accepts_posix_style_tags() {
        assert_eq!(normalize_locale("en_US.UTF-8"), Some("en-US".to_string()));
        assert_eq!(normalize_locale("zh_CN"), Some("zh-CN".to_string()));
        assert_eq!(normalize_locale("fr-fr"), Some("fr-FR".to_string()));
    }

    #[test]
    fn normalize_locale_keeps_bare_language_tags() {
        assert_eq!(normalize_locale("de"), Some("de".to_string()));
    }

    #[test]
    fn normalize_locale_rejects_non_locale_values() {
        assert_eq!(normalize_locale(""), None);
        assert_eq!(normalize_locale("C"), None);
        assert_eq!(normalize_locale("1234"), None);
    }

    #[test]
    fn shell_texts_pick_chinese_copy_for_zh_tags() {
        let texts = shell_texts_for_locale("zh-CN");
        assert_eq!(texts.tray_quit, "退出");
    }

    #[test]
    fn shell_texts_fall_back_to_english_copy() {
        let texts = shell_texts_for_locale("pt-BR");
        assert_eq!(texts.tray_open, "Open IPFS Desktop");
        assert_eq!(texts.tray_quit, "Quit");
    }
}

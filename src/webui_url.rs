use url::Url;

use crate::origin_policy;

pub const API_QUERY_PARAM: &str = "api";
pub const LOCALE_QUERY_PARAM: &str = "lng";
pub const DEVICE_ID_QUERY_PARAM: &str = "device-id";

/// Connection parameters the embedded page reads from its own URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebuiUrlParams {
    pub api_address: Option<String>,
    pub locale: String,
    pub device_id: String,
    pub route: String,
}

/// Builds the webui URL: connection parameters in the query string, the
/// in-app navigation path in the hash fragment.
pub fn build_webui_url(params: &WebuiUrlParams) -> Result<Url, String> {
    let base = format!("{}/", origin_policy::page_origin());
    let mut url = Url::parse(&base)
        .map_err(|error| format!("Failed to parse webui base url {base}: {error}"))?;

    {
        let mut query = url.query_pairs_mut();
        if let Some(api_address) = params.api_address.as_deref() {
            query.append_pair(API_QUERY_PARAM, api_address);
        }
        query.append_pair(LOCALE_QUERY_PARAM, &params.locale);
        query.append_pair(DEVICE_ID_QUERY_PARAM, &params.device_id);
    }
    url.set_fragment(Some(&normalize_route(&params.route)));

    Ok(url)
}

/// Same URL with the `api` query parameter swapped for `new_api_address`,
/// everything else untouched.
pub fn with_api_address(url: &Url, new_api_address: Option<&str>) -> Url {
    let mut updated = url.clone();
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| name.as_ref() != API_QUERY_PARAM)
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    updated.set_query(None);
    {
        let mut query = updated.query_pairs_mut();
        if let Some(api_address) = new_api_address {
            query.append_pair(API_QUERY_PARAM, api_address);
        }
        for (name, value) in &retained {
            query.append_pair(name, value);
        }
    }
    updated
}

fn normalize_route(route: &str) -> String {
    let trimmed = route.trim();
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(api: Option<&str>) -> WebuiUrlParams {
        WebuiUrlParams {
            api_address: api.map(str::to_string),
            locale: "en-US".to_string(),
            device_id: "device-1234".to_string(),
            route: "files".to_string(),
        }
    }

    #[test]
    fn build_injects_api_locale_and_device_id_query_params() {
        let url = build_webui_url(&params(Some("/ip4/127.0.0.1/tcp/5001"))).expect("build url");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();

        assert!(pairs.contains(&("api".to_string(), "/ip4/127.0.0.1/tcp/5001".to_string())));
        assert!(pairs.contains(&("lng".to_string(), "en-US".to_string())));
        assert!(pairs.contains(&("device-id".to_string(), "device-1234".to_string())));
    }

    #[test]
    fn build_omits_the_api_param_when_no_daemon_address_is_known() {
        let url = build_webui_url(&params(None)).expect("build url");
        assert!(url.query_pairs().all(|(name, _)| name != "api"));
    }

    #[test]
    fn build_places_the_route_in_the_hash_fragment() {
        let url = build_webui_url(&params(None)).expect("build url");
        assert_eq!(url.fragment(), Some("/files"));
    }

    #[test]
    fn with_api_address_swaps_only_the_api_param() {
        let original = build_webui_url(&params(Some("/ip4/127.0.0.1/tcp/5001"))).expect("build");
        let updated = with_api_address(&original, Some("/ip4/127.0.0.1/tcp/5002"));

        let api: Vec<String> = updated
            .query_pairs()
            .filter(|(name, _)| name.as_ref() == "api")
            .map(|(_, value)| value.into_owned())
            .collect();
        assert_eq!(api, vec!["/ip4/127.0.0.1/tcp/5002".to_string()]);
        assert!(updated
            .query_pairs()
            .any(|(name, value)| name == "lng" && value == "en-US"));
        assert_eq!(updated.fragment(), original.fragment());
    }

    #[test]
    fn with_api_address_can_drop_the_api_param() {
        let original = build_webui_url(&params(Some("/ip4/127.0.0.1/tcp/5001"))).expect("build");
        let updated = with_api_address(&original, None);
        assert!(updated.query_pairs().all(|(name, _)| name != "api"));
    }
}

//! URL cleanup for brief output

use url::Url;

/// Query parameters stripped from every URL surfaced in a brief.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_cid",
    "mc_eid",
];

/// Remove known tracking parameters from a URL, preserving the path, the
/// fragment, and every other query parameter in its original order. Strings
/// that do not parse as URLs pass through unchanged.
pub fn clean_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.to_ascii_lowercase().as_str()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        pairs.extend_pairs(kept);
    }

    url.to_string()
}

/// Display host for a URL: the hostname with a leading `www.` stripped.
/// Falls back to a best-effort split for strings the parser rejects.
pub fn hostname(raw: &str) -> String {
    if let Ok(url) = Url::parse(raw) {
        if let Some(host) = url.host_str() {
            return host.strip_prefix("www.").unwrap_or(host).to_string();
        }
    }

    let stripped = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"))
        .unwrap_or(raw);
    stripped.split('/').next().unwrap_or_default().to_string()
}

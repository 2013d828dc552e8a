use url::Url;

use crate::error::AnalyzeError;

/// Normalize an address for use as a cache key.
///
/// Only a single trailing slash is removed; everything else is kept verbatim
/// so that distinct addresses never collapse onto the same entry.
pub fn normalize_cache_key(input: &str) -> String {
    input.strip_suffix('/').unwrap_or(input).to_string()
}

/// Parse a caller-supplied address and require an http(s) scheme and a host.
pub fn parse_target(input: &str) -> Result<Url, AnalyzeError> {
    let parsed = Url::parse(input.trim())
        .map_err(|e| AnalyzeError::InvalidAddress(format!("{input}: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AnalyzeError::InvalidAddress(format!(
            "{input}: scheme must be http or https"
        )));
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(AnalyzeError::InvalidAddress(format!("{input}: missing host"))),
    }
}

/// Resolve `href` against `base`, leaving it untouched when either side
/// cannot be parsed.
pub fn resolve_against(base: Option<&str>, href: &str) -> String {
    base.and_then(|b| Url::parse(b).ok())
        .and_then(|b| b.join(href).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| href.to_string())
}

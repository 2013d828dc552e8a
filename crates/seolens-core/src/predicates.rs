//! Named predicates used by the analyzer and the fetcher
//!
//! Each function is pure and total, so matching rules can be tested in
//! isolation from document parsing and networking.

use once_cell::sync::Lazy;
use regex::Regex;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// `value` equals `expected`, ignoring ASCII case. A missing value never matches.
pub fn attr_equals(value: Option<&str>, expected: &str) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case(expected))
}

/// `value` starts with `prefix`, ignoring ASCII case.
pub fn attr_has_prefix(value: Option<&str>, prefix: &str) -> bool {
    value.is_some_and(|v| {
        v.len() >= prefix.len()
            && v.is_char_boundary(prefix.len())
            && v[..prefix.len()].eq_ignore_ascii_case(prefix)
    })
}

/// `value` contains `needle` anywhere, ignoring ASCII case.
pub fn attr_contains(value: Option<&str>, needle: &str) -> bool {
    value.is_some_and(|v| {
        v.to_ascii_lowercase()
            .contains(&needle.to_ascii_lowercase())
    })
}

/// A `<script type>` that carries JSON-LD, including parameterised forms
/// such as `application/ld+json; charset=utf-8`.
pub fn is_json_ld_script_type(type_attr: Option<&str>) -> bool {
    attr_contains(type_attr, "application/ld+json")
}

/// A `<link rel>` value naming the canonical address.
pub fn is_canonical_rel(rel: Option<&str>) -> bool {
    attr_contains(rel, "canonical")
}

/// A `<meta name>` that carries crawler directives.
pub fn is_robots_meta_name(name: Option<&str>) -> bool {
    attr_equals(name, "robots") || attr_equals(name, "googlebot")
}

/// A response `Content-Type` the analyzer accepts.
pub fn is_html_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("html")
}

/// The `charset` parameter of a `Content-Type` header, if declared.
pub fn charset_from_content_type(content_type: &str) -> Option<&str> {
    static RE_CHARSET: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"(?i)charset\s*=\s*"?([^";\s]+)"#).expect("invalid charset regex")
    });

    RE_CHARSET
        .captures(content_type)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

const RESERVED_V4: &[(Ipv4Addr, u32)] = &[
    (Ipv4Addr::new(0, 0, 0, 0), 8),
    (Ipv4Addr::new(127, 0, 0, 0), 8),
    (Ipv4Addr::new(10, 0, 0, 0), 8),
    (Ipv4Addr::new(172, 16, 0, 0), 12),
    (Ipv4Addr::new(192, 168, 0, 0), 16),
    (Ipv4Addr::new(169, 254, 0, 0), 16),
];

const RESERVED_V6: &[(Ipv6Addr, u32)] = &[
    (Ipv6Addr::LOCALHOST, 128),
    (Ipv6Addr::UNSPECIFIED, 128),
    (Ipv6Addr::new(0xfc00, 0, 0, 0, 0, 0, 0, 0), 7),
    (Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0), 10),
];

/// Whether `addr` lies in a loopback, private, link-local, unique-local or
/// unspecified range. IPv4-mapped IPv6 addresses are judged by their IPv4 form.
pub fn is_reserved_address(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => is_reserved_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_reserved_v4(v4),
            None => RESERVED_V6.iter().any(|(net, prefix)| {
                let mask = u128::MAX.checked_shl(128 - prefix).unwrap_or(0);
                u128::from(v6) & mask == u128::from(*net) & mask
            }),
        },
    }
}

fn is_reserved_v4(addr: Ipv4Addr) -> bool {
    RESERVED_V4.iter().any(|(net, prefix)| {
        let mask = u32::MAX.checked_shl(32 - prefix).unwrap_or(0);
        u32::from(addr) & mask == u32::from(*net) & mask
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_equals_ignores_case() {
        assert!(attr_equals(Some("Description"), "description"));
        assert!(!attr_equals(Some("description "), "description"));
        assert!(!attr_equals(None, "description"));
    }

    #[test]
    fn attr_prefix_matching() {
        assert!(attr_has_prefix(Some("OG:title"), "og:"));
        assert!(attr_has_prefix(Some("twitter:card"), "twitter:"));
        assert!(!attr_has_prefix(Some("og"), "og:"));
        assert!(!attr_has_prefix(Some("xog:title"), "og:"));
        // multi-byte input shorter than the prefix boundary must not panic
        assert!(!attr_has_prefix(Some("ög"), "og:"));
    }

    #[test]
    fn json_ld_type_variants() {
        assert!(is_json_ld_script_type(Some("application/ld+json")));
        assert!(is_json_ld_script_type(Some("APPLICATION/LD+JSON")));
        assert!(is_json_ld_script_type(Some("application/ld+json; charset=utf-8")));
        assert!(!is_json_ld_script_type(Some("application/json")));
        assert!(!is_json_ld_script_type(None));
    }

    #[test]
    fn canonical_and_robots_names() {
        assert!(is_canonical_rel(Some("Canonical")));
        assert!(is_canonical_rel(Some("alternate canonical")));
        assert!(!is_canonical_rel(Some("alternate")));
        assert!(is_robots_meta_name(Some("GoogleBot")));
        assert!(is_robots_meta_name(Some("ROBOTS")));
        assert!(!is_robots_meta_name(Some("bingbot")));
    }

    #[test]
    fn html_content_types() {
        assert!(is_html_content_type("text/html; charset=utf-8"));
        assert!(is_html_content_type("application/xhtml+xml"));
        assert!(!is_html_content_type("application/json"));
    }

    #[test]
    fn charset_extraction() {
        assert_eq!(
            charset_from_content_type("text/html; charset=ISO-8859-1"),
            Some("ISO-8859-1")
        );
        assert_eq!(
            charset_from_content_type(r#"text/html; Charset="utf-8""#),
            Some("utf-8")
        );
        assert_eq!(charset_from_content_type("text/html"), None);
    }

    #[test]
    fn reserved_ipv4_ranges() {
        for blocked in [
            "127.0.0.1",
            "127.255.0.9",
            "10.0.0.5",
            "172.16.0.1",
            "172.31.255.255",
            "192.168.1.1",
            "169.254.169.254",
            "0.0.0.0",
        ] {
            let ip: IpAddr = blocked.parse().unwrap();
            assert!(is_reserved_address(ip), "{blocked} should be reserved");
        }

        for allowed in ["8.8.8.8", "1.1.1.1", "172.32.0.1", "93.184.216.34"] {
            let ip: IpAddr = allowed.parse().unwrap();
            assert!(!is_reserved_address(ip), "{allowed} should be public");
        }
    }

    #[test]
    fn reserved_ipv6_ranges() {
        for blocked in ["::1", "::", "fc00::1", "fd12:3456::1", "fe80::1", "::ffff:10.0.0.1"] {
            let ip: IpAddr = blocked.parse().unwrap();
            assert!(is_reserved_address(ip), "{blocked} should be reserved");
        }

        for allowed in ["2606:4700::1111", "2001:db8::1", "::ffff:8.8.8.8"] {
            let ip: IpAddr = allowed.parse().unwrap();
            assert!(!is_reserved_address(ip), "{allowed} should be public");
        }
    }
}

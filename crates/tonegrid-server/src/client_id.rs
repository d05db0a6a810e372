//! Client identity for admission control.
//!
//! Proxy headers in order: first entry of `x-forwarded-for`, then
//! `x-real-ip`, then `cf-connecting-ip`. Without any of them every caller
//! shares the `"unknown"` bucket.

use axum::http::HeaderMap;

use crate::constants::UNKNOWN_CLIENT;

pub fn client_id(headers: &HeaderMap) -> String {
    if let Some(forwarded) = header_str(headers, "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').next().map(str::trim).filter(|s| !s.is_empty()) {
            return first.to_string();
        }
    }

    for name in ["x-real-ip", "cf-connecting-ip"] {
        if let Some(value) = header_str(headers, name).map(str::trim).filter(|s| !s.is_empty()) {
            return value.to_string();
        }
    }

    UNKNOWN_CLIENT.to_string()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_forwarded_for_first_entry() {
        let h = headers(&[("x-forwarded-for", " 203.0.113.7 , 10.0.0.1"), ("x-real-ip", "10.0.0.2")]);
        assert_eq!(client_id(&h), "203.0.113.7");
    }

    #[test]
    fn test_fallback_order() {
        let h = headers(&[("x-real-ip", "10.0.0.2"), ("cf-connecting-ip", "10.0.0.3")]);
        assert_eq!(client_id(&h), "10.0.0.2");

        let h = headers(&[("cf-connecting-ip", "10.0.0.3")]);
        assert_eq!(client_id(&h), "10.0.0.3");
    }

    #[test]
    fn test_unknown() {
        assert_eq!(client_id(&HeaderMap::new()), "unknown");
        assert_eq!(client_id(&headers(&[("x-forwarded-for", "")])), "unknown");
    }
}

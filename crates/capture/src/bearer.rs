use std::sync::OnceLock;

use regex::Regex;

use crate::HeaderEntry;

/// Returns the credential after a case-insensitive `Bearer` scheme, verbatim.
pub fn extract_bearer(header_value: &str) -> Option<&str> {
    static BEARER: OnceLock<Regex> = OnceLock::new();
    let bearer = BEARER.get_or_init(|| Regex::new(r"(?i)^Bearer\s+(.+)$").expect("bearer pattern should be valid"));

    bearer
        .captures(header_value)
        .and_then(|captures| captures.get(1))
        .map(|credential| credential.as_str())
}

/// Finds the first `Authorization` header, ignoring name casing.
pub fn find_auth_header(headers: &[HeaderEntry]) -> Option<&str> {
    headers
        .iter()
        .find(|header| header.name.eq_ignore_ascii_case(http::header::AUTHORIZATION.as_str()))
        .map(|header| header.value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(extract_bearer("Bearer a.b.c"), Some("a.b.c"));
        assert_eq!(extract_bearer("bearer a.b.c"), Some("a.b.c"));
        assert_eq!(extract_bearer("BEARER a.b.c"), Some("a.b.c"));
    }

    #[test]
    fn any_whitespace_run_separates() {
        assert_eq!(extract_bearer("Bearer   a.b.c"), Some("a.b.c"));
        assert_eq!(extract_bearer("Bearer\ta.b.c"), Some("a.b.c"));
    }

    #[test]
    fn remainder_is_verbatim() {
        assert_eq!(extract_bearer("Bearer a.b.c trailing "), Some("a.b.c trailing "));
    }

    #[test]
    fn rejects_other_schemes() {
        assert_eq!(extract_bearer("Basic dXNlcg=="), None);
        assert_eq!(extract_bearer("Bearer"), None);
        assert_eq!(extract_bearer("Bearer "), None);
        assert_eq!(extract_bearer("Bearera.b.c"), None);
        assert_eq!(extract_bearer(" Bearer a.b.c"), None);
    }

    #[test]
    fn header_lookup_ignores_case() {
        let headers = vec![
            HeaderEntry::new("Accept", "*/*"),
            HeaderEntry::new("AUTHORIZATION", "Bearer first"),
            HeaderEntry::new("authorization", "Bearer second"),
        ];

        assert_eq!(find_auth_header(&headers), Some("Bearer first"));
        assert_eq!(find_auth_header(&headers[..1]), None);
    }
}

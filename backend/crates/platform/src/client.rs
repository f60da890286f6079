//! Client identification utilities
//!
//! Common functions for identifying callers via HTTP headers.

use axum::http::HeaderMap;

/// Header carrying the caller identity resolved by the upstream auth layer
pub const USER_ID_HEADER: &str = "x-user-id";

/// Key shared by every caller without an identity
pub const ANONYMOUS_KEY: &str = "anonymous";

/// Maximum accepted length of a user identifier
const MAX_USER_ID_LEN: usize = 128;

/// Extract the caller's user id from request headers
///
/// Returns `None` when the header is missing, not valid UTF-8, blank,
/// or longer than 128 bytes.
pub fn extract_user_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(USER_ID_HEADER)?.to_str().ok()?.trim();
    if value.is_empty() || value.len() > MAX_USER_ID_LEN {
        return None;
    }
    Some(value.to_string())
}

/// Rate limit key for an optional user id
///
/// All callers without a user id share the single [`ANONYMOUS_KEY`] bucket.
pub fn rate_limit_key(user_id: Option<&str>) -> &str {
    user_id.unwrap_or(ANONYMOUS_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_user_id() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("  user-42 "));
        assert_eq!(extract_user_id(&headers), Some("user-42".to_string()));
    }

    #[test]
    fn test_extract_user_id_missing_or_blank() {
        let headers = HeaderMap::new();
        assert_eq!(extract_user_id(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("   "));
        assert_eq!(extract_user_id(&headers), None);
    }

    #[test]
    fn test_extract_user_id_too_long() {
        let mut headers = HeaderMap::new();
        let long = "u".repeat(MAX_USER_ID_LEN + 1);
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(&long).unwrap());
        assert_eq!(extract_user_id(&headers), None);
    }

    #[test]
    fn test_rate_limit_key() {
        assert_eq!(rate_limit_key(Some("user-1")), "user-1");
        assert_eq!(rate_limit_key(None), "anonymous");
    }
}

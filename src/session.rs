//! Session issuer: mints and reads the login cookie.
//!
//! The cookie carries the bare identity with no signature, expiry or
//! server-side session table. That keeps the issuer stateless and the
//! artifact derivable from the request alone, at the cost of being a
//! minimal-trust placeholder rather than a production session scheme.

use axum::http::{HeaderMap, HeaderValue};

pub const SESSION_COOKIE: &str = "session";

/// Build the `Set-Cookie` header value binding a session to `identity`.
///
/// HttpOnly keeps the artifact away from page scripts, `Path=/` scopes it to
/// the whole site and `SameSite=Lax` limits cross-site sends. Returns `None`
/// when the identity cannot be carried in a header value.
pub fn issue(identity: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/",
        SESSION_COOKIE, identity
    ))
    .ok()
}

/// Extract the identity from the session cookie on an incoming request, or
/// `None` when the artifact is absent or malformed.
pub fn read(headers: &HeaderMap) -> Option<String> {
    let cookie = headers.get("cookie").or_else(|| headers.get("Cookie"))?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some(eq) = p.find('=') {
            let (k, v) = p.split_at(eq);
            if k == SESSION_COOKIE {
                let v = &v[1..];
                if v.is_empty() {
                    return None;
                }
                return Some(v.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn issue_then_read_round_trips_the_identity() {
        let cookie = issue("u@test.com").unwrap();
        let headers = headers_with_cookie(cookie.to_str().unwrap().split(';').next().unwrap());
        assert_eq!(read(&headers).as_deref(), Some("u@test.com"));
    }

    #[test]
    fn issue_sets_the_protective_attributes() {
        let cookie = issue("u@test.com").unwrap();
        let s = cookie.to_str().unwrap();
        assert!(s.starts_with("session=u@test.com"));
        assert!(s.contains("HttpOnly"));
        assert!(s.contains("SameSite=Lax"));
        assert!(s.contains("Path=/"));
    }

    #[test]
    fn read_ignores_other_cookies() {
        let headers = headers_with_cookie("theme=dark; session=u@test.com; lang=en");
        assert_eq!(read(&headers).as_deref(), Some("u@test.com"));
    }

    #[test]
    fn read_returns_none_when_absent_or_malformed() {
        assert_eq!(read(&HeaderMap::new()), None);
        assert_eq!(read(&headers_with_cookie("theme=dark")), None);
        assert_eq!(read(&headers_with_cookie("session=")), None);
        assert_eq!(read(&headers_with_cookie("session")), None);
    }

    #[test]
    fn issue_rejects_identities_that_break_the_header() {
        assert!(issue("u@test.com\r\nSet-Cookie: x=1").is_none());
    }
}

//! Session cookie codec
//!
//! The session is stored as `base64-<base64url(JSON)>` under the storage key. Values
//! longer than [`MAX_CHUNK_SIZE`] are split across `<key>.0`, `<key>.1`, ... cookies.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use portal_core::{AuthError, CookieOptions, Session, SetCookie};

pub const BASE64_PREFIX: &str = "base64-";

/// Largest value written to a single cookie
pub const MAX_CHUNK_SIZE: usize = 3180;

fn chunk_name(key: &str, index: usize) -> String {
    format!("{}.{}", key, index)
}

/// Reassemble the raw cookie value for `key`, joining chunks when needed.
fn combine_chunks(cookies: &[(String, String)], key: &str) -> Option<String> {
    let lookup = |name: &str| {
        cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    };

    if let Some(value) = lookup(key) {
        return Some(value.to_string());
    }

    let mut combined = String::new();
    let mut index = 0;
    while let Some(chunk) = lookup(&chunk_name(key, index)) {
        combined.push_str(chunk);
        index += 1;
    }

    (index > 0).then_some(combined)
}

/// Names of every cookie currently holding part of the session
pub fn session_cookie_names(cookies: &[(String, String)], key: &str) -> Vec<String> {
    let chunk_prefix = format!("{}.", key);
    cookies
        .iter()
        .map(|(name, _)| name)
        .filter(|name| {
            *name == key
                || name
                    .strip_prefix(&chunk_prefix)
                    .is_some_and(|idx| !idx.is_empty() && idx.chars().all(|c| c.is_ascii_digit()))
        })
        .cloned()
        .collect()
}

/// Decode a stored cookie value into its JSON text.
pub fn decode_value(raw: &str) -> Result<String, AuthError> {
    if let Some(encoded) = raw.strip_prefix(BASE64_PREFIX) {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded.trim_end_matches('='))
            .map_err(|e| AuthError::MalformedSession(format!("invalid base64: {}", e)))?;
        return String::from_utf8(bytes)
            .map_err(|e| AuthError::MalformedSession(format!("invalid UTF-8: {}", e)));
    }

    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| AuthError::MalformedSession(format!("invalid UTF-8: {}", e)))
}

/// Read the session from the cookie set. `Ok(None)` when no session cookie exists.
pub fn read_session(cookies: &[(String, String)], key: &str) -> Result<Option<Session>, AuthError> {
    let raw = match combine_chunks(cookies, key) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(None),
    };

    let json = decode_value(&raw)?;
    if json == "null" {
        return Ok(None);
    }

    serde_json::from_str::<Session>(&json)
        .map(Some)
        .map_err(|e| AuthError::MalformedSession(format!("invalid session JSON: {}", e)))
}

/// Cookies that store `session` under `key`, plus removals for stale chunks.
pub fn write_session(
    cookies: &[(String, String)],
    key: &str,
    session: &Session,
    options: &CookieOptions,
) -> Result<Vec<SetCookie>, AuthError> {
    let json = serde_json::to_string(session)
        .map_err(|e| AuthError::MalformedSession(format!("unserializable session: {}", e)))?;
    let value = format!("{}{}", BASE64_PREFIX, URL_SAFE_NO_PAD.encode(json.as_bytes()));

    let mut written: Vec<SetCookie> = if value.len() <= MAX_CHUNK_SIZE {
        vec![SetCookie::new(key, value, options.clone())]
    } else {
        // The value is ASCII, so byte chunks fall on character boundaries.
        value
            .as_bytes()
            .chunks(MAX_CHUNK_SIZE)
            .enumerate()
            .map(|(index, chunk)| {
                SetCookie::new(
                    chunk_name(key, index),
                    String::from_utf8_lossy(chunk).into_owned(),
                    options.clone(),
                )
            })
            .collect()
    };

    let stale: Vec<SetCookie> = session_cookie_names(cookies, key)
        .into_iter()
        .filter(|name| !written.iter().any(|c| &c.name == name))
        .map(|name| SetCookie::removal(name, options.clone()))
        .collect();
    written.extend(stale);

    Ok(written)
}

/// Removals for every cookie holding part of the session
pub fn remove_session(
    cookies: &[(String, String)],
    key: &str,
    options: &CookieOptions,
) -> Vec<SetCookie> {
    session_cookie_names(cookies, key)
        .into_iter()
        .map(|name| SetCookie::removal(name, options.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "sb-proj-auth-token";

    fn session(access_token: &str) -> Session {
        Session {
            access_token: access_token.to_string(),
            refresh_token: "refresh-1".to_string(),
            expires_at: Some(1_900_000_000),
            expires_in: Some(3600),
            token_type: "bearer".to_string(),
            user: None,
        }
    }

    fn encoded(json: &str) -> String {
        format!("{}{}", BASE64_PREFIX, URL_SAFE_NO_PAD.encode(json))
    }

    fn as_cookies(set: &[SetCookie]) -> Vec<(String, String)> {
        set.iter()
            .filter(|c| !c.is_removal())
            .map(|c| (c.name.clone(), c.value.clone()))
            .collect()
    }

    #[test]
    fn test_absent_session() {
        assert_eq!(read_session(&[], KEY).unwrap(), None);
        let cookies = vec![(KEY.to_string(), String::new())];
        assert_eq!(read_session(&cookies, KEY).unwrap(), None);
    }

    #[test]
    fn test_reads_base64_session() {
        let json = serde_json::to_string(&session("tok")).unwrap();
        let cookies = vec![(KEY.to_string(), encoded(&json))];
        let read = read_session(&cookies, KEY).unwrap().unwrap();
        assert_eq!(read.access_token, "tok");
    }

    #[test]
    fn test_reads_plain_json_session() {
        let json = r#"{"access_token":"a","refresh_token":"r"}"#;
        let cookies = vec![(KEY.to_string(), urlencoding::encode(json).into_owned())];
        let read = read_session(&cookies, KEY).unwrap().unwrap();
        assert_eq!(read.refresh_token, "r");
        assert_eq!(read.token_type, "bearer");
    }

    #[test]
    fn test_reassembles_chunks() {
        let json = serde_json::to_string(&session("tok")).unwrap();
        let value = encoded(&json);
        let (first, second) = value.split_at(10);
        let cookies = vec![
            (format!("{}.1", KEY), second.to_string()),
            (format!("{}.0", KEY), first.to_string()),
        ];
        let read = read_session(&cookies, KEY).unwrap().unwrap();
        assert_eq!(read.access_token, "tok");
    }

    #[test]
    fn test_corrupted_values_are_parse_errors() {
        let bad_base64 = vec![(KEY.to_string(), "base64-***".to_string())];
        assert!(matches!(
            read_session(&bad_base64, KEY),
            Err(AuthError::MalformedSession(_))
        ));

        let invalid_utf8 = vec![(
            KEY.to_string(),
            format!("{}{}", BASE64_PREFIX, URL_SAFE_NO_PAD.encode([0xffu8, 0xfe, 0xfd])),
        )];
        match read_session(&invalid_utf8, KEY) {
            Err(AuthError::MalformedSession(msg)) => assert!(msg.contains("UTF-8")),
            other => panic!("unexpected: {other:?}"),
        }

        let bad_json = vec![(KEY.to_string(), encoded("{not json"))];
        assert!(matches!(
            read_session(&bad_json, KEY),
            Err(AuthError::MalformedSession(_))
        ));

        let bad_percent = vec![(KEY.to_string(), "%ff%fe".to_string())];
        assert!(matches!(
            read_session(&bad_percent, KEY),
            Err(AuthError::MalformedSession(_))
        ));
    }

    #[test]
    fn test_write_small_session_replaces_chunks() {
        let existing = vec![
            (format!("{}.0", KEY), "x".to_string()),
            (format!("{}.1", KEY), "y".to_string()),
        ];
        let written =
            write_session(&existing, KEY, &session("tok"), &CookieOptions::default()).unwrap();

        assert_eq!(written[0].name, KEY);
        let removed: Vec<&str> = written
            .iter()
            .filter(|c| c.is_removal())
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(removed, vec!["sb-proj-auth-token.0", "sb-proj-auth-token.1"]);

        let read = read_session(&as_cookies(&written), KEY).unwrap().unwrap();
        assert_eq!(read, session("tok"));
    }

    #[test]
    fn test_write_large_session_is_chunked() {
        let big = session(&"a".repeat(MAX_CHUNK_SIZE * 2));
        let existing = vec![(KEY.to_string(), "old".to_string())];
        let written = write_session(&existing, KEY, &big, &CookieOptions::default()).unwrap();

        assert!(written.iter().any(|c| c.name == format!("{}.2", KEY)));
        assert!(written.iter().all(|c| c.value.len() <= MAX_CHUNK_SIZE));
        assert!(written.iter().any(|c| c.name == KEY && c.is_removal()));

        let read = read_session(&as_cookies(&written), KEY).unwrap().unwrap();
        assert_eq!(read.access_token.len(), MAX_CHUNK_SIZE * 2);
    }

    #[test]
    fn test_remove_session_only_touches_session_cookies() {
        let cookies = vec![
            (KEY.to_string(), "v".to_string()),
            (format!("{}.0", KEY), "v".to_string()),
            (format!("{}.extra", KEY), "v".to_string()),
            ("theme".to_string(), "dark".to_string()),
        ];
        let removals = remove_session(&cookies, KEY, &CookieOptions::default());
        let names: Vec<&str> = removals.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec![KEY, "sb-proj-auth-token.0"]);
        assert!(removals.iter().all(SetCookie::is_removal));
    }
}

//! Cookie sanitizer
//!
//! Deletes cookies under every scope they may have been set with. The `Cookie`
//! header does not carry a cookie's domain, so each name gets three directives:
//! exact host, `.parent` and bare `parent`. Deleting under a scope the cookie was
//! not set with is a no-op for the browser.

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use axum_extra::extract::cookie::{Cookie, SameSite as CookieSameSite};
use portal_core::{SameSite, SetCookie};
use tracing::{debug, warn};

const EXPIRED: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Cookie name/value pairs sent with the request, in order, without percent-decoding.
///
/// Header bytes that are not valid UTF-8 are replaced rather than dropped, so a
/// corrupted session cookie still reaches the provider and fails to parse there.
pub fn request_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(COOKIE)
        .iter()
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .flat_map(|header| {
            Cookie::split_parse(header)
                .filter_map(Result::ok)
                .map(|c| (c.name().to_string(), c.value().to_string()))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Which of the three domain variants a deletion directive targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeVariant {
    /// No `Domain` attribute: the exact request host
    ExactHost,
    /// `Domain=.parent`
    WildcardParent,
    /// `Domain=parent`
    BareParent,
}

/// Domains the sanitizer deletes under for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieScope {
    parent: String,
}

impl CookieScope {
    /// `cookie_domain` wins when configured; otherwise the parent is the request
    /// host without its first label.
    pub fn new(hostname: &str, cookie_domain: Option<&str>) -> Self {
        let parent = match cookie_domain {
            Some(domain) if !domain.trim_start_matches('.').is_empty() => {
                domain.trim_start_matches('.').to_string()
            }
            _ => parent_of_host(hostname),
        };
        Self { parent }
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }

    fn domain_for(&self, variant: ScopeVariant) -> Option<String> {
        match variant {
            ScopeVariant::ExactHost => None,
            ScopeVariant::WildcardParent => Some(format!(".{}", self.parent)),
            ScopeVariant::BareParent => Some(self.parent.clone()),
        }
    }
}

fn parent_of_host(hostname: &str) -> String {
    let labels: Vec<&str> = hostname.split('.').collect();
    if labels.len() >= 3 {
        labels[1..].join(".")
    } else {
        hostname.to_string()
    }
}

/// One expiry-setting directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionDirective {
    pub name: String,
    pub variant: ScopeVariant,
    pub domain: Option<String>,
}

impl DeletionDirective {
    /// Rendered by hand: the `cookie` crate normalizes `Domain=.parent` to
    /// `Domain=parent`, which would collapse two of the three variants.
    pub fn to_header_value(&self) -> String {
        let mut value = format!("{}=; Path=/; Expires={}; Max-Age=0", self.name, EXPIRED);
        if let Some(domain) = &self.domain {
            value.push_str("; Domain=");
            value.push_str(domain);
        }
        value
    }
}

/// Exact-host, wildcard-parent and bare-parent deletions for a single cookie
pub fn clear_cookie(name: &str, scope: &CookieScope) -> Vec<DeletionDirective> {
    [
        ScopeVariant::ExactHost,
        ScopeVariant::WildcardParent,
        ScopeVariant::BareParent,
    ]
    .into_iter()
    .map(|variant| DeletionDirective {
        name: name.to_string(),
        variant,
        domain: scope.domain_for(variant),
    })
    .collect()
}

/// Deletions for every cookie the caller currently holds
pub fn clear_all(cookies: &[(String, String)], scope: &CookieScope) -> Vec<DeletionDirective> {
    let mut seen: Vec<&str> = Vec::new();
    let mut directives = Vec::new();
    for (name, _) in cookies {
        if seen.contains(&name.as_str()) {
            continue;
        }
        seen.push(name);
        directives.extend(clear_cookie(name, scope));
    }
    directives
}

/// Deletions for cookies whose name starts with the provider namespace
pub fn purge_namespace(
    cookies: &[(String, String)],
    namespace: &str,
    scope: &CookieScope,
) -> Vec<DeletionDirective> {
    let owned: Vec<(String, String)> = cookies
        .iter()
        .filter(|(name, _)| name.starts_with(namespace))
        .cloned()
        .collect();
    clear_all(&owned, scope)
}

/// Append deletion directives as `Set-Cookie` headers
pub fn apply_deletions(headers: &mut HeaderMap, directives: &[DeletionDirective]) {
    for directive in directives {
        match HeaderValue::from_str(&directive.to_header_value()) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(e) => warn!(cookie = %directive.name, "Skipping undeletable cookie name: {}", e),
        }
    }
    debug!(count = directives.len(), "Issued cookie deletion directives");
}

/// Convert a provider cookie directive, keeping every option it carries
pub fn to_cookie(set: &SetCookie) -> Cookie<'static> {
    let options = &set.options;
    let mut builder = Cookie::build((set.name.clone(), set.value.clone()))
        .secure(options.secure)
        .http_only(options.http_only);

    // Rendered as `Domain=x` even for `.x`; browsers scope both to x and its
    // subdomains. Deletions need the literal form, see `DeletionDirective`.
    if let Some(domain) = &options.domain {
        builder = builder.domain(domain.clone());
    }
    if let Some(path) = &options.path {
        builder = builder.path(path.clone());
    }
    if let Some(max_age) = options.max_age {
        builder = builder.max_age(time::Duration::seconds(max_age));
    }
    if let Some(expires) = options.expires {
        if let Ok(at) = time::OffsetDateTime::from_unix_timestamp(expires.timestamp()) {
            builder = builder.expires(at);
        }
    } else if set.is_removal() {
        builder = builder.expires(time::OffsetDateTime::UNIX_EPOCH);
    }
    if let Some(same_site) = options.same_site {
        builder = builder.same_site(match same_site {
            SameSite::Strict => CookieSameSite::Strict,
            SameSite::Lax => CookieSameSite::Lax,
            SameSite::None => CookieSameSite::None,
        });
    }

    builder.build()
}

/// Append provider cookie directives as `Set-Cookie` headers
pub fn apply_provider_cookies(headers: &mut HeaderMap, cookies: &[SetCookie]) {
    for set in cookies {
        match HeaderValue::from_str(&to_cookie(set).to_string()) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(e) => warn!(cookie = %set.name, "Dropping unrepresentable cookie: {}", e),
        }
    }
}

/// Replace the request `Cookie` header with the given pairs
pub fn rewrite_request_cookies(headers: &mut HeaderMap, cookies: &[(String, String)]) {
    headers.remove(COOKIE);
    if cookies.is_empty() {
        return;
    }

    let joined = cookies
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ");

    match HeaderValue::from_str(&joined) {
        Ok(value) => {
            headers.insert(COOKIE, value);
        }
        Err(e) => warn!("Could not forward refreshed cookies: {}", e),
    }
}

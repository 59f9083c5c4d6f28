//! Where the bearer token comes from.
//!
//! Client-side code reads the shared [`CookieJar`]. Code running on behalf of
//! an inbound server request reads that request's `Cookie` header instead.

use crate::consts::client_consts::{AUTH_TOKEN_COOKIE, USER_COOKIE};
use cookie::Cookie;
use regex::Regex;
use reqwest::Url;
use reqwest::header::HeaderValue;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

static AUTH_TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"authToken=([^;]+)").expect("valid auth token pattern"));

#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display)]
pub enum ExecutionContext {
    /// Handling an inbound request; cookies arrive as a header.
    Server,
    /// Running as the user's client with its own cookie jar.
    Browser,
}

pub trait CredentialSource: Send + Sync {
    fn context(&self) -> ExecutionContext;

    /// The current bearer token, read fresh on every call.
    fn auth_token(&self) -> Option<String>;

    /// Drops the session cookies after the service rejected them.
    fn clear_session(&self) {}
}

/// The client's cookie store. Also plugged into reqwest so cookies travel with requests.
///
/// Cookies received from a server keep the domain and path of the response that
/// set them and only go back to matching URLs. Cookies placed with
/// [`CookieJar::set`] are visible to credential sources but never sent.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: Mutex<Vec<StoredCookie>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredCookie {
    name: String,
    value: String,
    scope: Option<CookieScope>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CookieScope {
    domain: String,
    host_only: bool,
    path: String,
    secure: bool,
}

impl CookieScope {
    fn matches(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        let domain_ok = if self.host_only {
            host == self.domain
        } else {
            domain_matches(&host, &self.domain)
        };
        domain_ok
            && path_matches(url.path(), &self.path)
            && (!self.secure || url.scheme() == "https")
    }
}

fn domain_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    match request_path.strip_prefix(cookie_path) {
        Some(rest) => rest.is_empty() || cookie_path.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}

/// Directory of the request path, used when `Set-Cookie` names no `Path`.
fn default_path(url: &Url) -> String {
    let path = url.path();
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(end) => path[..end].to_string(),
    }
}

fn is_expired(cookie: &Cookie<'_>) -> bool {
    // Max-Age wins over Expires.
    if let Some(max_age) = cookie.max_age() {
        return max_age.is_zero() || max_age.is_negative();
    }
    cookie
        .expires_datetime()
        .is_some_and(|expires| expires.unix_timestamp() <= chrono::Utc::now().timestamp())
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StoredCookie>> {
        match self.cookies.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Latest value stored under `name`, whatever its scope.
    pub fn get(&self, name: &str) -> Option<String> {
        self.lock()
            .iter()
            .rev()
            .find(|cookie| cookie.name == name)
            .map(|cookie| cookie.value.clone())
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let mut cookies = self.lock();
        cookies.retain(|cookie| !(cookie.name == name && cookie.scope.is_none()));
        cookies.push(StoredCookie {
            name,
            value: value.into(),
            scope: None,
        });
    }

    /// Drops every cookie called `name`, in every scope.
    pub fn remove(&self, name: &str) {
        self.lock().retain(|cookie| cookie.name != name);
    }

    /// Cookies due for `url` as a `Cookie` header value, or `None` when nothing matches.
    pub fn header_value(&self, url: &Url) -> Option<String> {
        let cookies = self.lock();
        let pairs: Vec<String> = cookies
            .iter()
            .filter(|cookie| cookie.scope.as_ref().is_some_and(|scope| scope.matches(url)))
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect();
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }

    /// Applies one `Set-Cookie` header received from `url`.
    ///
    /// Expired or empty cookies are removed, together with any unscoped copy of the
    /// same name. A `Domain` the responding host does not belong to is rejected.
    pub fn apply_set_cookie(&self, raw: &str, url: &Url) {
        let Ok(cookie) = Cookie::parse(raw) else {
            log::debug!("ignoring malformed Set-Cookie from {}", url);
            return;
        };
        let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
            return;
        };

        let (domain, host_only) = match cookie.domain() {
            Some(domain) => {
                let domain = domain.trim_start_matches('.').to_ascii_lowercase();
                if !domain_matches(&host, &domain) {
                    log::debug!("ignoring cookie {} for foreign domain {}", cookie.name(), domain);
                    return;
                }
                (domain, false)
            }
            None => (host, true),
        };
        let path = match cookie.path() {
            Some(path) if path.starts_with('/') => path.to_string(),
            _ => default_path(url),
        };
        let scope = CookieScope {
            domain,
            host_only,
            path,
            secure: cookie.secure().unwrap_or(false),
        };

        let name = cookie.name();
        let mut cookies = self.lock();
        if is_expired(&cookie) || cookie.value().is_empty() {
            cookies.retain(|stored| {
                !(stored.name == name
                    && (stored.scope.is_none() || stored.scope.as_ref() == Some(&scope)))
            });
            return;
        }
        cookies.retain(|stored| !(stored.name == name && stored.scope.as_ref() == Some(&scope)));
        cookies.push(StoredCookie {
            name: name.to_string(),
            value: cookie.value().to_string(),
            scope: Some(scope),
        });
    }
}

impl reqwest::cookie::CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        for header in cookie_headers {
            if let Ok(raw) = header.to_str() {
                self.apply_set_cookie(raw, url);
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.header_value(url)
            .and_then(|value| HeaderValue::from_str(&value).ok())
    }
}

/// Pulls the `authToken` value out of a raw `Cookie` header.
pub fn extract_auth_token(cookie_header: &str) -> Option<String> {
    AUTH_TOKEN_PATTERN
        .captures(cookie_header)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

/// Client-side credentials backed by the shared cookie jar.
#[derive(Debug, Clone)]
pub struct BrowserCookieCredentialSource {
    jar: Arc<CookieJar>,
}

impl BrowserCookieCredentialSource {
    pub fn new(jar: Arc<CookieJar>) -> Self {
        Self { jar }
    }
}

impl CredentialSource for BrowserCookieCredentialSource {
    fn context(&self) -> ExecutionContext {
        ExecutionContext::Browser
    }

    fn auth_token(&self) -> Option<String> {
        self.jar.get(AUTH_TOKEN_COOKIE)
    }

    fn clear_session(&self) {
        self.jar.remove(AUTH_TOKEN_COOKIE);
        self.jar.remove(USER_COOKIE);
    }
}

/// Server-side credentials taken from an inbound request's `Cookie` header.
///
/// Without an inbound header the ambient jar, if any, is consulted.
#[derive(Debug, Clone, Default)]
pub struct RequestHeaderCredentialSource {
    cookie_header: Option<String>,
    ambient: Option<Arc<CookieJar>>,
}

impl RequestHeaderCredentialSource {
    pub fn new(cookie_header: Option<String>) -> Self {
        Self {
            cookie_header,
            ambient: None,
        }
    }

    pub fn with_ambient_jar(mut self, jar: Arc<CookieJar>) -> Self {
        self.ambient = Some(jar);
        self
    }
}

impl CredentialSource for RequestHeaderCredentialSource {
    fn context(&self) -> ExecutionContext {
        ExecutionContext::Server
    }

    fn auth_token(&self) -> Option<String> {
        match self.cookie_header.as_deref().filter(|h| !h.is_empty()) {
            Some(header) => extract_auth_token(header),
            None => self
                .ambient
                .as_ref()
                .and_then(|jar| jar.get(AUTH_TOKEN_COOKIE)),
        }
    }
}

/// No token, server-side semantics. Used for anonymous calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialSource for NoCredentials {
    fn context(&self) -> ExecutionContext {
        ExecutionContext::Server
    }

    fn auth_token(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::cookie::CookieStore;

    #[test]
    fn test_extract_auth_token_from_cookie_header() {
        assert_eq!(
            extract_auth_token("theme=dark; authToken=abc.def; user=%7B%7D"),
            Some("abc.def".to_string())
        );
        assert_eq!(extract_auth_token("authToken=xyz"), Some("xyz".to_string()));
        assert_eq!(extract_auth_token("theme=dark"), None);
        assert_eq!(extract_auth_token("authToken=;"), None);
    }

    #[test]
    fn test_browser_source_reads_and_clears_jar() {
        let jar = Arc::new(CookieJar::new());
        jar.set(AUTH_TOKEN_COOKIE, "tok");
        jar.set(USER_COOKIE, "{\"id\":1}");
        jar.set("theme", "dark");

        let source = BrowserCookieCredentialSource::new(jar.clone());
        assert_eq!(source.context(), ExecutionContext::Browser);
        assert_eq!(source.auth_token(), Some("tok".to_string()));

        source.clear_session();
        assert_eq!(source.auth_token(), None);
        assert_eq!(jar.get(USER_COOKIE), None);
        assert_eq!(jar.get("theme"), Some("dark".to_string()));
    }

    #[test]
    fn test_header_source_prefers_inbound_cookie() {
        let jar = Arc::new(CookieJar::new());
        jar.set(AUTH_TOKEN_COOKIE, "ambient");

        let inbound = RequestHeaderCredentialSource::new(Some("authToken=inbound".to_string()))
            .with_ambient_jar(jar.clone());
        assert_eq!(inbound.auth_token(), Some("inbound".to_string()));
        assert_eq!(inbound.context(), ExecutionContext::Server);

        let without_header = RequestHeaderCredentialSource::new(None).with_ambient_jar(jar);
        assert_eq!(without_header.auth_token(), Some("ambient".to_string()));

        assert_eq!(RequestHeaderCredentialSource::new(None).auth_token(), None);
    }

    #[test]
    fn test_server_sources_do_not_clear_anything() {
        let jar = Arc::new(CookieJar::new());
        jar.set(AUTH_TOKEN_COOKIE, "tok");
        let source = RequestHeaderCredentialSource::new(None).with_ambient_jar(jar.clone());
        source.clear_session();
        assert_eq!(jar.get(AUTH_TOKEN_COOKIE), Some("tok".to_string()));
    }

    fn receive(jar: &CookieJar, url: &str, raw: &'static str) {
        let header = HeaderValue::from_static(raw);
        jar.set_cookies(&mut std::iter::once(&header), &Url::parse(url).unwrap());
    }

    fn sent(jar: &CookieJar, url: &str) -> Option<HeaderValue> {
        jar.cookies(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_jar_applies_set_cookie_headers() {
        let jar = CookieJar::new();
        receive(&jar, "http://localhost/api", "authToken=fresh; Path=/; HttpOnly");
        assert_eq!(jar.get(AUTH_TOKEN_COOKIE), Some("fresh".to_string()));
        assert_eq!(
            sent(&jar, "http://localhost/api"),
            Some(HeaderValue::from_static("authToken=fresh"))
        );

        receive(&jar, "http://localhost/api", "authToken=deleted; Max-Age=0; Path=/");
        assert_eq!(jar.get(AUTH_TOKEN_COOKIE), None);
        assert_eq!(sent(&jar, "http://localhost/api"), None);
    }

    #[test]
    fn test_past_expires_removes_cookie() {
        let jar = CookieJar::new();
        receive(&jar, "http://localhost/api", "authToken=live; Path=/");
        receive(
            &jar,
            "http://localhost/api",
            "authToken=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Path=/",
        );
        assert_eq!(jar.get(AUTH_TOKEN_COOKIE), None);

        // A logout also drops the token placed by hand.
        jar.set(AUTH_TOKEN_COOKIE, "seeded");
        receive(
            &jar,
            "http://localhost/api",
            "authToken=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Path=/",
        );
        assert_eq!(jar.get(AUTH_TOKEN_COOKIE), None);
    }

    #[test]
    fn test_future_expires_keeps_cookie() {
        let jar = CookieJar::new();
        receive(
            &jar,
            "http://localhost/api",
            "authToken=live; Expires=Fri, 01 Jan 2100 00:00:00 GMT; Path=/",
        );
        assert_eq!(jar.get(AUTH_TOKEN_COOKIE), Some("live".to_string()));
    }

    #[test]
    fn test_cookies_stay_with_the_host_that_set_them() {
        let jar = CookieJar::new();
        receive(&jar, "http://packages.test/api", "session=s1; Path=/api");

        assert_eq!(
            sent(&jar, "http://packages.test/api/travel-packages"),
            Some(HeaderValue::from_static("session=s1"))
        );
        assert_eq!(sent(&jar, "http://evil.example/"), None);
        assert_eq!(sent(&jar, "http://wanderlist.test/api"), None);
        assert_eq!(sent(&jar, "http://sub.packages.test/api"), None);
        assert_eq!(sent(&jar, "http://packages.test/other"), None);
        assert_eq!(sent(&jar, "http://packages.test/apix"), None);
    }

    #[test]
    fn test_domain_attribute_covers_subdomains_only_when_valid() {
        let jar = CookieJar::new();
        receive(&jar, "http://api.wander.test/v1/login", "region=eu; Domain=.wander.test; Path=/");
        assert_eq!(
            sent(&jar, "http://packages.wander.test/"),
            Some(HeaderValue::from_static("region=eu"))
        );
        assert_eq!(sent(&jar, "http://wander.example/"), None);

        receive(&jar, "http://api.wander.test/", "stolen=1; Domain=evil.example");
        assert_eq!(jar.get("stolen"), None);
    }

    #[test]
    fn test_default_path_and_secure_flag() {
        let jar = CookieJar::new();
        receive(&jar, "https://p.test/api/auth/login", "refresh=r1; Secure");

        assert_eq!(
            sent(&jar, "https://p.test/api/auth/refresh"),
            Some(HeaderValue::from_static("refresh=r1"))
        );
        assert_eq!(sent(&jar, "http://p.test/api/auth/refresh"), None);
        assert_eq!(sent(&jar, "https://p.test/api/packages"), None);
    }

    #[test]
    fn test_hand_set_cookies_are_never_sent() {
        let jar = CookieJar::new();
        jar.set(AUTH_TOKEN_COOKIE, "seeded");
        assert_eq!(jar.get(AUTH_TOKEN_COOKIE), Some("seeded".to_string()));
        assert_eq!(sent(&jar, "http://packages.test/api"), None);
    }
}

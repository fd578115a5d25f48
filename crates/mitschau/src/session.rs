use std::{ops::Deref, sync::Arc};

use fake_user_agent::get_chrome_rua;
use reqwest::{Client, ClientBuilder};
use reqwest_cookie_store::{CookieStore, CookieStoreMutex};
use url::Url;

use crate::error::{ExtractorError, ExtractorResult};

/// Cookie-name prefix the site uses for its session cookies.
pub const SESSION_COOKIE_PREFIX: &str = "SSESS";

/// HTTP client with a shared cookie jar.
///
/// The jar is owned here and handed to reqwest as the cookie provider, so
/// every response's `Set-Cookie` headers are persisted automatically. Tests
/// and callers can pre-seed it through [`HttpClient::add_cookies`].
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    cookies_store: Arc<CookieStoreMutex>,
}

impl HttpClient {
    pub fn new(builder: ClientBuilder) -> Self {
        let cookies_store = Arc::new(CookieStoreMutex::new(CookieStore::default()));
        let client = builder
            .cookie_provider(cookies_store.clone())
            .build()
            .unwrap();

        Self {
            client,
            cookies_store,
        }
    }

    /// Merge pre-existing cookies into the jar for `url`.
    ///
    /// Each entry is a `Set-Cookie`-style string, e.g. `SSESSdeadbeef=value`.
    pub fn add_cookies(&self, cookies: &[String], url: &Url) {
        let mut lock = self.cookies_store.lock().unwrap();
        for cookie in cookies {
            _ = lock.parse(cookie, url);
        }
    }

    /// Names of all cookies the jar would send for `url`.
    pub fn cookie_names(&self, url: &Url) -> Vec<String> {
        let lock = self.cookies_store.lock().unwrap();
        lock.get_request_values(url)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    fn has_session_cookie(&self, url: &Url) -> bool {
        self.cookie_names(url)
            .iter()
            .any(|name| name.starts_with(SESSION_COOKIE_PREFIX))
    }

    /// GET `url` and return the response body.
    pub async fn get_text(&self, url: Url) -> ExtractorResult<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractorError::HttpStatus(status));
        }

        Ok(response.text().await?)
    }

    /// Make sure a session cookie exists for `url` before a protected fetch.
    ///
    /// If the jar already holds an `SSESS*` cookie this is a no-op. Otherwise
    /// the page is fetched once and the body discarded; the server's
    /// `Set-Cookie` response lands in the jar through the cookie provider.
    /// Best effort only: if the server hands out no cookie, the following
    /// feed fetch proceeds anyway and fails on its own terms.
    pub async fn ensure_session(&self, url: &Url, id: &str) {
        if self.has_session_cookie(url) {
            return;
        }

        tracing::warn!(id, "no session cookie in jar, fetching {url} to acquire one");
        if let Err(error) = self.get_text(url.clone()).await {
            tracing::warn!(id, %error, "session warm-up fetch failed");
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(Client::builder().user_agent(get_chrome_rua()))
    }
}

impl Deref for HttpClient {
    type Target = Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_cookies_are_visible_for_their_url() {
        let client = HttpClient::default();
        let url = Url::parse("https://videoonline.edu.lmu.de/en/node/8171").unwrap();

        client.add_cookies(
            &["SSESSdeadbeef=abc123".to_string(), "other=1".to_string()],
            &url,
        );

        let names = client.cookie_names(&url);
        assert!(names.contains(&"SSESSdeadbeef".to_string()));
        assert!(names.contains(&"other".to_string()));
        assert!(client.has_session_cookie(&url));
    }

    #[test]
    fn cookies_do_not_leak_across_domains() {
        let client = HttpClient::default();
        let url = Url::parse("https://videoonline.edu.lmu.de/en/node/8171").unwrap();
        let foreign = Url::parse("https://example.com/").unwrap();

        client.add_cookies(&["SSESSdeadbeef=abc123".to_string()], &url);

        assert!(client.cookie_names(&foreign).is_empty());
        assert!(!client.has_session_cookie(&foreign));
    }

    #[test]
    fn non_session_cookies_do_not_satisfy_the_gate() {
        let client = HttpClient::default();
        let url = Url::parse("https://videoonline.edu.lmu.de/en/node/8171").unwrap();

        client.add_cookies(&["has_js=1".to_string()], &url);

        assert!(!client.has_session_cookie(&url));
    }
}

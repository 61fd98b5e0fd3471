//! Static-document browser driver
//!
//! Loads pages with `reqwest` and serves them as they were delivered:
//! - `goto` fetches the document and keeps the previous one in a history stack
//! - `click` follows the located element's link target
//! - selector waits check the loaded document once
//!
//! Scripts are never executed.

use crate::browser::driver::{
    BrowserDriver, DriverError, Locator, NavigationResponse, Visibility, WaitCondition,
};
use crate::config::BrowserConfig;
use crate::dom::PageSnapshot;
use crate::url::resolve_link;
use crate::RenderError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Maximum number of redirects followed per navigation
const MAX_REDIRECTS: usize = 10;

/// Pages kept for `go_back`; older ones are dropped
pub const HISTORY_DEPTH: usize = 2;

/// A document as it was loaded
#[derive(Debug, Clone)]
struct LoadedPage {
    url: Url,
    content_type: String,
    body: String,
}

/// Builds the HTTP client used for all page loads
///
/// # Arguments
///
/// * `config` - The browser configuration (user agent and navigation timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use listing_harvester::browser::build_http_client;
/// use listing_harvester::config::BrowserConfig;
///
/// let client = build_http_client(&BrowserConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &BrowserConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_millis(config.navigation_timeout_ms))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Browser driver over plain HTTP
#[derive(Debug)]
pub struct HttpDriver {
    client: Client,
    current: Option<LoadedPage>,
    history: VecDeque<LoadedPage>,
    navigation_timeout: Duration,
}

impl HttpDriver {
    /// Creates a driver with a client built from the browser configuration
    pub fn new(config: &BrowserConfig) -> Result<Self, DriverError> {
        if !config.headless {
            tracing::debug!("HTTP driver has no visible window; headless=false is ignored");
        }
        let client = build_http_client(config).map_err(|e| DriverError::Http(e.to_string()))?;
        Ok(Self::with_client(
            client,
            Duration::from_millis(config.navigation_timeout_ms),
        ))
    }

    /// Creates a driver around an existing client
    pub fn with_client(client: Client, navigation_timeout: Duration) -> Self {
        Self {
            client,
            current: None,
            history: VecDeque::with_capacity(HISTORY_DEPTH + 1),
            navigation_timeout,
        }
    }

    /// Number of pages that `go_back` can return to
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Makes `page` the current document and keeps the previous one for `go_back`
    fn remember(&mut self, page: LoadedPage) {
        if let Some(previous) = self.current.replace(page) {
            self.history.push_back(previous);
            if self.history.len() > HISTORY_DEPTH {
                self.history.pop_front();
            }
        }
    }

    /// Resolves the link target of the located element on the current page
    fn click_target(&self, locator: &Locator) -> Result<Option<Url>, DriverError> {
        let snapshot = self.snapshot()?;
        let elements = snapshot.query(&locator.pattern);
        let element = elements
            .get(locator.index)
            .ok_or_else(|| DriverError::NotFound(locator.to_string()))?;

        let href = element
            .attr_non_empty("href")
            .or_else(|| element.attr_non_empty("data-href"))
            .or_else(|| {
                element
                    .select_first("a[href]")
                    .and_then(|a| a.attr_non_empty("href"))
            });

        Ok(href.and_then(|h| resolve_link(&h, snapshot.url())))
    }
}

fn classify_error(error: reqwest::Error, timeout: Duration) -> DriverError {
    if error.is_timeout() {
        DriverError::Timeout(timeout)
    } else {
        DriverError::Http(error.to_string())
    }
}

#[async_trait]
impl BrowserDriver for HttpDriver {
    async fn goto(
        &mut self,
        url: &Url,
        _wait: WaitCondition,
        timeout: Duration,
    ) -> Result<NavigationResponse, DriverError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(e, timeout))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();
        let body = response
            .text()
            .await
            .map_err(|e| classify_error(e, timeout))?;

        self.remember(LoadedPage {
            url: final_url,
            content_type,
            body,
        });

        Ok(NavigationResponse::from_status(status))
    }

    async fn wait_for_selector(
        &mut self,
        pattern: &str,
        timeout: Duration,
        _visibility: Visibility,
    ) -> Result<(), DriverError> {
        // A static document never changes, so one check is the whole wait
        let found = self.snapshot()?.exists(pattern);
        if found {
            Ok(())
        } else {
            Err(DriverError::Timeout(timeout))
        }
    }

    async fn click(&mut self, locator: &Locator) -> Result<(), DriverError> {
        match self.click_target(locator)? {
            Some(target) => {
                let timeout = self.navigation_timeout;
                self.goto(&target, WaitCondition::Load, timeout).await?;
                Ok(())
            }
            None => {
                tracing::debug!("Click on '{}' has no navigation target", locator);
                Ok(())
            }
        }
    }

    fn current_url(&self) -> Option<Url> {
        self.current.as_ref().map(|page| page.url.clone())
    }

    fn snapshot(&self) -> Result<PageSnapshot, DriverError> {
        let page = self.current.as_ref().ok_or(DriverError::NoPage)?;

        let content_type = page.content_type.as_str();
        if !content_type.is_empty()
            && !content_type.contains("html")
            && !content_type.starts_with("text/")
        {
            return Err(RenderError::NotHtml {
                url: page.url.to_string(),
                content_type: page.content_type.clone(),
            }
            .into());
        }

        Ok(PageSnapshot::parse(&page.body, page.url.clone())?)
    }

    async fn go_back(&mut self, _wait: WaitCondition, _timeout: Duration) -> Result<(), DriverError> {
        let previous = self.history.pop_back().ok_or(DriverError::NoHistory)?;
        tracing::debug!("Back to {}", previous.url);
        self.current = Some(previous);
        Ok(())
    }

    async fn screenshot(&mut self, _path: &Path) -> Result<(), DriverError> {
        Err(DriverError::Unsupported("screenshot"))
    }

    async fn dump_html(&mut self, path: &Path) -> Result<(), DriverError> {
        let page = self.current.as_ref().ok_or(DriverError::NoPage)?;
        tokio::fs::write(path, page.body.as_bytes()).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.current = None;
        self.history.clear();
        Ok(())
    }
}

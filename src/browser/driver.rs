use crate::dom::PageSnapshot;
use crate::RenderError;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised by a browser driver
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("No element matches '{0}'")]
    NotFound(String),

    #[error("No previous page in history")]
    NoHistory,

    #[error("No page loaded")]
    NoPage,

    #[error("Operation not supported by this driver: {0}")]
    Unsupported(&'static str),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriverError {
    /// Returns true if the failure may go away on another attempt
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout(_) | Self::NotFound(_))
    }
}

/// When a navigation is considered complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitCondition {
    /// The `load` event fired
    Load,
    /// The initial document was parsed
    #[default]
    DomContentLoaded,
    /// No network activity for a short period
    NetworkIdle,
}

/// What a selector wait requires of the matched element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Present in the DOM
    #[default]
    Attached,
    /// Present and rendered
    Visible,
}

/// Outcome of a `goto`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationResponse {
    /// HTTP status of the main document
    pub status: u16,
    /// `status < 400`
    pub ok: bool,
}

impl NavigationResponse {
    pub fn from_status(status: u16) -> Self {
        Self {
            status,
            ok: status < 400,
        }
    }
}

/// Identifies one element to click: the `index`-th match of `pattern`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub pattern: String,
    pub index: usize,
}

impl Locator {
    /// The first element matching `pattern`
    pub fn css(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            index: 0,
        }
    }

    /// The `index`-th element (zero based) matching `pattern`
    pub fn nth(pattern: impl Into<String>, index: usize) -> Self {
        Self {
            pattern: pattern.into(),
            index,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.index == 0 {
            write!(f, "{}", self.pattern)
        } else {
            write!(f, "{}[{}]", self.pattern, self.index)
        }
    }
}

/// A single navigable page surface
///
/// The crawler drives exactly one of these, strictly sequentially. Every
/// operation that touches the network is async; reading the current page is
/// not.
#[async_trait]
pub trait BrowserDriver: Send {
    /// Loads `url` and waits for `wait` within `timeout`
    ///
    /// A response with an error status is still a loaded page; only transport
    /// failures and timeouts are errors.
    async fn goto(
        &mut self,
        url: &Url,
        wait: WaitCondition,
        timeout: Duration,
    ) -> Result<NavigationResponse, DriverError>;

    /// Waits until an element matching `pattern` exists
    ///
    /// Fails with `DriverError::Timeout` if none appears within `timeout`.
    async fn wait_for_selector(
        &mut self,
        pattern: &str,
        timeout: Duration,
        visibility: Visibility,
    ) -> Result<(), DriverError>;

    /// Clicks the located element
    async fn click(&mut self, locator: &Locator) -> Result<(), DriverError>;

    /// URL of the page currently shown
    fn current_url(&self) -> Option<Url>;

    /// Parses the page currently shown
    fn snapshot(&self) -> Result<PageSnapshot, DriverError>;

    /// Navigates back in history
    async fn go_back(&mut self, wait: WaitCondition, timeout: Duration) -> Result<(), DriverError>;

    /// Best-effort screenshot for debugging
    async fn screenshot(&mut self, path: &Path) -> Result<(), DriverError>;

    /// Best-effort dump of the current document for debugging
    async fn dump_html(&mut self, path: &Path) -> Result<(), DriverError>;

    /// Releases the underlying resources
    async fn close(&mut self) -> Result<(), DriverError>;
}

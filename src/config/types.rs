use serde::Deserialize;

/// Main configuration structure for Listing-Harvester
///
/// Every section is optional in the TOML file; missing sections and keys fall
/// back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target: TargetConfig,
    pub browser: BrowserConfig,
    pub scraping: ScrapingConfig,
    pub email: EmailConfig,
    pub output: OutputConfig,
}

/// The directory being crawled and the search that seeds the crawl
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Root URL of the directory (its host is the "own domain" never treated as a company website)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Search term, e.g. a trade
    #[serde(rename = "search-term")]
    pub search_term: String,

    /// Search location, e.g. a city
    pub location: String,

    /// Path template for the first listing page; `{term}` and `{location}` are substituted
    #[serde(rename = "search-path")]
    pub search_path: String,

    /// Explicit first listing URL, overriding the built search URL
    #[serde(rename = "start-url")]
    pub start_url: Option<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.11880.com".to_string(),
            search_term: "Hausverwaltungen".to_string(),
            location: "Düsseldorf".to_string(),
            search_path: "/suche/{term}/{location}".to_string(),
            start_url: None,
        }
    }
}

/// Browser surface and per-operation timeouts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,

    /// Timeout for a single page load (milliseconds)
    #[serde(rename = "navigation-timeout-ms")]
    pub navigation_timeout_ms: u64,

    /// Timeout for a structural indicator to appear (milliseconds)
    #[serde(rename = "selector-timeout-ms")]
    pub selector_timeout_ms: u64,

    /// Timeout for each cookie-consent click attempt (milliseconds)
    #[serde(rename = "consent-timeout-ms")]
    pub consent_timeout_ms: u64,

    /// Pause after a detail page loads, before it is snapshotted (milliseconds)
    #[serde(rename = "settle-delay-ms")]
    pub settle_delay_ms: u64,

    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            navigation_timeout_ms: 30_000,
            selector_timeout_ms: 10_000,
            consent_timeout_ms: 5_000,
            settle_delay_ms: 1_500,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        }
    }
}

/// Traversal limits, request pacing and retry policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Maximum number of listing pages to traverse
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Lower bound of the randomized delay between navigations (milliseconds)
    #[serde(rename = "delay-min-ms")]
    pub delay_min_ms: u64,

    /// Upper bound of the randomized delay between navigations (milliseconds)
    #[serde(rename = "delay-max-ms")]
    pub delay_max_ms: u64,

    /// How many entries of each listing page are opened, in DOM order
    #[serde(rename = "entries-per-page")]
    pub entries_per_page: u32,

    /// Stop once `test_record_limit` records were collected
    #[serde(rename = "test-mode")]
    pub test_mode: bool,

    #[serde(rename = "test-record-limit")]
    pub test_record_limit: u32,

    pub retry: RetryConfig,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            max_pages: 50,
            delay_min_ms: 2_000,
            delay_max_ms: 5_000,
            entries_per_page: 1,
            test_mode: false,
            test_record_limit: 5,
            retry: RetryConfig::default(),
        }
    }
}

/// Exponential backoff settings shared by every retried navigation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts including the first one
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    #[serde(rename = "base-delay-ms")]
    pub base_delay_ms: u64,

    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,

    /// Upper bound of the random amount added to each delay
    #[serde(rename = "jitter-ms")]
    pub jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2_000,
            max_delay_ms: 30_000,
            jitter_ms: 1_000,
        }
    }
}

/// Which email sources are consulted after the crawl
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,

    #[serde(rename = "from-detail-page")]
    pub from_detail_page: bool,

    #[serde(rename = "from-website")]
    pub from_website: bool,

    #[serde(rename = "from-imprint")]
    pub from_imprint: bool,

    /// Page-load timeout for company websites (milliseconds)
    #[serde(rename = "website-timeout-ms")]
    pub website_timeout_ms: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            from_detail_page: true,
            from_website: true,
            from_imprint: true,
            website_timeout_ms: 15_000,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the run's CSV file and debug captures are written to
    pub directory: String,

    /// File name template; `{timestamp}` is replaced with the run's start time
    pub filename: String,

    /// Value of the `Source` column; defaults to the directory host
    #[serde(rename = "source-label")]
    pub source_label: Option<String>,

    /// Dump HTML/screenshot when a listing navigation exhausts its retries
    #[serde(rename = "debug-captures")]
    pub debug_captures: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "data".to_string(),
            filename: "companies_{timestamp}.csv".to_string(),
            source_label: None,
            debug_captures: true,
        }
    }
}

impl Config {
    /// Builds the first listing URL from the search template, or returns `start-url` if set
    ///
    /// Search term and location are percent-encoded as path segments.
    ///
    /// # Example
    ///
    /// ```
    /// use listing_harvester::config::Config;
    ///
    /// let config = Config::default();
    /// let url = config.start_url().unwrap();
    /// assert_eq!(
    ///     url.as_str(),
    ///     "https://www.11880.com/suche/Hausverwaltungen/D%C3%BCsseldorf"
    /// );
    /// ```
    pub fn start_url(&self) -> Result<url::Url, crate::ConfigError> {
        if let Some(explicit) = &self.target.start_url {
            return url::Url::parse(explicit).map_err(|e| {
                crate::ConfigError::InvalidUrl(format!("Invalid start-url '{}': {}", explicit, e))
            });
        }

        let mut url = self.base_url()?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                crate::ConfigError::InvalidUrl(format!(
                    "base-url '{}' cannot carry a path",
                    self.target.base_url
                ))
            })?;
            segments.clear();
            for part in self.target.search_path.split('/').filter(|p| !p.is_empty()) {
                let part = part
                    .replace("{term}", &self.target.search_term)
                    .replace("{location}", &self.target.location);
                segments.push(&part);
            }
        }
        Ok(url)
    }

    /// Parses `target.base-url`
    pub fn base_url(&self) -> Result<url::Url, crate::ConfigError> {
        url::Url::parse(&self.target.base_url).map_err(|e| {
            crate::ConfigError::InvalidUrl(format!(
                "Invalid base-url '{}': {}",
                self.target.base_url, e
            ))
        })
    }

    /// Value written to the `Source` column
    pub fn source_label(&self) -> String {
        if let Some(label) = &self.output.source_label {
            return label.clone();
        }
        self.base_url()
            .ok()
            .and_then(|u| u.host_str().map(crate::url::strip_www))
            .unwrap_or_default()
    }
}

use listing_harvester::config::Config;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Configuration pointed at a mock directory, with all waits shortened
pub fn test_config(directory: &MockServer, output: &TempDir) -> Config {
    let mut config = Config::default();
    config.target.base_url = directory.uri();
    config.target.start_url = Some(format!("{}/suche", directory.uri()));
    config.browser.navigation_timeout_ms = 5_000;
    config.browser.selector_timeout_ms = 200;
    config.browser.consent_timeout_ms = 200;
    config.browser.settle_delay_ms = 0;
    config.scraping.delay_min_ms = 0;
    config.scraping.delay_max_ms = 0;
    config.scraping.retry.max_attempts = 3;
    config.scraping.retry.base_delay_ms = 10;
    config.scraping.retry.max_delay_ms = 100;
    config.scraping.retry.jitter_ms = 0;
    config.email.website_timeout_ms = 5_000;
    config.output.directory = output.path().display().to_string();
    config.output.debug_captures = false;
    config
}

/// A listing page with one entry container per `(name, href)` pair
pub fn listing_page(entries: &[(&str, &str)], next: Option<&str>) -> String {
    let entries: String = entries
        .iter()
        .map(|(name, href)| {
            format!(
                r#"<div class="result-list-entry__container">
                     <a class="result-list-entry-title entry-detail-link" href="{}">{}</a>
                   </div>"#,
                href, name
            )
        })
        .collect();
    let next = next
        .map(|href| format!(r#"<nav class="pagination"><a rel="next" href="{}">Weiter</a></nav>"#, href))
        .unwrap_or_default();

    format!(
        r#"<html><head><title>Suchergebnisse</title></head><body>
             <div class="result-list">{}</div>{}
           </body></html>"#,
        entries, next
    )
}

/// A detail page in the directory's markup
pub fn detail_page(name: &str, street: &str, city: &str, extra: &str) -> String {
    format!(
        r#"<html><head><title>{name}</title></head><body>
             <h1 class="title">{name}</h1>
             <div class="entry-detail-list">
               <div class="entry-detail-list__item">
                 <span class="entry-detail-list__icon--location"></span>
                 <div class="entry-detail-list__label"><span>{street}</span><span>{city}</span></div>
               </div>
             </div>
             {extra}
           </body></html>"#
    )
}

/// Serves `body` as HTML on GET `route`
pub async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Rows of a written CSV file, header excluded
pub fn read_rows(path: &std::path::Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).expect("Failed to open output");
    reader
        .records()
        .map(|row| {
            row.expect("Failed to read row")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}

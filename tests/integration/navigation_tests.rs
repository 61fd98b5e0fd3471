use crate::common::{listing_page, mount_html, test_config};
use listing_harvester::browser::HttpDriver;
use listing_harvester::crawler::{advance, Advance, Navigator};
use listing_harvester::{CrawlSession, HarvestError, PageKind};
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn navigator(config: &listing_harvester::Config) -> Navigator<HttpDriver> {
    let driver = HttpDriver::new(&config.browser).expect("Failed to build driver");
    Navigator::new(driver, config)
}

fn page_url(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), route)).unwrap()
}

#[tokio::test]
async fn test_retry_after_server_errors() {
    let server = MockServer::start().await;
    let output = TempDir::new().expect("Failed to create temp dir");

    // Registered first, so it answers the first two requests
    Mock::given(method("GET"))
        .and(path("/suche"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_html(
        &server,
        "/suche",
        listing_page(&[("Tischlerei Roth", "/branchenbuch/roth.html")], None),
    )
    .await;

    let config = test_config(&server, &output);
    let mut navigator = navigator(&config);
    let mut session = CrawlSession::new();

    let response = navigator
        .enter_listing(&mut session, &page_url(&server, "/suche"))
        .await
        .expect("Listing should load on the third attempt");

    assert!(response.ok);
    assert_eq!(navigator.backoff_delays().len(), 2);
    assert_eq!(navigator.backoff_delays()[0], Duration::from_millis(10));
    assert_eq!(navigator.backoff_delays()[1], Duration::from_millis(20));
    assert_eq!(session.page_kind(), PageKind::Listing);
    assert_eq!(session.page_count(), 1);
}

#[tokio::test]
async fn test_exhausted_retries_write_debug_capture() {
    let server = MockServer::start().await;
    let output = TempDir::new().expect("Failed to create temp dir");

    Mock::given(method("GET"))
        .and(path("/suche"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Wartungsarbeiten"))
        .mount(&server)
        .await;

    let mut config = test_config(&server, &output);
    config.scraping.retry.max_attempts = 2;
    config.output.debug_captures = true;

    let mut navigator = navigator(&config);
    let mut session = CrawlSession::new();

    let result = navigator
        .enter_listing(&mut session, &page_url(&server, "/suche"))
        .await;

    match result {
        Err(HarvestError::Navigation { attempts, .. }) => assert_eq!(attempts, 2),
        other => panic!("Expected navigation error, got {:?}", other.map(|r| r.status)),
    }
    assert_eq!(session.page_kind(), PageKind::Unknown);
    assert_eq!(navigator.backoff_delays().len(), 1);

    let capture = output.path().join("page_on_timeout.html");
    let content = std::fs::read_to_string(capture).expect("Debug capture missing");
    assert!(content.contains("Wartungsarbeiten"));
}

#[tokio::test]
async fn test_listing_without_markers_is_retried() {
    let server = MockServer::start().await;
    let output = TempDir::new().expect("Failed to create temp dir");

    mount_html(
        &server,
        "/suche",
        "<html><body><p>Bitte warten</p></body></html>".to_string(),
    )
    .await;

    let config = test_config(&server, &output);
    let mut navigator = navigator(&config);
    let mut session = CrawlSession::new();

    let result = navigator
        .enter_listing(&mut session, &page_url(&server, "/suche"))
        .await;

    assert!(matches!(
        result,
        Err(HarvestError::Navigation { attempts: 3, .. })
    ));
    assert_eq!(navigator.backoff_delays().len(), 2);
}

#[tokio::test]
async fn test_advance_follows_relative_next_link() {
    let server = MockServer::start().await;
    let output = TempDir::new().expect("Failed to create temp dir");

    mount_html(
        &server,
        "/liste/start",
        listing_page(&[("Gärtnerei Blum", "/branchenbuch/blum.html")], Some("seite-2")),
    )
    .await;
    mount_html(
        &server,
        "/liste/seite-2",
        listing_page(&[("Floristik Rose", "/branchenbuch/rose.html")], None),
    )
    .await;

    let config = test_config(&server, &output);
    let mut navigator = navigator(&config);
    let mut session = CrawlSession::new();

    navigator
        .enter_listing(&mut session, &page_url(&server, "/liste/start"))
        .await
        .expect("Start page failed");

    let step = advance(&mut navigator, &mut session, 10)
        .await
        .expect("Advance failed");
    assert_eq!(step, Advance::Moved(page_url(&server, "/liste/seite-2")));
    assert_eq!(session.page_count(), 2);

    let step = advance(&mut navigator, &mut session, 10)
        .await
        .expect("Advance failed");
    assert_eq!(step, Advance::NoMorePages);
    assert_eq!(session.page_count(), 2);
}

#[tokio::test]
async fn test_open_and_return_to_listing() {
    let server = MockServer::start().await;
    let output = TempDir::new().expect("Failed to create temp dir");

    mount_html(
        &server,
        "/suche",
        listing_page(&[("Optiker Klar", "/branchenbuch/klar.html")], None),
    )
    .await;
    mount_html(
        &server,
        "/branchenbuch/klar.html",
        "<html><body><h1 class=\"title\">Optiker Klar</h1></body></html>".to_string(),
    )
    .await;

    let config = test_config(&server, &output);
    let mut navigator = navigator(&config);
    let mut session = CrawlSession::new();
    let listing = page_url(&server, "/suche");

    navigator
        .enter_listing(&mut session, &listing)
        .await
        .expect("Listing failed");

    let opened = navigator
        .open_result(&mut session, 0)
        .await
        .expect("Open failed");
    let detail = page_url(&server, "/branchenbuch/klar.html");
    assert_eq!(opened, listing_harvester::crawler::OpenOutcome::Opened(detail.clone()));
    assert_eq!(session.page_kind(), PageKind::Detail);
    assert_eq!(session.current_detail_url(), Some(&detail));

    navigator
        .return_to_listing(&mut session)
        .await
        .expect("Return failed");
    assert_eq!(session.page_kind(), PageKind::Listing);
    assert_eq!(navigator.driver().history_len(), 0);

    // The same entry is not opened twice
    let again = navigator
        .open_result(&mut session, 0)
        .await
        .expect("Open failed");
    assert_eq!(again, listing_harvester::crawler::OpenOutcome::AlreadyVisited(detail));
}

#[tokio::test]
async fn test_click_targets_index_the_entry_list() {
    let server = MockServer::start().await;
    let output = TempDir::new().expect("Failed to create temp dir");

    // Entries without links are opened by clicking their container
    mount_html(
        &server,
        "/suche",
        r#"<html><body>
             <article data-entry-id="1">
               <div class="result-list-entry__container" data-href="/branchenbuch/eins.html">
                 <span class="result-list-entry-title">Firma Eins</span>
               </div>
             </article>
             <article data-entry-id="2">
               <div class="result-list-entry__container" data-href="/branchenbuch/zwei.html">
                 <span class="result-list-entry-title">Firma Zwei</span>
               </div>
             </article>
           </body></html>"#
            .to_string(),
    )
    .await;
    mount_html(
        &server,
        "/branchenbuch/zwei.html",
        "<html><body><h1 class=\"title\">Firma Zwei</h1></body></html>".to_string(),
    )
    .await;

    let config = test_config(&server, &output);
    let mut navigator = navigator(&config);
    let mut session = CrawlSession::new();

    navigator
        .enter_listing(&mut session, &page_url(&server, "/suche"))
        .await
        .expect("Listing failed");

    let opened = navigator
        .open_result(&mut session, 1)
        .await
        .expect("Open failed");
    assert_eq!(
        opened,
        listing_harvester::crawler::OpenOutcome::Opened(page_url(&server, "/branchenbuch/zwei.html"))
    );

    navigator
        .return_to_listing(&mut session)
        .await
        .expect("Return failed");
    let missing = navigator
        .open_result(&mut session, 2)
        .await
        .expect("Open failed");
    assert_eq!(missing, listing_harvester::crawler::OpenOutcome::Missing);
}

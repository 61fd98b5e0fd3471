use crate::common::{detail_page, listing_page, mount_html, read_rows, test_config};
use listing_harvester::output::{validate_csv, CSV_HEADER};
use listing_harvester::{Coordinator, Interrupt, PageKind};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Serves a detail page and raises the interrupt while doing so
struct InterruptingDetail {
    interrupt: Interrupt,
    body: String,
}

impl Respond for InterruptingDetail {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.interrupt.trigger();
        ResponseTemplate::new(200)
            .set_body_string(self.body.clone())
            .insert_header("content-type", "text/html")
    }
}

#[tokio::test]
async fn test_crawl_two_listing_pages() {
    let server = MockServer::start().await;
    let output = TempDir::new().expect("Failed to create temp dir");

    mount_html(
        &server,
        "/suche",
        listing_page(
            &[("Hausverwaltung Meyer", "/branchenbuch/meyer.html")],
            Some("/suche/seite-2"),
        ),
    )
    .await;
    mount_html(
        &server,
        "/suche/seite-2",
        listing_page(&[("Malerbetrieb Schulz", "/branchenbuch/schulz.html")], None),
    )
    .await;
    mount_html(
        &server,
        "/branchenbuch/meyer.html",
        detail_page(
            "Hausverwaltung Meyer",
            "Königsallee 12",
            "40212 Düsseldorf",
            r#"<a href="mailto:info@meyer-hv.de">E-Mail schreiben</a>"#,
        ),
    )
    .await;
    mount_html(
        &server,
        "/branchenbuch/schulz.html",
        detail_page(
            "Malerbetrieb Schulz",
            "Kölner Straße 5",
            "40211 Düsseldorf",
            r#"<a href="mailto:buero@maler-schulz.de">E-Mail schreiben</a>"#,
        ),
    )
    .await;

    let config = test_config(&server, &output);
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let outcome = coordinator.run().await.expect("Crawl failed");

    assert!(!outcome.interrupted);
    assert_eq!(outcome.stats.pages_processed, 2);
    assert_eq!(outcome.stats.companies_found, 2);
    assert_eq!(outcome.stats.emails_extracted, 2);
    assert_eq!(outcome.stats.errors, 0);

    let names: Vec<&str> = outcome.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Hausverwaltung Meyer", "Malerbetrieb Schulz"]);
    assert_eq!(outcome.records[0].email.as_deref(), Some("info@meyer-hv.de"));
    assert_eq!(outcome.records[1].email.as_deref(), Some("buero@maler-schulz.de"));

    let path = outcome.output.expect("No output written");
    assert_eq!(validate_csv(&path).expect("Invalid CSV"), 2);

    let mut reader = csv::Reader::from_path(&path).expect("Failed to open output");
    let header: Vec<String> = reader
        .headers()
        .expect("Missing header")
        .iter()
        .map(str::to_string)
        .collect();
    assert_eq!(header, CSV_HEADER);

    let rows = read_rows(&path);
    assert_eq!(rows[0][0], "Hausverwaltung Meyer");
    assert_eq!(rows[0][1], "Königsallee 12 40212 Düsseldorf");
    assert_eq!(rows[0][4], "info@meyer-hv.de");
    assert_eq!(rows[1][4], "buero@maler-schulz.de");
}

#[tokio::test]
async fn test_detail_page_without_markup() {
    let server = MockServer::start().await;
    let output = TempDir::new().expect("Failed to create temp dir");

    mount_html(
        &server,
        "/suche",
        listing_page(&[("Unbekannt", "/branchenbuch/leer.html")], None),
    )
    .await;
    mount_html(
        &server,
        "/branchenbuch/leer.html",
        "<html><body><p>Dieser Eintrag ist nicht mehr verfügbar.</p></body></html>".to_string(),
    )
    .await;

    let config = test_config(&server, &output);
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let outcome = coordinator.run().await.expect("Crawl failed");

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.stats.pages_processed, 1);
    assert_eq!(outcome.stats.companies_found, 0);
    assert_eq!(outcome.stats.errors, 0);

    // The file exists with its header even without records
    let path = outcome.output.expect("No output written");
    assert_eq!(validate_csv(&path).expect("Invalid CSV"), 0);
}

#[tokio::test]
async fn test_duplicate_companies_written_once() {
    let server = MockServer::start().await;
    let output = TempDir::new().expect("Failed to create temp dir");

    mount_html(
        &server,
        "/suche",
        listing_page(
            &[
                ("Autohaus Berg", "/branchenbuch/berg-1.html"),
                ("Autohaus Berg", "/branchenbuch/berg-2.html"),
            ],
            None,
        ),
    )
    .await;
    for route in ["/branchenbuch/berg-1.html", "/branchenbuch/berg-2.html"] {
        mount_html(
            &server,
            route,
            detail_page("Autohaus Berg", "Hauptstr. 3", "50667 Köln", ""),
        )
        .await;
    }

    let mut config = test_config(&server, &output);
    config.scraping.entries_per_page = 2;
    config.email.enabled = false;

    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let outcome = coordinator.run().await.expect("Crawl failed");

    assert_eq!(outcome.stats.companies_found, 2);
    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.records[0].email.is_none());

    let path = outcome.output.expect("No output written");
    let rows = read_rows(&path);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "Autohaus Berg");
    assert_eq!(rows[0][4], "");
}

#[tokio::test]
async fn test_page_limit_stops_traversal() {
    let server = MockServer::start().await;
    let output = TempDir::new().expect("Failed to create temp dir");

    mount_html(
        &server,
        "/suche",
        listing_page(&[("Bäckerei Lang", "/branchenbuch/lang.html")], Some("/suche/seite-2")),
    )
    .await;
    mount_html(
        &server,
        "/branchenbuch/lang.html",
        detail_page("Bäckerei Lang", "Marktplatz 1", "53111 Bonn", ""),
    )
    .await;

    let mut config = test_config(&server, &output);
    config.scraping.max_pages = 1;
    config.email.enabled = false;

    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let outcome = coordinator.run().await.expect("Crawl failed");

    assert_eq!(outcome.stats.pages_processed, 1);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.stats.errors, 0);

    let requests = server.received_requests().await.expect("Recording disabled");
    assert!(requests.iter().all(|r| r.url.path() != "/suche/seite-2"));
}

#[tokio::test]
async fn test_unreachable_start_page_still_writes_file() {
    let server = MockServer::start().await;
    let output = TempDir::new().expect("Failed to create temp dir");

    // Nothing is mounted: every request answers 404, which is retried
    let mut config = test_config(&server, &output);
    config.scraping.retry.max_attempts = 2;

    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let outcome = coordinator.run().await.expect("Run should not fail");

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.stats.pages_processed, 0);
    assert_eq!(outcome.stats.errors, 1);
    assert_eq!(coordinator.session().page_kind(), PageKind::Unknown);

    let path = outcome.output.expect("No output written");
    assert_eq!(validate_csv(&path).expect("Invalid CSV"), 0);
}

#[tokio::test]
async fn test_nested_entry_markers_open_every_entry() {
    let server = MockServer::start().await;
    let output = TempDir::new().expect("Failed to create temp dir");

    mount_html(
        &server,
        "/suche",
        r#"<html><body>
             <article data-entry-id="1"><div class="result-list-entry__container">
               <a class="result-list-entry-title" href="/branchenbuch/a.html">Firma A</a>
             </div></article>
             <article data-entry-id="2"><div class="result-list-entry__container">
               <a class="result-list-entry-title" href="/branchenbuch/b.html">Firma B</a>
             </div></article>
           </body></html>"#
            .to_string(),
    )
    .await;
    mount_html(
        &server,
        "/branchenbuch/a.html",
        detail_page("Firma A", "Ostwall 1", "47798 Krefeld", ""),
    )
    .await;
    mount_html(
        &server,
        "/branchenbuch/b.html",
        detail_page("Firma B", "Westwall 2", "47798 Krefeld", ""),
    )
    .await;

    let mut config = test_config(&server, &output);
    config.scraping.entries_per_page = 2;
    config.email.enabled = false;

    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let outcome = coordinator.run().await.expect("Crawl failed");

    let names: Vec<&str> = outcome.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Firma A", "Firma B"]);
    assert_eq!(outcome.stats.errors, 0);
}

#[tokio::test]
async fn test_test_mode_stops_at_record_limit() {
    let server = MockServer::start().await;
    let output = TempDir::new().expect("Failed to create temp dir");

    mount_html(
        &server,
        "/suche",
        listing_page(&[("Metzgerei Horn", "/branchenbuch/horn.html")], Some("/suche/seite-2")),
    )
    .await;
    mount_html(
        &server,
        "/suche/seite-2",
        listing_page(&[("Konditorei Stern", "/branchenbuch/stern.html")], None),
    )
    .await;
    mount_html(
        &server,
        "/branchenbuch/horn.html",
        detail_page("Metzgerei Horn", "Kirchgasse 4", "55116 Mainz", ""),
    )
    .await;
    mount_html(
        &server,
        "/branchenbuch/stern.html",
        detail_page("Konditorei Stern", "Rheinstraße 8", "55116 Mainz", ""),
    )
    .await;

    let mut config = test_config(&server, &output);
    config.scraping.test_mode = true;
    config.scraping.test_record_limit = 1;
    config.email.enabled = false;

    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let outcome = coordinator.run().await.expect("Crawl failed");

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].name, "Metzgerei Horn");
    assert_eq!(outcome.stats.pages_processed, 1);

    let requests = server.received_requests().await.expect("Recording disabled");
    assert!(requests.iter().all(|r| r.url.path() != "/suche/seite-2"));
}

#[tokio::test]
async fn test_interrupt_on_detail_page_skips_return() {
    let server = MockServer::start().await;
    let output = TempDir::new().expect("Failed to create temp dir");
    let interrupt = Interrupt::new();

    mount_html(
        &server,
        "/suche",
        listing_page(&[("Weinhandel Kern", "/branchenbuch/kern.html")], Some("/suche/seite-2")),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/branchenbuch/kern.html"))
        .respond_with(InterruptingDetail {
            interrupt: interrupt.clone(),
            body: detail_page(
                "Weinhandel Kern",
                "Weinstraße 3",
                "67433 Neustadt",
                r#"<a href="mailto:verkauf@weinhandel-kern.de">E-Mail</a>"#,
            ),
        })
        .mount(&server)
        .await;

    let config = test_config(&server, &output);
    let mut coordinator = Coordinator::new(config)
        .expect("Failed to create coordinator")
        .with_interrupt(interrupt);
    let outcome = coordinator.run().await.expect("Run should not fail");

    assert!(outcome.interrupted);
    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.records[0].email.is_none());
    assert_eq!(outcome.stats.errors, 0);
    // No navigation back to the listing once interrupted
    assert_eq!(coordinator.session().page_kind(), PageKind::Detail);

    let requests = server.received_requests().await.expect("Recording disabled");
    assert_eq!(requests.len(), 2);

    let path = outcome.output.expect("No output written");
    assert_eq!(validate_csv(&path).expect("Invalid CSV"), 1);
}

#[tokio::test]
async fn test_unreadable_detail_page_is_a_miss() {
    let server = MockServer::start().await;
    let output = TempDir::new().expect("Failed to create temp dir");

    mount_html(
        &server,
        "/suche",
        listing_page(&[("Druckerei Blau", "/branchenbuch/blau.pdf")], None),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/branchenbuch/blau.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("%PDF-1.7")
                .insert_header("content-type", "application/pdf"),
        )
        .mount(&server)
        .await;

    let config = test_config(&server, &output);
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let outcome = coordinator.run().await.expect("Crawl failed");

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.stats.companies_found, 0);
    assert_eq!(outcome.stats.errors, 0);
}

use crate::common::{detail_page, listing_page, mount_html, read_rows, test_config};
use listing_harvester::Coordinator;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn website_link(url: &str) -> String {
    format!(
        r#"<a class="tracking--entry-detail-website-link" href="{}">Zur Website</a>"#,
        url
    )
}

#[tokio::test]
async fn test_email_from_website_and_imprint() {
    let directory = MockServer::start().await;
    let websites = MockServer::start().await;
    let output = TempDir::new().expect("Failed to create temp dir");

    mount_html(
        &directory,
        "/suche",
        listing_page(
            &[
                ("Dachdecker Kurz", "/branchenbuch/kurz.html"),
                ("Elektro Funke", "/branchenbuch/funke.html"),
                ("Dachdecker Kurz Filiale", "/branchenbuch/kurz-filiale.html"),
            ],
            None,
        ),
    )
    .await;
    mount_html(
        &directory,
        "/branchenbuch/kurz.html",
        detail_page(
            "Dachdecker Kurz",
            "Ringstraße 4",
            "45127 Essen",
            &website_link(&format!("{}/", websites.uri())),
        ),
    )
    .await;
    mount_html(
        &directory,
        "/branchenbuch/funke.html",
        detail_page(
            "Elektro Funke",
            "Bahnhofstraße 9",
            "45127 Essen",
            &website_link(&format!("{}/funke/", websites.uri())),
        ),
    )
    .await;
    mount_html(
        &directory,
        "/branchenbuch/kurz-filiale.html",
        detail_page(
            "Dachdecker Kurz Filiale",
            "Rüttenscheider Str. 80",
            "45130 Essen",
            &website_link(&format!("{}/", websites.uri())),
        ),
    )
    .await;

    // Shared homepage: loaded once and reused for the second record
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    "<html><body><h1>Dachdecker Kurz</h1>\
                     <footer>Schreiben Sie uns: info@dachdecker-kurz.de</footer></body></html>",
                )
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&websites)
        .await;
    mount_html(
        &websites,
        "/funke/",
        r#"<html><body><h1>Elektro Funke</h1>
             <nav><a href="/funke/leistungen">Leistungen</a><a href="/funke/impressum">Impressum</a></nav>
           </body></html>"#
            .to_string(),
    )
    .await;
    mount_html(
        &websites,
        "/funke/impressum",
        r#"<html><body><div class="impressum">E-Mail: kontakt@elektro-funke.de</div></body></html>"#
            .to_string(),
    )
    .await;

    let mut config = test_config(&directory, &output);
    config.scraping.entries_per_page = 3;

    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let outcome = coordinator.run().await.expect("Crawl failed");

    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.stats.emails_extracted, 3);
    assert_eq!(outcome.stats.errors, 0);

    let emails: Vec<Option<&str>> = outcome.records.iter().map(|r| r.email.as_deref()).collect();
    assert_eq!(
        emails,
        vec![
            Some("info@dachdecker-kurz.de"),
            Some("kontakt@elektro-funke.de"),
            Some("info@dachdecker-kurz.de"),
        ]
    );

    let path = outcome.output.expect("No output written");
    let rows = read_rows(&path);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][2], format!("{}/funke/", websites.uri()));
    assert_eq!(rows[1][4], "kontakt@elektro-funke.de");
}

#[tokio::test]
async fn test_structural_anchor_beats_full_text() {
    let server = MockServer::start().await;
    let output = TempDir::new().expect("Failed to create temp dir");

    mount_html(
        &server,
        "/suche",
        listing_page(&[("Kanzlei Vogt", "/branchenbuch/vogt.html")], None),
    )
    .await;
    mount_html(
        &server,
        "/branchenbuch/vogt.html",
        detail_page(
            "Kanzlei Vogt",
            "Domplatz 2",
            "48143 Münster",
            r#"<p>Bewerbungen bitte an karriere@kanzlei-vogt.de</p>
               <a id="box-email-link" href="mailto:sekretariat@kanzlei-vogt.de">E-Mail</a>"#,
        ),
    )
    .await;

    let config = test_config(&server, &output);
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let outcome = coordinator.run().await.expect("Crawl failed");

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(
        outcome.records[0].email.as_deref(),
        Some("sekretariat@kanzlei-vogt.de")
    );
}

#[tokio::test]
async fn test_unreachable_website_is_counted() {
    let directory = MockServer::start().await;
    let websites = MockServer::start().await;
    let output = TempDir::new().expect("Failed to create temp dir");

    mount_html(
        &directory,
        "/suche",
        listing_page(&[("Fahrschule Lenz", "/branchenbuch/lenz.html")], None),
    )
    .await;
    mount_html(
        &directory,
        "/branchenbuch/lenz.html",
        detail_page(
            "Fahrschule Lenz",
            "Lindenweg 7",
            "33602 Bielefeld",
            &website_link(&format!("{}/", websites.uri())),
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&websites)
        .await;

    let mut config = test_config(&directory, &output);
    config.scraping.retry.max_attempts = 1;

    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let outcome = coordinator.run().await.expect("Crawl failed");

    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.records[0].email.is_none());
    assert_eq!(outcome.stats.emails_extracted, 0);
    assert_eq!(outcome.stats.errors, 1);
}

#[tokio::test]
async fn test_email_pass_disabled() {
    let server = MockServer::start().await;
    let output = TempDir::new().expect("Failed to create temp dir");

    mount_html(
        &server,
        "/suche",
        listing_page(&[("Friseur Haar", "/branchenbuch/haar.html")], None),
    )
    .await;
    mount_html(
        &server,
        "/branchenbuch/haar.html",
        detail_page(
            "Friseur Haar",
            "Burgstraße 1",
            "01067 Dresden",
            r#"<a href="mailto:termin@friseur-haar.de">E-Mail</a>"#,
        ),
    )
    .await;

    let mut config = test_config(&server, &output);
    config.email.enabled = false;

    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let outcome = coordinator.run().await.expect("Crawl failed");

    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.records[0].email.is_none());
    assert_eq!(outcome.stats.emails_extracted, 0);

    let rows = read_rows(&outcome.output.expect("No output written"));
    assert_eq!(rows[0][4], "");
}

//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the directory site and its
//! document server, and run full crawls through the built-in page engine.

use ltc_reports::config::Config;
use ltc_reports::crawler::Coordinator;
use ltc_reports::storage::{read_ledger, Record};
use ltc_reports::LtcError;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LANDING_PATH: &str = "/en-ca/Search_Selection.aspx";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, dir: &Path) -> Config {
    let mut config = Config::default();
    config.site.landing_url = format!("{}{}", base_url, LANDING_PATH);
    config.crawl.retries = 2;
    config.crawl.retry_delay_ms = 5;
    config.crawl.settle_delay_ms = 0;
    config.output.report_dir = dir.join("reports");
    config.output.ledger_path = dir.join("ltc-records.json");
    config
}

fn landing_html(homes: &[(&str, &str)]) -> String {
    let items: String = homes
        .iter()
        .map(|(name, href)| format!(r#"<li><a href="{}">{}</a></li>"#, href, name))
        .collect();
    format!(
        r#"<html><body><div id="ctl00_ContentPlaceHolder1_rsResults"><ol>{}</ol></div></body></html>"#,
        items
    )
}

fn detail_html(documents: &[(&str, &str)]) -> String {
    let links: String = documents
        .iter()
        .map(|(title, href)| {
            format!(
                r#"<div class="divInspectionFileDataCol"><a href="{}">{}</a></div>"#,
                href, title
            )
        })
        .collect();
    format!(
        r#"<html><body>
        <a id="ctl00_ContentPlaceHolder1_aInspection" href="javascript:__doPostBack('aInspection','')">Inspections</a>
        {}
        </body></html>"#,
        links
    )
}

async fn mount_html(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_document(server: &MockServer, route: &str, body: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_colliding_titles_are_disambiguated() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_html(
        &mock_server,
        LANDING_PATH,
        landing_html(&[("A/B", "homes/ab")]),
    )
    .await;
    mount_html(
        &mock_server,
        "/en-ca/homes/ab",
        detail_html(&[("Report", "/docs/href1.pdf"), ("Report", "/docs/href2.pdf")]),
    )
    .await;
    mount_document(&mock_server, "/docs/href1.pdf", "first", 1).await;
    mount_document(&mock_server, "/docs/href2.pdf", "second", 1).await;

    let config = create_test_config(&mock_server.uri(), dir.path());
    let summary = Coordinator::from_config(config)
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(summary.documents_fetched, 2);
    assert_eq!(summary.documents_recorded, 2);

    let home_dir = dir.path().join("reports").join("A-B");
    assert_eq!(std::fs::read_to_string(home_dir.join("Report.pdf")).unwrap(), "first");
    assert_eq!(std::fs::read_to_string(home_dir.join("Report-1.pdf")).unwrap(), "second");

    let text = std::fs::read_to_string(dir.path().join("ltc-records.json")).unwrap();
    let records: Vec<Record> = serde_json::from_str(&text).expect("ledger is a JSON array");
    assert_eq!(
        records,
        vec![
            Record {
                uri: format!("{}/docs/href1.pdf", mock_server.uri()),
                home: "A-B".to_string(),
                title: "Report".to_string(),
                instance: 0,
            },
            Record {
                uri: format!("{}/docs/href2.pdf", mock_server.uri()),
                home: "A-B".to_string(),
                title: "Report".to_string(),
                instance: 1,
            },
        ]
    );
}

#[tokio::test]
async fn test_startat_skips_earlier_homes() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_html(
        &mock_server,
        LANDING_PATH,
        landing_html(&[
            ("Cedar", "homes/cedar"),
            ("Maple Grove", "homes/maple"),
            ("Oakwood", "homes/oak"),
        ]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/en-ca/homes/cedar"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_html(&[])))
        .expect(0)
        .mount(&mock_server)
        .await;
    mount_html(
        &mock_server,
        "/en-ca/homes/maple",
        detail_html(&[("Inspection 2024-01", "/docs/m1.pdf")]),
    )
    .await;
    mount_html(
        &mock_server,
        "/en-ca/homes/oak",
        detail_html(&[("Inspection 2024-02", "/docs/o1.pdf")]),
    )
    .await;
    mount_document(&mock_server, "/docs/m1.pdf", "m", 1).await;
    mount_document(&mock_server, "/docs/o1.pdf", "o", 1).await;

    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.crawl.start_at = Some("Maple Grove".to_string());

    let summary = Coordinator::from_config(config)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.facilities_listed, 3);
    assert_eq!(summary.facilities_selected, 2);
    assert_eq!(summary.facilities_completed, 2);
    assert!(!dir.path().join("reports").join("Cedar").exists());
    assert!(dir
        .path()
        .join("reports/Maple Grove/Inspection 2024-01.pdf")
        .exists());
    assert!(dir.path().join("reports/Oakwood/Inspection 2024-02.pdf").exists());
}

#[tokio::test]
async fn test_unreachable_home_is_abandoned() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_html(
        &mock_server,
        LANDING_PATH,
        landing_html(&[("Cedar", "homes/cedar"), ("Oakwood", "homes/oak")]),
    )
    .await;

    // two navigation attempts for each of two facility attempts
    Mock::given(method("GET"))
        .and(path("/en-ca/homes/cedar"))
        .respond_with(ResponseTemplate::new(500))
        .expect(4)
        .mount(&mock_server)
        .await;
    mount_html(
        &mock_server,
        "/en-ca/homes/oak",
        detail_html(&[("Report", "/docs/o1.pdf")]),
    )
    .await;
    mount_document(&mock_server, "/docs/o1.pdf", "o", 1).await;

    let config = create_test_config(&mock_server.uri(), dir.path());
    let summary = Coordinator::from_config(config)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.facilities_abandoned, vec!["Cedar".to_string()]);
    assert_eq!(summary.documents_fetched, 1);

    let contents = read_ledger(&dir.path().join("ltc-records.json")).unwrap();
    assert!(contents.complete);
    assert_eq!(contents.records.len(), 1);
    assert_eq!(contents.records[0].home, "Oakwood");
}

#[tokio::test]
async fn test_second_run_skips_existing_documents() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_html(
        &mock_server,
        LANDING_PATH,
        landing_html(&[("Cedar", "homes/cedar")]),
    )
    .await;
    mount_html(
        &mock_server,
        "/en-ca/homes/cedar",
        detail_html(&[
            ("Report", "/docs/c1.pdf"),
            ("Complaint", "/docs/c2.pdf"),
            ("Report", "/docs/c3.pdf"),
        ]),
    )
    .await;
    // each document is downloaded once across both runs
    mount_document(&mock_server, "/docs/c1.pdf", "c1", 1).await;
    mount_document(&mock_server, "/docs/c2.pdf", "c2", 1).await;
    mount_document(&mock_server, "/docs/c3.pdf", "c3", 1).await;

    let config = create_test_config(&mock_server.uri(), dir.path());
    let ledger_path = config.output.ledger_path.clone();

    let first = Coordinator::from_config(config.clone())
        .unwrap()
        .run()
        .await
        .unwrap();
    let first_records = read_ledger(&ledger_path).unwrap().records;

    let second = Coordinator::from_config(config)
        .unwrap()
        .run()
        .await
        .unwrap();
    let second_records = read_ledger(&ledger_path).unwrap().records;

    assert_eq!(first.documents_fetched, 3);
    assert_eq!(second.documents_fetched, 0);
    assert_eq!(second.documents_already_present(), 3);
    assert_eq!(first_records, second_records);
    assert_eq!(second_records.len(), 3);
    assert_eq!(second_records[2].instance, 1);

    let mut files: Vec<String> = std::fs::read_dir(dir.path().join("reports/Cedar"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(files, ["Complaint.pdf", "Report-1.pdf", "Report.pdf"]);
}

#[tokio::test]
async fn test_directory_without_documents_writes_empty_ledger() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_html(
        &mock_server,
        LANDING_PATH,
        landing_html(&[("Cedar", "homes/cedar")]),
    )
    .await;
    mount_html(&mock_server, "/en-ca/homes/cedar", detail_html(&[])).await;

    let config = create_test_config(&mock_server.uri(), dir.path());
    let summary = Coordinator::from_config(config)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.facilities_completed, 1);
    assert_eq!(summary.documents_recorded, 0);
    assert!(dir.path().join("reports/Cedar").is_dir());

    let text = std::fs::read_to_string(dir.path().join("ltc-records.json")).unwrap();
    let records: Vec<Record> = serde_json::from_str(&text).unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_reveal_control_that_links_to_document_list() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_html(
        &mock_server,
        LANDING_PATH,
        landing_html(&[("Cedar", "homes/cedar")]),
    )
    .await;
    mount_html(
        &mock_server,
        "/en-ca/homes/cedar",
        r#"<a id="ctl00_ContentPlaceHolder1_aInspection" href="cedar/inspections">Inspections</a>"#
            .to_string(),
    )
    .await;
    mount_html(
        &mock_server,
        "/en-ca/homes/cedar/inspections",
        detail_html(&[("Report", "/docs/c1.pdf")]),
    )
    .await;
    mount_document(&mock_server, "/docs/c1.pdf", "c1", 1).await;

    let config = create_test_config(&mock_server.uri(), dir.path());
    let summary = Coordinator::from_config(config)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.documents_fetched, 1);
    assert!(dir.path().join("reports/Cedar/Report.pdf").exists());
}

#[tokio::test]
async fn test_unreachable_landing_page_fails_run() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LANDING_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), dir.path());
    let result = Coordinator::from_config(config).unwrap().run().await;

    assert!(matches!(
        result,
        Err(LtcError::LandingPageUnreachable { attempts: 2, .. })
    ));

    let contents = read_ledger(&dir.path().join("ltc-records.json")).unwrap();
    assert!(contents.complete);
    assert!(contents.records.is_empty());
}

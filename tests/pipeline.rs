use std::io::Write;
use std::time::Duration;

use mockito::{Matcher, Server};
use pagecompare::compare::{FeatureOutcome, Metric};
use pagecompare::config::{AnalyzerConfig, ApiKey};
use pagecompare::extract::{HtmlExtractor, PageType};
use pagecompare::loader::{HttpPageLoader, PageFetchError};
use pagecompare::pipeline::Pipeline;
use pagecompare::serp::SerpClient;

const PAGE_ONE: &str =
    "<html><body><h1>Knee Replacement</h1><p>one two three four</p></body></html>";
const PAGE_THREE: &str = "<html><body><h1>Knee</h1><h2>Recovery</h2><p>alpha beta</p></body></html>";

#[tokio::test]
async fn test_knee_replacement_with_timed_out_page() {
    let mut server = Server::new_async().await;
    // The slow page gets its own server so it cannot hold up the others
    let mut slow_server = Server::new_async().await;

    let organic = serde_json::json!({
        "organic_results": [
            {"position": 1, "link": format!("{}/dallas/knee-replacement", server.url()), "title": "Knee Replacement | Ortho"},
            {"position": 2, "link": format!("{}/knee", slow_server.url()), "title": "Slow Clinic"},
            {"position": 3, "link": format!("{}/", server.url()), "title": "Ortho Home"}
        ]
    });

    let search = server
        .mock("GET", "/search")
        .match_query(Matcher::UrlEncoded("q".into(), "knee replacement".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(organic.to_string())
        .expect(1)
        .create_async()
        .await;
    let _page_one = server
        .mock("GET", "/dallas/knee-replacement")
        .with_status(200)
        .with_body(PAGE_ONE)
        .create_async()
        .await;
    let _page_three = server
        .mock("GET", "/")
        .with_status(200)
        .with_body(PAGE_THREE)
        .create_async()
        .await;
    let _slow = slow_server
        .mock("GET", "/knee")
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(Duration::from_secs(2));
            w.write_all(b"<html><body>too late</body></html>")
        })
        .create_async()
        .await;

    let config = AnalyzerConfig::builder()
        .serp_base_url(server.url())
        .num_results(3)
        .build();
    let pipeline = Pipeline::new(
        SerpClient::new(ApiKey::new("test-key").unwrap(), &config).unwrap(),
        HttpPageLoader::with_timeout("pagecompare-test", Duration::from_millis(300)).unwrap(),
        HtmlExtractor::default(),
        &config,
    );

    let report = pipeline.run("knee replacement").await.unwrap();
    search.assert_async().await;

    assert_eq!(report.query, "knee replacement");
    assert_eq!(report.rows.len(), 3);
    assert_eq!(
        report.rows.iter().map(|r| r.rank).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(
        report.rows[1].outcome,
        FeatureOutcome::Unavailable {
            error: PageFetchError::Timeout
        }
    );
    assert_eq!(report.rows[0].page_type, PageType::ProcedureLocation);
    assert_eq!(report.rows[2].page_type, PageType::Homepage);

    let aggregates = report.aggregates.as_ref().unwrap();
    assert_eq!(aggregates.pages, 2);
    assert_eq!(aggregates.mean(Metric::WordCount), Some(5.0));
    assert_eq!(aggregates.max(Metric::WordCount), Some(6.0));
    assert_eq!(aggregates.mean(Metric::H2), Some(0.5));
    assert_eq!(report.baseline_rank, Some(1));
    assert_eq!(
        report.delta_for(3).and_then(|d| d.get(Metric::WordCount)),
        Some(-2.0)
    );
    assert_eq!(report.unavailable().count(), 1);
}

#[tokio::test]
async fn test_search_with_no_results() {
    let mut server = Server::new_async().await;
    let _search = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"error": "Google hasn't returned any results for this query."}"#)
        .create_async()
        .await;

    let config = AnalyzerConfig::builder().serp_base_url(server.url()).build();
    let report = pagecompare::pipeline::analyze_keyword("zzqx procedure", &config, Some("key".into()))
        .await
        .unwrap();

    assert!(report.rows.is_empty());
    assert_eq!(report.aggregates, None);
}

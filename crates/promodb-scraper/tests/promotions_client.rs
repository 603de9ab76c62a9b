//! Integration tests for `PromotionsClient`.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no real
//! network traffic is made. Mocks are keyed on `storeId` and `offset` query
//! parameters, which is how the real API distinguishes pages.

use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use promodb_scraper::{ClientSettings, PromotionsClient, ScraperError, StoreQuery};

const ENDPOINT: &str = "/v1/promotions";

fn settings(page_size: u32) -> ClientSettings {
    ClientSettings {
        request_timeout_secs: 5,
        connect_timeout_secs: 5,
        user_agent: "promodb-test/0.1".to_owned(),
        page_size,
        ..ClientSettings::default()
    }
}

fn test_client(server: &MockServer, page_size: u32) -> PromotionsClient {
    PromotionsClient::new(&format!("{}{ENDPOINT}", server.uri()), &settings(page_size))
        .expect("failed to build test PromotionsClient")
}

fn record(id: &str, price: Option<i64>, old_price: Option<i64>) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("Товар {id}"),
        "description": "",
        "categoryName": "Бакалея",
        "articleCategory": "grocery",
        "discountCategory": "regular",
        "price": price,
        "oldPrice": old_price,
        "startDate": "2024-03-01",
        "endDate": "2024-03-14",
        "productCode": format!("pc-{id}"),
        "priority": 1,
        "type": "price",
        "alcohol": false,
        "image": "",
        "imageUrl": ""
    })
}

fn page(ids: &[&str]) -> serde_json::Value {
    let data: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| record(id, Some(80), Some(100)))
        .collect();
    json!({ "data": data })
}

fn empty_page() -> serde_json::Value {
    json!({ "data": [] })
}

async fn mount_page(
    server: &MockServer,
    store_id: &str,
    offset: &str,
    body: serde_json::Value,
    expected_calls: u64,
) {
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("storeId", store_id))
        .and(query_param("offset", offset))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Pagination over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_store_follows_offsets_until_empty_page() {
    let server = MockServer::start().await;

    mount_page(&server, "8958", "0", page(&["a", "b"]), 1).await;
    mount_page(&server, "8958", "2", page(&["c", "d"]), 1).await;
    mount_page(&server, "8958", "4", page(&["e"]), 1).await;
    mount_page(&server, "8958", "6", empty_page(), 1).await;

    let client = test_client(&server, 2);
    let promotions = client
        .fetch_store(&StoreQuery::new(8958))
        .await
        .expect("store fetch should succeed");

    let ids: Vec<&str> = promotions.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c", "d", "e"]);
    // `expect(1)` on every page verifies exactly four requests on drop.
}

#[tokio::test]
async fn fetch_store_with_empty_first_page_makes_one_request() {
    let server = MockServer::start().await;

    mount_page(&server, "1", "0", empty_page(), 1).await;

    let client = test_client(&server, 36);
    let promotions = client.fetch_store(&StoreQuery::new(1)).await.unwrap();

    assert!(promotions.is_empty());
}

#[tokio::test]
async fn fetch_store_sends_default_filters_and_page_size() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("storeId", "61350"))
        .and(query_param("sortBy", "priority"))
        .and(query_param("order", "desc"))
        .and(query_param("adult", "true"))
        .and(query_param("limit", "36"))
        .and(query_param_is_missing("categoryId"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&empty_page()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 36);
    let result = client.fetch_store(&StoreQuery::new(61350)).await;

    assert!(result.is_ok(), "expected Ok, got: {result:?}");
}

#[tokio::test]
async fn fetch_store_sends_category_when_set() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("categoryId", "4242"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&empty_page()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 36);
    let query = StoreQuery::new(1).with_category(Some(4242));
    assert!(client.fetch_store(&query).await.is_ok());
}

#[tokio::test]
async fn requests_carry_storefront_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(header("user-agent", "promodb-test/0.1"))
        .and(header("referer", "https://magnit.ru/"))
        .and(header("x-device-platform", "Web"))
        .and(header("x-device-id", "bm0h29is9e"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&empty_page()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 36);
    assert!(client.fetch_store(&StoreQuery::new(1)).await.is_ok());
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_success_status_is_an_error_not_an_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 36);
    let result = client.fetch_store(&StoreQuery::new(1)).await;

    match result {
        Err(ScraperError::UnexpectedStatus { status, url }) => {
            assert_eq!(status, 503);
            assert!(url.contains("storeId=1"), "url should identify the page: {url}");
        }
        other => panic!("expected ScraperError::UnexpectedStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn second_page_failure_discards_earlier_pages() {
    let server = MockServer::start().await;

    mount_page(&server, "1", "0", page(&["a", "b"]), 1).await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 2);
    let result = client.fetch_store(&StoreQuery::new(1)).await;

    assert!(
        matches!(result, Err(ScraperError::UnexpectedStatus { status: 500, .. })),
        "expected 500 from page 2, got: {result:?}"
    );
}

#[tokio::test]
async fn invalid_record_fails_the_whole_store() {
    let server = MockServer::start().await;

    let mut broken = record("bad", Some(1), Some(2));
    broken.as_object_mut().unwrap().remove("startDate");
    let body = json!({ "data": [record("ok", Some(1), Some(2)), broken] });

    mount_page(&server, "1", "0", body, 1).await;

    let client = test_client(&server, 36);
    let result = client.fetch_store(&StoreQuery::new(1)).await;

    match result {
        Err(ScraperError::Validation {
            store_id,
            offset,
            source,
        }) => {
            assert_eq!(store_id, 1);
            assert_eq!(offset, 0);
            assert_eq!(source.record_id, "bad");
        }
        other => panic!("expected ScraperError::Validation, got: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_envelope_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({ "items": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server, 36);
    let result = client.fetch_store(&StoreQuery::new(1)).await;

    assert!(
        matches!(result, Err(ScraperError::Deserialize { .. })),
        "expected ScraperError::Deserialize, got: {result:?}"
    );
}

#[tokio::test]
async fn endless_listing_hits_page_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(&["loop"])))
        .expect(3)
        .mount(&server)
        .await;

    let client = PromotionsClient::new(
        &format!("{}{ENDPOINT}", server.uri()),
        &ClientSettings {
            max_pages: 3,
            ..settings(1)
        },
    )
    .unwrap();
    let result = client.fetch_store(&StoreQuery::new(1)).await;

    assert!(
        matches!(result, Err(ScraperError::PaginationLimit(ref e)) if e.max_pages == 3),
        "expected PaginationLimit, got: {result:?}"
    );
}

// ---------------------------------------------------------------------------
// Multi-store retrieval
// ---------------------------------------------------------------------------

#[tokio::test]
async fn retrieve_isolates_store_failures() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("storeId", "1"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    mount_page(&server, "2", "0", page(&["x", "y", "z"]), 1).await;
    mount_page(&server, "2", "36", empty_page(), 1).await;

    let client = test_client(&server, 36);
    let retrieval = client.retrieve([1, 2], None).await;

    assert_eq!(retrieval.len(), 2);
    assert!(
        matches!(
            retrieval.get(1),
            Some(Err(ScraperError::UnexpectedStatus { status: 502, .. }))
        ),
        "store 1 should carry its error"
    );
    match retrieval.get(2) {
        Some(Ok(promotions)) => assert_eq!(promotions.len(), 3),
        other => panic!("store 2 should succeed with 3 promotions, got: {other:?}"),
    }

    let succeeded: Vec<u64> = retrieval.successes().map(|(id, _)| id).collect();
    let failed: Vec<u64> = retrieval.failures().map(|(id, _)| id).collect();
    assert_eq!(succeeded, [2]);
    assert_eq!(failed, [1]);
}

#[tokio::test]
async fn strict_mode_reports_first_failed_store() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("storeId", "7"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "3", "0", empty_page(), 1).await;

    let client = test_client(&server, 36);
    let failure = client
        .retrieve([3, 7], None)
        .await
        .into_strict()
        .expect_err("one failing store should fail strict mode");

    assert_eq!(failure.store_id, 7);
    assert!(matches!(
        failure.source,
        ScraperError::UnexpectedStatus { status: 500, .. }
    ));
}

#[tokio::test]
async fn strict_mode_returns_every_store_on_success() {
    let server = MockServer::start().await;

    mount_page(&server, "3", "0", page(&["a"]), 1).await;
    mount_page(&server, "3", "36", empty_page(), 1).await;
    mount_page(&server, "4", "0", empty_page(), 1).await;

    let client = test_client(&server, 36);
    let stores = client
        .retrieve([3, 4], None)
        .await
        .into_strict()
        .expect("all stores succeed");

    assert_eq!(stores.len(), 2);
    assert_eq!(stores[&3].len(), 1);
    assert!(stores[&4].is_empty());
}

#[tokio::test]
async fn retrieve_fetches_duplicate_store_once() {
    let server = MockServer::start().await;

    mount_page(&server, "5", "0", empty_page(), 1).await;

    let client = test_client(&server, 36);
    let retrieval = client.retrieve([5, 5, 5], None).await;

    assert_eq!(retrieval.len(), 1);
}

#[tokio::test]
async fn retrieve_with_no_stores_is_empty() {
    let server = MockServer::start().await;

    let client = test_client(&server, 36);
    let retrieval = client.retrieve(Vec::new(), Some(1)).await;

    assert!(retrieval.is_empty());
}

#[tokio::test]
async fn retrieve_passes_category_to_every_store() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("categoryId", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&empty_page()))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server, 36);
    let retrieval = client.retrieve([1, 2], Some(12)).await;

    assert_eq!(retrieval.successes().count(), 2);
}

// ---------------------------------------------------------------------------
// Concurrency and cancellation
// ---------------------------------------------------------------------------

const STORE_LATENCY: Duration = Duration::from_millis(400);

async fn mount_slow_empty_stores(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&empty_page())
                .set_delay(STORE_LATENCY),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn stores_are_fetched_concurrently() {
    let server = MockServer::start().await;
    mount_slow_empty_stores(&server).await;

    let client = test_client(&server, 36);
    let started = Instant::now();
    let retrieval = client.retrieve([1, 2, 3, 4], None).await;
    let elapsed = started.elapsed();

    assert_eq!(retrieval.successes().count(), 4);
    // Sequential fetching would take 4 * 400ms.
    assert!(
        elapsed < STORE_LATENCY * 3,
        "expected overlapping fetches, took {elapsed:?}"
    );
}

#[tokio::test]
async fn concurrency_cap_of_one_fetches_stores_in_turn() {
    let server = MockServer::start().await;
    mount_slow_empty_stores(&server).await;

    let client = PromotionsClient::new(
        &format!("{}{ENDPOINT}", server.uri()),
        &ClientSettings {
            max_concurrent_stores: 1,
            ..settings(36)
        },
    )
    .unwrap();
    let started = Instant::now();
    let retrieval = client.retrieve([1, 2, 3], None).await;
    let elapsed = started.elapsed();

    assert_eq!(retrieval.successes().count(), 3);
    assert!(
        elapsed >= STORE_LATENCY * 3,
        "expected serial fetches, took {elapsed:?}"
    );
}

#[tokio::test]
async fn dropping_retrieval_cancels_in_flight_stores() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&empty_page())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = test_client(&server, 36);
    let started = Instant::now();
    let outcome =
        tokio::time::timeout(Duration::from_millis(200), client.retrieve([1, 2], None)).await;

    assert!(outcome.is_err(), "retrieval should have been cancelled");
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "cancellation should not wait for in-flight requests"
    );
}

#[tokio::test]
async fn slow_response_past_request_timeout_is_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&empty_page())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = PromotionsClient::new(
        &format!("{}{ENDPOINT}", server.uri()),
        &ClientSettings {
            request_timeout_secs: 1,
            ..settings(36)
        },
    )
    .unwrap();
    let retrieval = client.retrieve([1], None).await;

    match retrieval.get(1) {
        Some(Err(ScraperError::Http(e))) => assert!(e.is_timeout(), "expected timeout: {e}"),
        other => panic!("expected ScraperError::Http timeout, got: {other:?}"),
    }
}

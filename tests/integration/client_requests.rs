// HTTP endpoint tests against a wiremock server
//
// Each test mounts the endpoint it exercises and checks the request the client
// produced (method, path, query, headers, body) and how the response is surfaced.

use chrono::NaiveDate;
use onec_api_client::api::{
    Detail, GenerateDataRequest, MetricsRange, OneCApiClient, ReportRequest,
};
use onec_api_client::RequestError;
use serde_json::json;
use wiremock::matchers::{bearer_token, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-jwt-token";

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

async fn setup() -> (MockServer, OneCApiClient) {
    let server = MockServer::start().await;
    let client = OneCApiClient::new(&format!("{}/v1", server.uri()), TOKEN).unwrap();
    (server, client)
}

fn query_pairs(request: &wiremock::Request) -> Vec<(String, String)> {
    request
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[tokio::test]
async fn test_top_products_sends_four_params_and_headers() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/reports/top-products"))
        .and(bearer_token(TOKEN))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"product": "Office chair", "sales_count": 340, "sales_amount": 1530000.0, "period": "2024-01"},
                {"product": "Desk lamp", "sales_count": 215, "sales_amount": 322500.0, "period": "2024-01"}
            ],
            "metadata": {"generated_in": 0.087, "cached": false}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ReportRequest::new(date("2024-01-01"), date("2024-01-31"))
        .detail(Detail::Day)
        .limit(2);
    let report = client.get_top_products(&request).await.unwrap();

    assert!(report.success);
    assert_eq!(report.data.len(), 2);
    assert_eq!(report.data[0].product, "Office chair");
    assert_eq!(report.data[1].sales_count, 215);
    let metadata = report.metadata.unwrap();
    assert_eq!(metadata.generated_in, 0.087);
    assert!(!metadata.cached);

    let received = server.received_requests().await.unwrap();
    assert_eq!(
        query_pairs(&received[0]),
        vec![
            ("start_date".to_string(), "2024-01-01".to_string()),
            ("end_date".to_string(), "2024-01-31".to_string()),
            ("detail".to_string(), "day".to_string()),
            ("limit".to_string(), "2".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_logical_failure_is_returned_not_raised() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/reports/top-products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": {"code": "INVALID_PERIOD", "message": "start_date must not be after end_date"}
        })))
        .mount(&server)
        .await;

    let request = ReportRequest::new(date("2024-02-01"), date("2024-01-01"));
    let report = client.get_top_products(&request).await.unwrap();

    assert!(!report.success);
    assert!(report.data.is_empty());
    let error = report.error.unwrap();
    assert_eq!(error.code, "INVALID_PERIOD");
    assert_eq!(error.message, "start_date must not be after end_date");
}

#[tokio::test]
async fn test_logical_failure_with_null_data_is_returned() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/reports/top-products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "data": null,
            "error": {"code": "NO_DATA", "message": "No sales in period"}
        })))
        .mount(&server)
        .await;

    let request = ReportRequest::new(date("2024-01-01"), date("2024-01-31"));
    let report = client.get_top_products(&request).await.unwrap();

    assert!(!report.success);
    assert!(report.data.is_empty());
    let error = report.error.unwrap();
    assert_eq!(error.code, "NO_DATA");
    assert_eq!(error.message, "No sales in period");
}

#[tokio::test]
async fn test_logical_failure_with_numeric_code_is_returned() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/reports/top-products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": {"code": 400, "message": "limit must be positive"}
        })))
        .mount(&server)
        .await;

    let request = ReportRequest::new(date("2024-01-01"), date("2024-01-31"));
    let report = client.get_top_products(&request).await.unwrap();

    assert!(!report.success);
    let error = report.error.unwrap();
    assert_eq!(error.code, "400");
    assert_eq!(error.message, "limit must be positive");
}

#[tokio::test]
async fn test_non_2xx_raises_with_server_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/reports/top-products"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "error": {"code": "UNAUTHORIZED", "message": "Token expired"}
        })))
        .mount(&server)
        .await;

    let request = ReportRequest::new(date("2024-01-01"), date("2024-01-31"));
    let err = client.get_top_products(&request).await.unwrap_err();

    match err {
        RequestError::Status {
            status,
            code,
            message,
            url,
        } => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(code.as_deref(), Some("UNAUTHORIZED"));
            assert_eq!(message, "Token expired");
            assert!(url.contains("/v1/reports/top-products"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_2xx_raises_regardless_of_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/cache/invalidate"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/monitoring/slow-queries"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client.invalidate_cache(None).await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(500));

    let err = client.get_slow_queries(20).await.unwrap_err();
    match err {
        RequestError::Status { status, code, message, .. } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(code, None);
            assert_eq!(message, "Service Unavailable");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generate_test_data_posts_json_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/test/generate-data"))
        .and(bearer_token(TOKEN))
        .and(body_json(json!({
            "days_count": 365,
            "sales_per_day": 100,
            "products_count": 1000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "36500 sales generated"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client
        .generate_test_data(&GenerateDataRequest::default())
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.message.as_deref(), Some("36500 sales generated"));
}

#[tokio::test]
async fn test_slow_queries_unwraps_data() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/monitoring/slow-queries"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"query_name": "TopProductsByMonth", "avg_duration": 2.4312, "call_count": 48},
                {"query_name": "SalesRegister", "avg_duration": 1.05, "call_count": 310}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let queries = client.get_slow_queries(5).await.unwrap();

    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].query_name, "TopProductsByMonth");
    assert_eq!(queries[0].call_count, 48);
    assert_eq!(queries[1].avg_duration, 1.05);
}

#[tokio::test]
async fn test_slow_queries_logical_failure_yields_empty_list() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/monitoring/slow-queries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": {"code": "MONITORING_DISABLED", "message": "Query log is off"}
        })))
        .mount(&server)
        .await;

    let queries = client.get_slow_queries(20).await.unwrap();
    assert!(queries.is_empty());
}

#[tokio::test]
async fn test_invalidate_all_omits_date() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/cache/invalidate"))
        .and(bearer_token(TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.invalidate_cache(None).await.unwrap());

    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].url.query(), None);
}

#[tokio::test]
async fn test_invalidate_single_date() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/cache/invalidate"))
        .and(query_param("date", "2024-01-15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.invalidate_cache(Some(date("2024-01-15"))).await.unwrap());

    let received = server.received_requests().await.unwrap();
    assert_eq!(
        query_pairs(&received[0]),
        vec![("date".to_string(), "2024-01-15".to_string())]
    );
}

#[tokio::test]
async fn test_invalidate_reports_logical_failure_as_false() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/cache/invalidate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": {"code": "CACHE_LOCKED", "message": "Rebuild in progress"}
        })))
        .mount(&server)
        .await;

    assert!(!client.invalidate_cache(None).await.unwrap());
}

#[tokio::test]
async fn test_performance_metrics_range() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/monitoring/metrics"))
        .and(query_param("range", "24h"))
        .and(bearer_token(TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"requests": 1520, "avg_response_time": 0.21, "cache_hit_ratio": 0.83}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let metrics = client
        .get_performance_metrics(MetricsRange::LastDay)
        .await
        .unwrap();

    assert!(metrics.success);
    assert_eq!(metrics.data["requests"], 1520);
    assert_eq!(metrics.data["cache_hit_ratio"], 0.83);
}

#[tokio::test]
async fn test_invalid_json_is_a_decode_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/monitoring/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client
        .get_performance_metrics(MetricsRange::LastHour)
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Decode { .. }));
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_error() {
    // Grab a free port and release it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = OneCApiClient::new(&format!("http://{}/v1", addr), TOKEN).unwrap();
    let err = client.invalidate_cache(None).await.unwrap_err();

    assert!(matches!(err, RequestError::Transport(_)));
    assert_eq!(err.status(), None);
}

use axum::body::Body;
use axum::http::{Request, StatusCode};
use customer_lookup::api::build_router;
use customer_lookup::{CsvSource, Field, LookupService, RecordSource, SnapshotStore};
use http_body_util::BodyExt;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;

const CUSTOMERS: &str = "\
contract_code;phone_number;activation_date;platform;status;average_arpu;service_type;num_contact_tec;num_contact_amm;bb_active;user_name
12345678;3331234567;2021-01-01T15:38:01Z;Q BLACK;ATTIVO;50;TV;3;1;1;Mario Rossi
87654321;+39 347 893 3194;2019-07-15 09:12:00;Q PLUS;CESSATO;23.40;BB;;;;
55555555;3331234567;2023-03-03T10:00:00Z;Q SILVER;ATTIVO;99;TV;8;2;0;Luca Verdi
";

const DEFAULT_FIELDS: [Field; 6] = [
    Field::ContractCode,
    Field::Platform,
    Field::Status,
    Field::AverageArpu,
    Field::ServiceType,
    Field::ActivationDate,
];

async fn build_test_app() -> (axum::Router, NamedTempFile) {
    build_test_app_with_cors(true).await
}

async fn build_test_app_with_cors(cors: bool) -> (axum::Router, NamedTempFile) {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(CUSTOMERS.as_bytes()).unwrap();

    let source: Arc<dyn RecordSource> = Arc::new(CsvSource::new(file.path(), b';'));
    let store = Arc::new(SnapshotStore::load(source).await.unwrap());
    let service = Arc::new(LookupService::new(store, DEFAULT_FIELDS.to_vec()));
    (build_router(service, cors), file)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or_else(
        |_| serde_json::json!({ "raw": String::from_utf8_lossy(&bytes).to_string() }),
    );
    (status, json)
}

#[tokio::test]
async fn test_phone_lookup_returns_default_fields() {
    let (app, _file) = build_test_app().await;
    let (status, body) = get(app, "/customer/phone/3331234567").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({
            "data": {
                "contract_code": "12345678",
                "platform": "Q BLACK",
                "status": "ATTIVO",
                "average_arpu": "50",
                "service_type": "TV",
                "activation_date": "2021-01-01T15:38:01Z"
            }
        })
    );
}

#[tokio::test]
async fn test_phone_lookup_with_fields() {
    let (app, _file) = build_test_app().await;
    let (status, body) = get(app, "/customer/phone/3331234567?fields=contract_code,platform").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({ "data": { "contract_code": "12345678", "platform": "Q BLACK" } })
    );
}

#[tokio::test]
async fn test_phone_number_can_be_requested_explicitly() {
    let (app, _file) = build_test_app().await;
    let (status, body) = get(app, "/customer/phone/0039%20347%20893%203194?fields=phone_number,activation_date").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["phone_number"], "+39 347 893 3194");
    assert_eq!(body["data"]["activation_date"], "2019-07-15T09:12:00Z");
}

#[tokio::test]
async fn test_unknown_phone_is_404() {
    let (app, _file) = build_test_app().await;
    let (status, body) = get(app, "/customer/phone/0000000000").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().contains("0000000000"));
}

#[tokio::test]
async fn test_invalid_field_is_400_and_named() {
    let (app, _file) = build_test_app().await;
    let (status, body) = get(app, "/customer/phone/3331234567?fields=platform,email").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["invalid_fields"], serde_json::json!(["email"]));
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_contract_lookup() {
    let (app, _file) = build_test_app().await;

    // The duplicate phone row stays reachable through its contract code.
    let (status, body) = get(app.clone(), "/customer/contract/55555555?fields=platform").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "data": { "platform": "Q SILVER" } }));

    let (status, _) = get(app, "/customer/contract/00000000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_root() {
    let (app, _file) = build_test_app().await;

    let (status, body) = get(app.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["records"], 3);
    assert_eq!(body["indexed_phones"], 2);
    assert_eq!(body["duplicate_phones"], 1);

    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["raw"], "API is running");
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let (app, _file) = build_test_app().await;
    let first = get(app.clone(), "/customer/phone/3331234567?fields=status,average_arpu").await;
    let second = get(app, "/customer/phone/3331234567?fields=status,average_arpu").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_repeated_fields_parameters_are_merged() {
    let (app, _file) = build_test_app().await;
    let (status, body) = get(app, "/customer/phone/3331234567?fields=status&fields=platform").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({ "data": { "status": "ATTIVO", "platform": "Q BLACK" } })
    );
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (app, _file) = build_test_app().await;

    for uri in ["/customer/email/someone", "/nothing/here"] {
        let (status, body) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body["detail"].is_string(), "{uri}: {body}");
    }
}

#[tokio::test]
async fn test_counters_by_contract_code() {
    let (app, _file) = build_test_app().await;

    let (status, body) = get(app.clone(), "/customer/numTec/12345678").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "num_contact_tec": 3 }));

    let (_, body) = get(app.clone(), "/customer/numAmm/55555555").await;
    assert_eq!(body, serde_json::json!({ "num_contact_amm": 2 }));

    let (_, body) = get(app.clone(), "/customer/wifiActive/12345678").await;
    assert_eq!(body, serde_json::json!({ "bb_active": 1 }));

    let (_, body) = get(app.clone(), "/customer/userName/55555555").await;
    assert_eq!(body, serde_json::json!({ "user_name": "Luca Verdi" }));

    // Blank cells read as zero or empty.
    let (_, body) = get(app.clone(), "/customer/numTec/87654321").await;
    assert_eq!(body, serde_json::json!({ "num_contact_tec": 0 }));
    let (_, body) = get(app.clone(), "/customer/userName/87654321").await;
    assert_eq!(body, serde_json::json!({ "user_name": "" }));

    let (status, body) = get(app, "/customer/numTec/00000000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().contains("00000000"));
}

#[tokio::test]
async fn test_counters_by_phone_number() {
    let (app, _file) = build_test_app().await;

    // First row wins for the shared number.
    let (status, body) = get(app.clone(), "/phone/numTec/333-123-4567").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "num_contact_tec": 3 }));

    let (_, body) = get(app.clone(), "/phone/userName/3331234567").await;
    assert_eq!(body, serde_json::json!({ "user_name": "Mario Rossi" }));

    let (_, body) = get(app.clone(), "/phone/wifiActive/+393478933194").await;
    assert_eq!(body, serde_json::json!({ "bb_active": 0 }));

    let (status, body) = get(app, "/phone/numAmm/0000000000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().contains("0000000000"));
}

async fn allow_origin(app: axum::Router) -> Option<String> {
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/customer/phone/3331234567")
                .header("origin", "http://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    resp.headers()
        .get("access-control-allow-origin")
        .map(|v| v.to_str().unwrap().to_string())
}

#[tokio::test]
async fn test_cors_headers_when_enabled() {
    let (app, _file) = build_test_app_with_cors(true).await;
    assert_eq!(allow_origin(app).await.as_deref(), Some("*"));
}

#[tokio::test]
async fn test_no_cors_headers_when_disabled() {
    let (app, _file) = build_test_app_with_cors(false).await;
    assert_eq!(allow_origin(app).await, None);
}

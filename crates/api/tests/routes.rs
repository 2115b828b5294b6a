//! Route-level coverage for the HTTP surface.
//!
//! Drives the full stack (router → services → SQLite) with in-process
//! requests against a temporary database.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use debitum_app::{router, AppContext};
use debitum_domain::Config;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    #[allow(dead_code)]
    temp_dir: TempDir,
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let mut config = Config::default();
        config.database.path =
            temp_dir.path().join("routes.db").to_string_lossy().into_owned();

        let ctx = AppContext::init(config).expect("context should initialise");
        Self { temp_dir, router: router(ctx) }
    }

    async fn request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response =
            self.router.clone().oneshot(request).await.expect("request should complete");
        let status = response.status();
        let bytes =
            response.into_body().collect().await.expect("body should collect").to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body should be JSON")
        };
        (status, body)
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("x-user-id", "anna")
            .body(Body::from(body.to_string()))
            .expect("request should build");
        self.request(request).await
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request =
            Request::builder().uri(uri).body(Body::empty()).expect("request should build");
        self.request(request).await
    }
}

async fn seed_customer(app: &TestApp, name: &str, number: &str) -> String {
    let (status, body) =
        app.post("/customers", json!({ "name": name, "customer_number": number })).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().expect("customer id").to_string()
}

async fn seed_timebank_agreement(app: &TestApp, customer_id: &str) -> String {
    let (status, body) = app
        .post(
            "/agreements",
            json!({
                "customer_id": customer_id,
                "agreement_type": "timebank",
                "hourly_rate": 100_000,
                "overtime_rate": 120_000,
                "included_hours": 10.0,
                "fixed_amount": null,
                "period": "monthly",
                "valid_from": "2026-01-01",
                "valid_to": null
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "agreement creation failed: {body}");
    body["id"].as_str().expect("agreement id").to_string()
}

async fn journal_entry(
    app: &TestApp,
    customer_id: &str,
    agreement_id: &str,
    day: u32,
    hours: f64,
) -> Value {
    let (status, body) = app
        .post(
            "/time-entries",
            json!({
                "agreement_id": agreement_id,
                "entry": {
                    "customer_id": customer_id,
                    "assignment_id": null,
                    "entry_date": format!("2026-01-{day:02}"),
                    "hours": hours,
                    "description": "konsultation"
                }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "journaling failed: {body}");
    body
}

#[tokio::test(flavor = "multi_thread")]
async fn health_endpoint_reports_ok() {
    let app = TestApp::new();
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test(flavor = "multi_thread")]
async fn classification_surfaces_the_overtime_warning() {
    let app = TestApp::new();
    let customer_id = seed_customer(&app, "Alfa Redovisning AB", "K-1001").await;
    let agreement_id = seed_timebank_agreement(&app, &customer_id).await;

    let body = journal_entry(&app, &customer_id, &agreement_id, 5, 8.0).await;
    assert_eq!(body["entry"]["billing_type"], "timebank");
    assert_eq!(body["classification"]["excess_hours"], 0.0);

    // Pool is down to two hours; five more cross the boundary.
    let body = journal_entry(&app, &customer_id, &agreement_id, 12, 5.0).await;
    assert_eq!(body["entry"]["billing_type"], "overtime");
    assert_eq!(body["classification"]["excess_hours"], 3.0);

    let (status, timebank) =
        app.get(&format!("/agreements/{agreement_id}/timebank?date=2026-01-15")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(timebank["hours_used"], 8.0);
    assert_eq!(timebank["hours_remaining"], 2.0);
    assert_eq!(timebank["overtime_hours"], 5.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn summary_and_batch_flow_over_http() {
    let app = TestApp::new();
    let customer_id = seed_customer(&app, "Beta Bygg AB", "K-1002").await;
    let agreement_id = seed_timebank_agreement(&app, &customer_id).await;

    let first = journal_entry(&app, &customer_id, &agreement_id, 5, 8.0).await;
    let second = journal_entry(&app, &customer_id, &agreement_id, 12, 5.0).await;
    let first_id = first["entry"]["id"].as_str().expect("entry id");
    let second_id = second["entry"]["id"].as_str().expect("entry id");

    let (status, summaries) = app.get("/billing/summary?year=2026&month=1").await;
    assert_eq!(status, StatusCode::OK);
    let summary = &summaries[0];
    assert_eq!(summary["customer_number"], "K-1002");
    assert_eq!(summary["timebank_hours"], 8.0);
    assert_eq!(summary["overtime_hours"], 5.0);
    // 5 overtime hours at the 120 000 öre rate.
    assert_eq!(summary["total_amount"], 600_000);

    let (status, batch) = app
        .post(
            "/billing/batches",
            json!({
                "customer_id": customer_id,
                "year": 2026,
                "month": 1,
                "entry_ids": [first_id, second_id],
                "total_amount": 600_000
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "batch creation failed: {batch}");
    let batch_id = batch["id"].as_str().expect("batch id").to_string();
    assert_eq!(batch["status"], "draft");

    // Jumping straight to exported is rejected.
    let (status, _) =
        app.post(&format!("/billing/batches/{batch_id}/status"), json!({ "status": "exported" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) =
        app.post(&format!("/billing/batches/{batch_id}/status"), json!({ "status": "review" })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, exported) =
        app.post(&format!("/billing/batches/{batch_id}/status"), json!({ "status": "exported" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(exported["exported_by"], "anna");

    let (status, detail) = app.get(&format!("/billing/batches/{batch_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["entries"].as_array().expect("entries").len(), 2);
    assert!(detail["entries"][0]["is_exported"].as_bool().expect("flag"));

    // Exported entries cannot be batched again.
    let (status, _) = app
        .post(
            "/billing/batches",
            json!({
                "customer_id": customer_id,
                "year": 2026,
                "month": 1,
                "entry_ids": [first_id],
                "total_amount": 0
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The exported work no longer appears in the summary.
    let (_, summaries) = app.get("/billing/summary?year=2026&month=1").await;
    assert_eq!(summaries.as_array().expect("summaries").len(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_batch_is_not_found() {
    let app = TestApp::new();
    let (status, _) =
        app.get("/billing/batches/00000000-0000-0000-0000-000000000000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_active_agreement_conflicts() {
    let app = TestApp::new();
    let customer_id = seed_customer(&app, "Gamma Juridik AB", "K-1003").await;
    seed_timebank_agreement(&app, &customer_id).await;

    let (status, body) = app
        .post(
            "/agreements",
            json!({
                "customer_id": customer_id,
                "agreement_type": "hourly",
                "hourly_rate": 90_000,
                "overtime_rate": null,
                "included_hours": null,
                "fixed_amount": null,
                "period": null,
                "valid_from": "2026-01-01",
                "valid_to": null
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "expected conflict: {body}");

    // Replacing instead of creating succeeds and terminates the old one.
    let (status, replacement) = app
        .post(
            "/agreements",
            json!({
                "customer_id": customer_id,
                "agreement_type": "hourly",
                "hourly_rate": 90_000,
                "overtime_rate": null,
                "included_hours": null,
                "fixed_amount": null,
                "period": null,
                "valid_from": "2026-01-01",
                "valid_to": null,
                "replace_active": true
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, active) = app.get(&format!("/customers/{customer_id}/agreement")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(active["id"], replacement["id"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_hours_are_a_validation_error() {
    let app = TestApp::new();
    let customer_id = seed_customer(&app, "Delta Design AB", "K-1004").await;
    let agreement_id = seed_timebank_agreement(&app, &customer_id).await;

    let (status, body) = app
        .post(
            "/time-entries",
            json!({
                "agreement_id": agreement_id,
                "entry": {
                    "customer_id": customer_id,
                    "assignment_id": null,
                    "entry_date": "2026-01-05",
                    "hours": 1.3,
                    "description": null
                }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "Validation");
}

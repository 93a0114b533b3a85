use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use internmatch_core::dataset::load_dataset;
use internmatch_core::{Catalog, MatchOptions};
use serde_json::{json, Value};
use server::{build_app, load_catalog, AppState, DatasetSource};
use std::fs;
use tempfile::tempdir;
use tower::ServiceExt;

fn tiny_catalog() -> Catalog {
    Catalog::from_loaded(load_dataset(&[
        json!({ "id": 1, "title": "Dev Intern", "location": "Bangalore", "education": "B.Tech", "sector": "IT", "skills": ["React", "Node"] }),
        json!({ "id": 2, "title": "Remote Dev", "location": "Remote", "education": "B.Tech", "sector": "IT", "skills": ["React"] }),
        json!({ "id": 3, "title": "Analyst", "location": "Pune", "education": "BCom", "sector": "Finance", "skills": "Excel, SQL" }),
    ]))
}

fn ready_app() -> (AppState, Router) {
    let state = AppState::with_catalog(MatchOptions::default(), tiny_catalog());
    (state.clone(), build_app(state))
}

async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn match_returns_ranked_results() {
    let (_, app) = ready_app();
    let profile = json!({ "skills": ["react"], "education": "B.Tech", "sector": "IT" });
    let (status, body) = call(app, post_json("/match", profile.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    let arr = body["results"].as_array().unwrap();
    assert_eq!(arr.len(), 3);
    assert_eq!(arr[0]["id"], 2);
    assert_eq!(arr[1]["id"], 1);
    assert_eq!(arr[0]["breakdown"]["skills"], 1.0);
    assert_eq!(body["total_scored"], 3);
}

#[tokio::test]
async fn empty_profile_is_a_validation_error() {
    let (_, app) = ready_app();
    let (status, body) = call(app, post_json("/match", "{}".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn not_ready_without_dataset() {
    let app = build_app(AppState::new(MatchOptions::default()));
    let (status, body) = call(app.clone(), post_json("/match", json!({ "skills": ["go"] }).to_string())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "NOT_READY");

    let (status, body) = call(app, get("/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], false);
}

#[tokio::test]
async fn upload_replaces_catalog() {
    let (state, app) = ready_app();
    let upload = json!([{ "id": "a", "skills": ["Rust"] }, "junk"]).to_string();
    let (status, body) = call(app.clone(), post_json("/dataset", upload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"], 1);
    assert_eq!(body["skipped"], 1);
    assert_eq!(state.snapshot().unwrap().len(), 1);

    let (_, body) = call(app, get("/vocab")).await;
    assert_eq!(body["skills"], json!(["Rust"]));
}

#[tokio::test]
async fn upload_larger_than_two_megabytes_is_accepted() {
    let (state, app) = ready_app();
    let records: Vec<Value> = (0..10_000)
        .map(|i| {
            json!({
                "id": i,
                "title": format!("Data Engineering Intern {i}"),
                "company": "Acme Analytics Private Limited",
                "location": "Bangalore",
                "education": "B.Tech",
                "sector": "IT Services",
                "skills": ["Python", "SQL", "Spark", "Airflow"],
                "description": "Build and maintain batch pipelines feeding the reporting warehouse.",
            })
        })
        .collect();
    let upload = Value::Array(records).to_string();
    assert!(upload.len() > 2 * 1024 * 1024);

    let (status, body) = call(app, post_json("/dataset", upload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"], 10_000);
    assert_eq!(state.snapshot().unwrap().len(), 10_000);
}

#[tokio::test]
async fn upload_over_configured_limit_is_rejected() {
    let state = AppState::with_catalog(MatchOptions::default(), tiny_catalog()).with_upload_limit(64);
    let app = build_app(state.clone());
    let upload = json!([{ "title": "Far too long for a sixty-four byte limit", "skills": ["Rust"] }]).to_string();
    assert!(upload.len() > 64);

    let (status, _) = call(app, post_json("/dataset", upload)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(state.snapshot().unwrap().len(), 3);
}

#[tokio::test]
async fn malformed_upload_keeps_previous_catalog() {
    let (state, app) = ready_app();
    let (status, body) = call(app.clone(), post_json("/dataset", "[{ broken".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_DATASET");

    let (status, _) = call(app, post_json("/dataset", r#"{"title":"not an array"}"#.into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(state.snapshot().unwrap().len(), 3);
}

#[tokio::test]
async fn suggestions_and_index_lookups() {
    let (_, app) = ready_app();
    let (status, body) = call(app.clone(), get("/suggest?field=education&q=b")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["B.Tech", "BCom"]));

    let (status, _) = call(app.clone(), get("/suggest?field=salary&q=1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = call(app.clone(), get("/index/react")).await;
    assert_eq!(body["ids"], json!([1, 2]));

    let (_, body) = call(app, get("/index/sq?contains=true")).await;
    assert_eq!(body["ids"], json!([3]));
}

#[tokio::test]
async fn loads_startup_dataset_from_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dataset.json");
    fs::write(&path, r#"[{"title":"A","skills":["Go"]}]"#).unwrap();
    let catalog = load_catalog(&DatasetSource::Path(path.to_string_lossy().to_string())).await.unwrap();
    assert_eq!(catalog.len(), 1);

    let missing = DatasetSource::Path(dir.path().join("nope.json").to_string_lossy().to_string());
    assert!(load_catalog(&missing).await.is_err());
}

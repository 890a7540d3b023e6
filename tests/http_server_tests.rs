use anyhow::Result;
use axum::response::Response;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use datadeck::http::app_server::{
    AppServer, PATH_CHANGE_PASSWORD, PATH_DATASETS, PATH_DATASET_UPLOAD, PATH_HEALTH, PATH_LOGIN,
    PATH_LOGOUT, PATH_ME, PATH_REGISTER, PATH_ROOT, PATH_USERS,
};
use datadeck::DeckEngine;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

const MULTIPART_BOUNDARY: &str = "dd-test-boundary-4f9a1c";

/// Create test router backed by a SQLite catalog and filesystem storage
/// in a fresh temp directory.
async fn setup_test() -> Result<(Router, Arc<DeckEngine>, TempDir)> {
    let temp_dir = tempfile::tempdir()?;

    let engine = DeckEngine::defaults(temp_dir.path()).await?;

    let app = AppServer::new(engine, &[]);

    Ok((app.router, app.engine, temp_dir))
}

async fn read_json(response: Response) -> Result<serde_json::Value> {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Register an account and return its access token.
async fn register_user(app: &Router, email: &str, password: &str) -> Result<String> {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(PATH_REGISTER)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&json!({
                    "name": "Test User",
                    "email": email,
                    "password": password
                }))?))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let json = read_json(response).await?;
    Ok(json["access_token"].as_str().unwrap().to_string())
}

fn authed_get(uri: &str, token: &str) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())?)
}

/// Build a multipart/form-data body carrying one `file` field.
fn multipart_file(filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload_file(
    app: &Router,
    token: &str,
    filename: &str,
    content: &[u8],
) -> Result<Response> {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(PATH_DATASET_UPLOAD)
                .header("authorization", format!("Bearer {token}"))
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
                )
                .body(Body::from(multipart_file(filename, content)))?,
        )
        .await?;
    Ok(response)
}

fn people_csv(rows: usize) -> Vec<u8> {
    let mut csv = String::from("name,age,city\n");
    for i in 0..rows {
        let city = if i % 2 == 0 { "oslo" } else { "bergen" };
        csv.push_str(&format!("person{i:02},{},{city}\n", 20 + i));
    }
    csv.into_bytes()
}

const CITIES_CSV: &[u8] = b"city,population\noslo,700000\nbergen,280000\noslo,65000\nparis,2100000\n";

// ==================== Root and Health ====================

#[tokio::test(flavor = "multi_thread")]
async fn test_root_reports_running() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let response = app
        .oneshot(Request::builder().uri(PATH_ROOT).body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await?;
    assert_eq!(json["message"], "API is running");

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_health_endpoint() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let response = app
        .oneshot(Request::builder().uri(PATH_HEALTH).body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await?;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "datadeck");

    Ok(())
}

// ==================== Auth Endpoints ====================

#[tokio::test(flavor = "multi_thread")]
async fn test_register_returns_token_and_session_cookie() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(PATH_REGISTER)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&json!({
                    "name": "Ada",
                    "email": "ada@example.com",
                    "password": "hunter22"
                }))?))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("set-cookie header")
        .to_str()?
        .to_string();
    assert!(cookie.starts_with("access_token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=1800"));
    assert!(cookie.contains("Path=/"));

    let json = read_json(response).await?;
    assert_eq!(json["token_type"], "bearer");
    assert!(!json["access_token"].as_str().unwrap().is_empty());

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_register_duplicate_email() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    register_user(&app, "ada@example.com", "hunter22").await?;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(PATH_REGISTER)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&json!({
                    "email": "ada@example.com",
                    "password": "different"
                }))?))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await?;
    assert_eq!(json["error"]["message"], "Email already registered");
    assert_eq!(json["error"]["code"], "BAD_REQUEST");

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_and_me_flow() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    register_user(&app, "ada@example.com", "hunter22").await?;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(PATH_LOGIN)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&json!({
                    "email": "ada@example.com",
                    "password": "hunter22"
                }))?))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let login = read_json(response).await?;
    assert_eq!(login["token_type"], "bearer");
    let token = login["access_token"].as_str().unwrap();

    let response = app.oneshot(authed_get(PATH_ME, token)?).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let me = read_json(response).await?;
    assert!(me["id"].as_str().unwrap().starts_with("user"));
    assert_eq!(me["email"], "ada@example.com");
    assert_eq!(me["name"], "Test User");
    assert_eq!(me["role"], "member");

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_wrong_password() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    register_user(&app, "ada@example.com", "hunter22").await?;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(PATH_LOGIN)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&json!({
                    "email": "ada@example.com",
                    "password": "wrong"
                }))?))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get("www-authenticate").unwrap(),
        "Bearer"
    );
    let json = read_json(response).await?;
    assert_eq!(json["error"]["message"], "Incorrect email or password");

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_me_requires_token() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let response = app
        .oneshot(Request::builder().uri(PATH_ME).body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get("www-authenticate").unwrap(),
        "Bearer"
    );
    let json = read_json(response).await?;
    assert_eq!(json["error"]["message"], "Could not validate credentials");

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_me_accepts_session_cookie() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let token = register_user(&app, "ada@example.com", "hunter22").await?;

    let response = app
        .oneshot(
            Request::builder()
                .uri(PATH_ME)
                .header("cookie", format!("theme=dark; access_token={token}"))
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await?;
    assert_eq!(json["email"], "ada@example.com");

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_logout_clears_cookie() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(PATH_LOGOUT)
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("set-cookie header")
        .to_str()?
        .to_string();
    assert!(cookie.starts_with("access_token=;"));
    assert!(cookie.contains("Max-Age=0"));

    let json = read_json(response).await?;
    assert_eq!(json["detail"], "Logged out successfully");

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_profile() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let token = register_user(&app, "ada@example.com", "hunter22").await?;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(PATH_ME)
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&json!({
                    "name": "Ada Lovelace"
                }))?))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await?;
    assert_eq!(json["name"], "Ada Lovelace");
    assert_eq!(json["email"], "ada@example.com");

    // The change is visible on subsequent reads.
    let response = app.oneshot(authed_get(PATH_ME, &token)?).await?;
    let json = read_json(response).await?;
    assert_eq!(json["name"], "Ada Lovelace");

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_profile_without_fields() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let token = register_user(&app, "ada@example.com", "hunter22").await?;

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(PATH_ME)
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from("{}"))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await?;
    assert_eq!(json["error"]["message"], "No fields to update");

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_change_password_flow() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let token = register_user(&app, "ada@example.com", "old-pass").await?;

    // Wrong current password is rejected.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(PATH_CHANGE_PASSWORD)
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&json!({
                    "old_password": "bad-guess",
                    "new_password": "new-pass"
                }))?))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await?;
    assert_eq!(json["error"]["message"], "Incorrect current password");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(PATH_CHANGE_PASSWORD)
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&json!({
                    "old_password": "old-pass",
                    "new_password": "new-pass"
                }))?))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await?;
    assert_eq!(json["message"], "Password updated successfully");

    // Only the new password logs in now.
    let login = |password: &str| {
        serde_json::to_string(&json!({
            "email": "ada@example.com",
            "password": password
        }))
    };
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(PATH_LOGIN)
                .header("content-type", "application/json")
                .body(Body::from(login("new-pass")?))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(PATH_LOGIN)
                .header("content-type", "application/json")
                .body(Body::from(login("old-pass")?))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_users_is_admin_only() -> Result<()> {
    let (app, engine, _tempdir) = setup_test().await?;

    let token = register_user(&app, "member@example.com", "hunter22").await?;
    register_user(&app, "other@example.com", "hunter22").await?;

    let response = app.clone().oneshot(authed_get(PATH_USERS, &token)?).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = read_json(response).await?;
    assert_eq!(json["error"]["message"], "Not authorized");
    assert_eq!(json["error"]["code"], "FORBIDDEN");

    // Promote and retry.
    let me = read_json(app.clone().oneshot(authed_get(PATH_ME, &token)?).await?).await?;
    let user_id = me["id"].as_str().unwrap();
    engine.catalog().set_user_role(user_id, "admin").await?;

    let response = app.oneshot(authed_get(PATH_USERS, &token)?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await?;
    let emails: Vec<&str> = json["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert!(emails.contains(&"member@example.com"));
    assert!(emails.contains(&"other@example.com"));

    Ok(())
}

// ==================== Dataset Endpoints ====================

#[tokio::test(flavor = "multi_thread")]
async fn test_upload_requires_auth() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(PATH_DATASET_UPLOAD)
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
                )
                .body(Body::from(multipart_file("data.csv", CITIES_CSV)))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_upload_and_list_datasets() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let token = register_user(&app, "ada@example.com", "hunter22").await?;

    let response = upload_file(&app, &token, "cities.csv", CITIES_CSV).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let upload = read_json(response).await?;
    assert_eq!(upload["message"], "Upload successful");
    let dataset_id = upload["id"].as_str().unwrap().to_string();
    assert!(dataset_id.starts_with("dset"));

    let response = app.clone().oneshot(authed_get(PATH_DATASETS, &token)?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let datasets = read_json(response).await?;
    let datasets = datasets.as_array().unwrap();
    assert_eq!(datasets.len(), 1);
    assert_eq!(datasets[0]["id"], dataset_id.as_str());
    assert_eq!(datasets[0]["name"], "cities.csv");

    // Another account sees none of it.
    let other = register_user(&app, "eve@example.com", "hunter22").await?;
    let response = app.oneshot(authed_get(PATH_DATASETS, &other)?).await?;
    let datasets = read_json(response).await?;
    assert_eq!(datasets.as_array().unwrap().len(), 0);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_upload_rejects_unsupported_extension() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let token = register_user(&app, "ada@example.com", "hunter22").await?;

    let response = upload_file(&app, &token, "notes.txt", b"hello").await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await?;
    assert_eq!(
        json["error"]["message"],
        "File must be .xlsx, .xls, or .csv"
    );

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_upload_rejects_oversized_file() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let token = register_user(&app, "ada@example.com", "hunter22").await?;

    let big = vec![b'x'; 1024 * 1024 + 1];
    let response = upload_file(&app, &token, "big.csv", &big).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await?;
    assert_eq!(json["error"]["message"], "File size exceeds 1MB limit");

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_upload_rejects_when_quota_exhausted() -> Result<()> {
    let (app, engine, _tempdir) = setup_test().await?;

    let token = register_user(&app, "ada@example.com", "hunter22").await?;
    let me = read_json(app.clone().oneshot(authed_get(PATH_ME, &token)?).await?).await?;
    let user_id = me["id"].as_str().unwrap();

    // Fill the account to just under its 50MB cap.
    let seed = vec![0u8; 50 * 1024 * 1024 - 10];
    engine
        .storage()
        .write(&format!("{user_id}/seed.bin"), &seed)
        .await?;

    let response = upload_file(&app, &token, "cities.csv", CITIES_CSV).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await?;
    assert_eq!(json["error"]["message"], "Storage limit of 50MB exceeded");

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_view_defaults_and_pagination() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let token = register_user(&app, "ada@example.com", "hunter22").await?;
    let upload = read_json(upload_file(&app, &token, "people.csv", &people_csv(15)).await?).await?;
    let id = upload["id"].as_str().unwrap();

    // Defaults: page 1, 10 rows.
    let response = app
        .clone()
        .oneshot(authed_get(&format!("/datasets/{id}/view"), &token)?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await?;
    assert_eq!(json["total"], 15);
    assert_eq!(json["data"].as_array().unwrap().len(), 10);
    assert_eq!(json["data"][0]["name"], "person00");
    assert_eq!(json["data"][0]["age"], 20);

    let columns = json["columns"].as_array().unwrap();
    assert_eq!(columns[0]["name"], "name");
    assert_eq!(columns[2]["name"], "city");
    assert_eq!(
        columns[2]["unique_values"],
        serde_json::json!(["oslo", "bergen"])
    );

    // Explicit paging.
    let response = app
        .oneshot(authed_get(
            &format!("/datasets/{id}/view?page=2&limit=5"),
            &token,
        )?)
        .await?;
    let json = read_json(response).await?;
    assert_eq!(json["total"], 15);
    assert_eq!(json["data"].as_array().unwrap().len(), 5);
    assert_eq!(json["data"][0]["name"], "person05");

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_view_filter_sort_and_search() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let token = register_user(&app, "ada@example.com", "hunter22").await?;
    let upload = read_json(upload_file(&app, &token, "people.csv", &people_csv(15)).await?).await?;
    let id = upload["id"].as_str().unwrap();

    // Filter on city, sort by age descending.
    let uri = format!(
        "/datasets/{id}/view?filters=%7B%22city%22%3A%22oslo%22%7D&sort_column=age&sort_order=desc"
    );
    let response = app.clone().oneshot(authed_get(&uri, &token)?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await?;
    assert_eq!(json["total"], 8);
    assert_eq!(json["data"][0]["name"], "person14");
    assert_eq!(json["data"][0]["age"], 34);

    // Search matches substrings across all columns.
    let response = app
        .oneshot(authed_get(
            &format!("/datasets/{id}/view?search=person01"),
            &token,
        )?)
        .await?;
    let json = read_json(response).await?;
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["city"], "bergen");

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_view_rejects_malformed_filters() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let token = register_user(&app, "ada@example.com", "hunter22").await?;
    let upload = read_json(upload_file(&app, &token, "cities.csv", CITIES_CSV).await?).await?;
    let id = upload["id"].as_str().unwrap();

    let response = app
        .oneshot(authed_get(
            &format!("/datasets/{id}/view?filters=%7Bnot-json"),
            &token,
        )?)
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await?;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_view_of_foreign_dataset_is_not_found() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let owner = register_user(&app, "ada@example.com", "hunter22").await?;
    let upload = read_json(upload_file(&app, &owner, "cities.csv", CITIES_CSV).await?).await?;
    let id = upload["id"].as_str().unwrap();

    let intruder = register_user(&app, "eve@example.com", "hunter22").await?;
    let response = app
        .clone()
        .oneshot(authed_get(&format!("/datasets/{id}/view"), &intruder)?)
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = read_json(response).await?;
    assert_eq!(json["error"]["message"], "Dataset not found");

    // Same for a dataset id that never existed.
    let response = app
        .oneshot(authed_get("/datasets/dsetmissing/view", &owner)?)
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

// ==================== Chart Endpoints ====================

#[tokio::test(flavor = "multi_thread")]
async fn test_charts_bar_counts_in_first_seen_order() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let token = register_user(&app, "ada@example.com", "hunter22").await?;
    let upload = read_json(upload_file(&app, &token, "cities.csv", CITIES_CSV).await?).await?;
    let id = upload["id"].as_str().unwrap();

    let response = app
        .oneshot(authed_get(
            &format!("/datasets/{id}/charts?chart_type=bar&group_by=city"),
            &token,
        )?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    // The response is a bare array keyed by the grouping column.
    let json = read_json(response).await?;
    assert_eq!(
        json,
        serde_json::json!([
            {"city": "oslo", "value": 2},
            {"city": "bergen", "value": 1},
            {"city": "paris", "value": 1},
        ])
    );

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_charts_default_to_bar_on_first_column() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let token = register_user(&app, "ada@example.com", "hunter22").await?;
    let upload = read_json(upload_file(&app, &token, "cities.csv", CITIES_CSV).await?).await?;
    let id = upload["id"].as_str().unwrap();

    let response = app
        .oneshot(authed_get(&format!("/datasets/{id}/charts"), &token)?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await?;
    assert_eq!(json[0]["city"], "oslo");
    assert_eq!(json[0]["value"], 2);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_charts_pie_uses_name_key() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let token = register_user(&app, "ada@example.com", "hunter22").await?;
    let upload = read_json(upload_file(&app, &token, "cities.csv", CITIES_CSV).await?).await?;
    let id = upload["id"].as_str().unwrap();

    let response = app
        .oneshot(authed_get(
            &format!("/datasets/{id}/charts?chart_type=pie&group_by=city"),
            &token,
        )?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await?;
    assert_eq!(json[0]["name"], "oslo");
    assert_eq!(json[0]["value"], 2);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_charts_unsupported_type() -> Result<()> {
    let (app, _engine, _tempdir) = setup_test().await?;

    let token = register_user(&app, "ada@example.com", "hunter22").await?;
    let upload = read_json(upload_file(&app, &token, "cities.csv", CITIES_CSV).await?).await?;
    let id = upload["id"].as_str().unwrap();

    let response = app
        .oneshot(authed_get(
            &format!("/datasets/{id}/charts?chart_type=scatter"),
            &token,
        )?)
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await?;
    assert_eq!(json["error"]["message"], "Unsupported chart type");

    Ok(())
}

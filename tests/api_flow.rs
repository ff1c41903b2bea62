use axum::http::{Method, StatusCode};
use serde_json::json;

#[path = "common/mod.rs"]
mod common;

use common::TestApp;

fn example_entry() -> serde_json::Value {
    json!({
        "description": "string",
        "time_start": "2018-09-23T12:42:31Z",
        "time_end": "2018-09-24T13:42:31Z",
    })
}

#[tokio::test]
async fn signup_sets_session_cookie() {
    let app = TestApp::memory();
    let resp = app
        .send(
            Method::POST,
            "/signup",
            None,
            Some(json!({"name": "string", "email": "string", "password": "string", "about": "string"})),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    let set_cookie = resp.set_cookie_header();
    assert!(set_cookie.starts_with("session_token="), "{set_cookie}");
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("Max-Age=31536000"));

    let user = &resp.json["body"];
    assert_eq!(user["email"], "string");
    assert_eq!(user["role"], "user");
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());

    let cookie = resp.session_cookie().unwrap();
    let me = app.send(Method::GET, "/auth", Some(&cookie), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.json["body"]["id"], user["id"]);
}

#[tokio::test]
async fn duplicate_signup_is_a_conflict() {
    let app = TestApp::memory();
    app.sign_up("dup@example.com", "pw").await;
    let resp = app
        .send(
            Method::POST,
            "/signup",
            None,
            Some(json!({"name": "other", "email": "dup@example.com", "password": "pw2"})),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.error_kind(), "duplicate_email");
    assert!(resp.session_cookie().is_none());
}

#[tokio::test]
async fn signup_rejects_missing_fields() {
    let app = TestApp::memory();
    let resp = app
        .send(
            Method::POST,
            "/signup",
            None,
            Some(json!({"name": "", "email": "a@example.com", "password": "pw"})),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_kind(), "validation");

    let resp = app.raw(Method::POST, "/signup", "", "{not json").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_kind(), "validation");
}

#[tokio::test]
async fn create_entry_reports_duration() {
    let app = TestApp::memory();
    let (user_id, cookie) = app.sign_up("string", "string").await;

    let resp = app.create_entry(&cookie, example_entry()).await;
    assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.json);
    let entry = &resp.json["body"];
    assert_eq!(entry["duration"], "25h0m0s");
    assert_eq!(entry["user_id"], user_id);
    assert_eq!(entry["description"], "string");
    assert!(entry["project_id"].is_null());

    let id = entry["id"].as_i64().unwrap();
    let fetched = app
        .send(Method::GET, &format!("/entry/{id}"), Some(&cookie), None)
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json["body"]["duration"], "25h0m0s");
}

#[tokio::test]
async fn protected_routes_need_a_valid_session() {
    let app = TestApp::memory();
    let resp = app.create_entry("", example_entry()).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error_kind(), "unauthenticated");

    for cookie in ["session_token=garbage", "session_token=AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"] {
        let resp = app.send(Method::GET, "/me", Some(cookie), None).await;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED, "{cookie}");
    }
}

#[tokio::test]
async fn inverted_range_is_rejected_and_not_stored() {
    let app = TestApp::memory();
    let (_, cookie) = app.sign_up("a@example.com", "pw").await;

    let resp = app
        .create_entry(
            &cookie,
            json!({
                "time_start": "2018-09-24T13:42:31Z",
                "time_end": "2018-09-23T12:42:31Z",
            }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_kind(), "invalid_range");

    let list = app.send(Method::GET, "/me/entries", Some(&cookie), None).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.json["body"], json!([]));
}

#[tokio::test]
async fn signin_and_logout() {
    let app = TestApp::memory();
    app.sign_up("a@example.com", "secret").await;

    let bad = app
        .send(
            Method::POST,
            "/signin",
            None,
            Some(json!({"email": "a@example.com", "password": "nope"})),
        )
        .await;
    assert_eq!(bad.status, StatusCode::UNAUTHORIZED);
    assert_eq!(bad.error_kind(), "invalid_credentials");

    let ok = app
        .send(
            Method::POST,
            "/signin",
            None,
            Some(json!({"email": "a@example.com", "password": "secret"})),
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);
    let cookie = ok.session_cookie().unwrap();

    let out = app.send(Method::POST, "/logout", Some(&cookie), None).await;
    assert_eq!(out.status, StatusCode::NO_CONTENT);
    assert!(out.set_cookie_header().contains("Max-Age=0"));

    let after = app.send(Method::GET, "/auth", Some(&cookie), None).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn entries_of_others_are_forbidden() {
    let app = TestApp::memory();
    let (_, alice) = app.sign_up("alice@example.com", "pw").await;
    let (_, bob) = app.sign_up("bob@example.com", "pw").await;

    let project = app.create_project(&alice, "work").await;
    let entry = app.create_entry(&alice, example_entry()).await.json["body"]["id"]
        .as_i64()
        .unwrap();

    let get = app
        .send(Method::GET, &format!("/entry/{entry}"), Some(&bob), None)
        .await;
    assert_eq!(get.status, StatusCode::FORBIDDEN);
    assert_eq!(get.error_kind(), "permission_denied");

    let mut body = example_entry();
    body["project_id"] = json!(project);
    let attach = app.create_entry(&bob, body).await;
    assert_eq!(attach.status, StatusCode::FORBIDDEN);

    let project_get = app
        .send(Method::GET, &format!("/project/{project}"), Some(&bob), None)
        .await;
    assert_eq!(project_get.status, StatusCode::FORBIDDEN);

    let missing = app.send(Method::GET, "/entry/9999", Some(&alice), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let bad_id = app.send(Method::GET, "/entry/abc", Some(&alice), None).await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn edit_entry_recomputes_duration() {
    let app = TestApp::memory();
    let (_, cookie) = app.sign_up("a@example.com", "pw").await;
    let id = app.create_entry(&cookie, example_entry()).await.json["body"]["id"]
        .as_i64()
        .unwrap();

    let resp = app
        .send(
            Method::POST,
            "/entry/edit",
            Some(&cookie),
            Some(json!({
                "id": id,
                "description": "shorter",
                "time_start": "2018-09-23T12:00:00Z",
                "time_end": "2018-09-23T17:03:09Z",
            })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.json);
    assert_eq!(resp.json["body"]["duration"], "5h3m9s");
    assert_eq!(resp.json["body"]["description"], "shorter");
}

#[tokio::test]
async fn deleting_project_cascades_to_entries() {
    let app = TestApp::memory();
    let (_, cookie) = app.sign_up("a@example.com", "pw").await;
    let project = app.create_project(&cookie, "work").await;

    let mut body = example_entry();
    body["project_id"] = json!(project);
    let attached = app.create_entry(&cookie, body).await.json["body"]["id"]
        .as_i64()
        .unwrap();
    let loose = app.create_entry(&cookie, example_entry()).await.json["body"]["id"]
        .as_i64()
        .unwrap();

    let del = app
        .send(Method::DELETE, &format!("/project/{project}"), Some(&cookie), None)
        .await;
    assert_eq!(del.status, StatusCode::NO_CONTENT);

    let gone = app
        .send(Method::GET, &format!("/entry/{attached}"), Some(&cookie), None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    let kept = app
        .send(Method::GET, &format!("/entry/{loose}"), Some(&cookie), None)
        .await;
    assert_eq!(kept.status, StatusCode::OK);

    let projects = app.send(Method::GET, "/me/projects", Some(&cookie), None).await;
    assert_eq!(projects.json["body"], json!([]));
}

#[tokio::test]
async fn deleting_account_cascades_and_frees_email() {
    let app = TestApp::memory();
    let (_, cookie) = app.sign_up("a@example.com", "pw").await;
    app.create_project(&cookie, "work").await;
    app.create_entry(&cookie, example_entry()).await;

    let del = app.send(Method::DELETE, "/me", Some(&cookie), None).await;
    assert_eq!(del.status, StatusCode::NO_CONTENT);

    let stale = app.send(Method::GET, "/me/entries", Some(&cookie), None).await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    let (_, fresh) = app.sign_up("a@example.com", "pw").await;
    let entries = app.send(Method::GET, "/me/entries", Some(&fresh), None).await;
    assert_eq!(entries.json["body"], json!([]));
}

#[tokio::test]
async fn day_filter_lists_one_day() {
    let app = TestApp::memory();
    let (_, cookie) = app.sign_up("a@example.com", "pw").await;
    for (start, end) in [
        ("2024-05-01T23:00:00Z", "2024-05-02T01:00:00Z"),
        ("2024-05-02T08:00:00Z", "2024-05-02T09:00:00Z"),
        ("2024-05-02T23:59:59Z", "2024-05-03T00:30:00Z"),
        ("2024-05-03T00:00:00Z", "2024-05-03T00:10:00Z"),
    ] {
        let resp = app
            .create_entry(&cookie, json!({"time_start": start, "time_end": end}))
            .await;
        assert_eq!(resp.status, StatusCode::CREATED);
    }

    let day = app
        .send(Method::GET, "/me/entries?day=2024-05-02", Some(&cookie), None)
        .await;
    assert_eq!(day.status, StatusCode::OK);
    let starts: Vec<_> = day.json["body"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["time_start"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(starts, vec!["2024-05-02T08:00:00Z", "2024-05-02T23:59:59Z"]);

    let all = app.send(Method::GET, "/me/entries", Some(&cookie), None).await;
    assert_eq!(all.json["body"].as_array().unwrap().len(), 4);

    let bad = app
        .send(Method::GET, "/me/entries?day=02.05.2024", Some(&cookie), None)
        .await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reset_leaves_no_rows_behind() {
    let app = TestApp::memory();
    let (_, cookie) = app.sign_up("a@example.com", "pw").await;
    app.create_entry(&cookie, example_entry()).await;

    app.reset().await;

    let signin = app
        .send(
            Method::POST,
            "/signin",
            None,
            Some(json!({"email": "a@example.com", "password": "pw"})),
        )
        .await;
    assert_eq!(signin.status, StatusCode::UNAUTHORIZED);

    let (id, _) = app.sign_up("b@example.com", "pw").await;
    assert_eq!(id, 1, "identities restart after reset");

    let stale = app.send(Method::GET, "/auth", Some(&cookie), None).await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED, "{}", stale.json);
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::memory();
    let resp = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json, json!("ok"));
}

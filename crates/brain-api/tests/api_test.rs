//! Router-level tests against in-memory repositories.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use brain_api::services::TriageRegistry;
use brain_api::{build_router, AppState, ServerConfig};
use brain_core::{
    DocumentConverter, MemorySettingsStore, MemoryStore, NewTopic, Result, TopicRepository,
};

const TOKEN: &str = "sb_test_token";
const BOUNDARY: &str = "brainTestBoundary";

/// Stands in for pandoc: returns the upload bytes as text.
struct PassthroughConverter;

#[async_trait]
impl DocumentConverter for PassthroughConverter {
    async fn to_plain_text(&self, data: &[u8], _filename: &str) -> Result<String> {
        Ok(String::from_utf8_lossy(data).into_owned())
    }
}

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
    triage: TriageRegistry,
}

impl TestApp {
    async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        store.add_session(TOKEN, Uuid::new_v4()).await;
        let state = AppState::in_memory(
            store.clone(),
            Arc::new(MemorySettingsStore::new()),
            Arc::new(PassthroughConverter),
        );
        let config = ServerConfig {
            rate_limit_enabled: false,
            ..Default::default()
        };
        let triage = state.triage.clone();
        Self {
            router: build_router(state, &config),
            store,
            triage,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN));
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    async fn upload(&self, filename: &str, content: &str) -> (StatusCode, Value) {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n{c}\r\n--{b}--\r\n",
            b = BOUNDARY,
            f = filename,
            c = content
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/import")
            .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

fn paragraphs(n: usize) -> String {
    (1..=n)
        .map(|i| format!("Paragraph number {} has plenty of words in it.", i))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_missing_or_unknown_token_is_unauthorized() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .uri("/api/v1/cards")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Not authenticated.");

    let request = Request::builder()
        .uri("/api/v1/topics")
        .header(header::AUTHORIZATION, "Bearer sb_nobody")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Not authenticated.");
}

#[tokio::test]
async fn test_card_crud_derives_status() {
    let app = TestApp::new().await;

    let (status, card) = app
        .call(
            Method::POST,
            "/api/v1/cards",
            Some(json!({"title": "  Grace  ", "body": "Unmerited favor", "category": "Rules"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(card["title"], "Grace");
    assert_eq!(card["status"], "Processed");
    let id = card["id"].as_str().unwrap().to_string();

    let (status, card) = app
        .call(
            Method::PUT,
            &format!("/api/v1/cards/{}", id),
            Some(json!({"title": "Grace", "category": "Unprocessed"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["status"], "Unprocessed");

    let (status, list) = app
        .call(Method::GET, "/api/v1/cards?category=Unprocessed&q=GRACE", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/v1/cards/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .call(Method::GET, &format!("/api/v1/cards/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(&id));
}

#[tokio::test]
async fn test_blank_card_title_is_bad_request() {
    let app = TestApp::new().await;
    let (status, body) = app
        .call(Method::POST, "/api/v1/cards", Some(json!({"title": "   "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Card title is required");
}

#[tokio::test]
async fn test_board_has_every_category() {
    let app = TestApp::new().await;
    app.call(
        Method::POST,
        "/api/v1/cards",
        Some(json!({"title": "A course", "category": "Courses"})),
    )
    .await;

    let (status, board) = app.call(Method::GET, "/api/v1/cards/board", None).await;
    assert_eq!(status, StatusCode::OK);
    let columns = board["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 6);
    assert_eq!(columns[0]["category"], "Unprocessed");
    assert_eq!(columns[4]["category"], "Courses");
    assert_eq!(columns[4]["cards"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_topic_numbering_and_cascade_delete() {
    let app = TestApp::new().await;

    let (status, root) = app
        .call(Method::POST, "/api/v1/topics", Some(json!({"title": "Theology"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(root["number"], "1");
    let root_id = root["id"].as_str().unwrap().to_string();

    let (_, preview) = app
        .call(
            Method::GET,
            &format!("/api/v1/topics/next-number?parent_id={}", root_id),
            None,
        )
        .await;
    assert_eq!(preview["number"], "1a");
    assert_eq!(preview["level"], 1);

    let (_, child_a) = app
        .call(
            Method::POST,
            "/api/v1/topics",
            Some(json!({"title": "Grace", "parent_id": root_id})),
        )
        .await;
    let (_, child_b) = app
        .call(
            Method::POST,
            "/api/v1/topics",
            Some(json!({"title": "Law", "parent_id": root_id})),
        )
        .await;
    assert_eq!(child_a["number"], "1a");
    assert_eq!(child_b["number"], "1b");

    let (_, grandchild) = app
        .call(
            Method::POST,
            "/api/v1/topics",
            Some(json!({"title": "Justification", "parent_id": child_a["id"]})),
        )
        .await;
    assert_eq!(grandchild["number"], "1a1");
    assert_eq!(grandchild["level"], 2);

    let (status, detail) = app
        .call(
            Method::GET,
            &format!("/api/v1/topics/{}", grandchild["id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let crumbs: Vec<&str> = detail["breadcrumb"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["number"].as_str().unwrap())
        .collect();
    assert_eq!(crumbs, vec!["1", "1a"]);

    let (status, deleted) = app
        .call(Method::DELETE, &format!("/api/v1/topics/{}", root_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted"].as_array().unwrap().len(), 4);

    let (_, topics) = app.call(Method::GET, "/api/v1/topics", None).await;
    assert!(topics.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_topic_update_keeps_number_and_drops_unknown_related() {
    let app = TestApp::new().await;
    let (_, first) = app
        .call(Method::POST, "/api/v1/topics", Some(json!({"title": "First"})))
        .await;
    let (_, second) = app
        .call(Method::POST, "/api/v1/topics", Some(json!({"title": "Second"})))
        .await;
    let first_id = first["id"].as_str().unwrap();

    let (status, updated) = app
        .call(
            Method::PUT,
            &format!("/api/v1/topics/{}", first_id),
            Some(json!({
                "title": "First, renamed",
                "emoji": "📖",
                "related_topic_ids": [second["id"], Uuid::new_v4(), first_id]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["number"], "1");
    assert_eq!(updated["title"], "First, renamed");
    assert_eq!(updated["related_topic_ids"], json!([second["id"]]));
}

#[tokio::test]
async fn test_card_links_only_keep_owned_topics() {
    let app = TestApp::new().await;
    let (_, mine) = app
        .call(Method::POST, "/api/v1/topics", Some(json!({"title": "Mine"})))
        .await;
    let theirs = TopicRepository::insert(
        app.store.as_ref(),
        Uuid::new_v4(),
        NewTopic {
            number: "1".to_string(),
            title: "Theirs".to_string(),
            emoji: String::new(),
            level: 0,
            parent_id: None,
            related_topic_ids: vec![],
        },
    )
    .await
    .unwrap();

    let (status, card) = app
        .call(
            Method::POST,
            "/api/v1/cards",
            Some(json!({
                "title": "Linked",
                "connected_topic_ids": [mine["id"], theirs.id, Uuid::new_v4()]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(card["connected_topic_ids"], json!([mine["id"]]));

    let (status, card) = app
        .call(
            Method::PUT,
            &format!("/api/v1/cards/{}", card["id"].as_str().unwrap()),
            Some(json!({"title": "Linked", "connected_topic_ids": [theirs.id]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["connected_topic_ids"], json!([]));

    app.upload("notes.txt", &paragraphs(1)).await;
    let (status, draft) = app
        .call(
            Method::PATCH,
            "/api/v1/import/draft",
            Some(json!({"connected_topic_ids": [theirs.id, mine["id"]]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(draft["connected_topic_ids"], json!([mine["id"]]));
}

#[tokio::test]
async fn test_unknown_parent_is_not_found() {
    let app = TestApp::new().await;
    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/topics",
            Some(json!({"title": "Orphan", "parent_id": Uuid::new_v4()})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_import_triage_flow() {
    let app = TestApp::new().await;

    let (status, view) = app.upload("sermon-notes.md", &paragraphs(3)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["phase"], "triage");
    assert_eq!(view["total"], 3);
    assert_eq!(view["position"], 0);

    let (status, draft) = app
        .call(
            Method::PATCH,
            "/api/v1/import/draft",
            Some(json!({"title": "Edited", "category": "Articles"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(draft["title"], "Edited");

    let (status, approved) = app.call(Method::POST, "/api/v1/import/approve", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["card"]["title"], "Edited");
    assert_eq!(approved["card"]["status"], "Processed");
    assert_eq!(approved["card"]["source_type"], "Note");
    assert_eq!(approved["card"]["source_title"], "sermon-notes");
    assert_eq!(approved["view"]["position"], 1);

    let (_, view) = app.call(Method::POST, "/api/v1/import/skip", None).await;
    assert_eq!(view["skipped"], 1);
    let (_, approved) = app.call(Method::POST, "/api/v1/import/approve", None).await;
    assert_eq!(approved["view"]["phase"], "complete");
    assert_eq!(approved["view"]["approved"], 2);

    assert_eq!(app.triage.len().await, 0);

    let (status, _) = app.call(Method::POST, "/api/v1/import/skip", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, cards) = app.call(Method::GET, "/api/v1/cards", None).await;
    assert_eq!(cards.as_array().unwrap().len(), 2);

    let (_, view) = app.call(Method::POST, "/api/v1/import/reset", None).await;
    assert_eq!(view["phase"], "upload");
}

#[tokio::test]
async fn test_triage_sessions_are_released() {
    let app = TestApp::new().await;

    let (_, view) = app.call(Method::GET, "/api/v1/import", None).await;
    assert_eq!(view["phase"], "upload");
    let (status, _) = app.call(Method::POST, "/api/v1/import/approve", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.triage.len().await, 0);

    app.upload("short.txt", "too short").await;
    assert_eq!(app.triage.len().await, 0);

    app.upload("notes.txt", &paragraphs(2)).await;
    assert_eq!(app.triage.len().await, 1);
    let (_, view) = app.call(Method::POST, "/api/v1/import/reset", None).await;
    assert_eq!(view["phase"], "upload");
    assert_eq!(app.triage.len().await, 0);

    app.upload("notes.txt", &paragraphs(1)).await;
    let (status, view) = app.call(Method::POST, "/api/v1/import/skip", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["phase"], "complete");
    assert_eq!(view["skipped"], 1);
    assert_eq!(app.triage.len().await, 0);

    let (status, view) = app.upload("again.txt", &paragraphs(2)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["total"], 2);
}

#[tokio::test]
async fn test_failed_approve_keeps_draft() {
    let app = TestApp::new().await;
    app.upload("notes.txt", &paragraphs(2)).await;

    app.store.set_fail_card_writes(true);
    let (status, _) = app.call(Method::POST, "/api/v1/import/approve", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, view) = app.call(Method::GET, "/api/v1/import", None).await;
    assert_eq!(view["position"], 0);
    assert_eq!(view["approved"], 0);

    app.store.set_fail_card_writes(false);
    let (status, _) = app.call(Method::POST, "/api/v1/import/approve", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_import_rejects_bad_uploads() {
    let app = TestApp::new().await;

    let (status, body) = app.upload("slides.pdf", &paragraphs(2)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["error"],
        "Unsupported file type. Please upload .txt, .md, or .docx"
    );

    let (status, body) = app.upload("short.txt", "too short\n\nalso short").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["error"],
        "No content found. Make sure the file has paragraphs separated by blank lines."
    );

    let (_, view) = app.call(Method::GET, "/api/v1/import", None).await;
    assert_eq!(view["phase"], "upload");
}

#[tokio::test]
async fn test_docx_goes_through_converter() {
    let app = TestApp::new().await;
    let (status, view) = app.upload("Report.DOCX", &paragraphs(4)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["total"], 4);
}

#[tokio::test]
async fn test_second_upload_conflicts() {
    let app = TestApp::new().await;
    app.upload("a.txt", &paragraphs(1)).await;
    let (status, _) = app.upload("b.txt", &paragraphs(1)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_settings_round_trip() {
    let app = TestApp::new().await;

    let (_, settings) = app.call(Method::GET, "/api/v1/settings", None).await;
    assert_eq!(settings["view_mode"], "list");

    let (status, _) = app
        .call(
            Method::PUT,
            "/api/v1/settings",
            Some(json!({"view_mode": "kanban"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, settings) = app.call(Method::GET, "/api/v1/settings", None).await;
    assert_eq!(settings["view_mode"], "kanban");
}

#[tokio::test]
async fn test_onboarding_seeds_pastor_topics() {
    let app = TestApp::new().await;

    let (_, profile) = app.call(Method::GET, "/api/v1/onboarding", None).await;
    assert_eq!(profile["onboarding_complete"], false);

    let (status, body) = app
        .call(Method::POST, "/api/v1/onboarding", Some(json!({"template": "lawyer"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("lawyer"));

    let (status, profile) = app
        .call(Method::POST, "/api/v1/onboarding", Some(json!({"template": "pastor"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["onboarding_complete"], true);
    assert_eq!(profile["template"], "pastor");

    let (_, topics) = app.call(Method::GET, "/api/v1/topics", None).await;
    let numbers: Vec<&str> = topics
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["number"].as_str().unwrap())
        .collect();
    assert_eq!(numbers, vec!["1", "2", "3", "4"]);

    let (status, _) = app
        .call(Method::POST, "/api/v1/onboarding", Some(json!({"template": "blank"})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, stats) = app.call(Method::GET, "/api/v1/dashboard", None).await;
    assert_eq!(stats["total_topics"], 4);
    assert_eq!(stats["root_topics"], 4);
    assert_eq!(stats["total_cards"], 0);
}

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use pfy_auth::issue_token;
use pfy_config::PfyConfig;
use pfy_core::entities::TASK_UPDATED;
use pfy_core::enums::UserRole;
use pfy_db::service::PfyService;
use pfy_server::{AppState, build_router};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{Value, json};

const SECRET: &str = "http-test-secret";

struct TestApp {
    base: String,
    state: AppState,
    client: reqwest::Client,
}

impl TestApp {
    async fn spawn() -> Self {
        let service = Arc::new(PfyService::new_local(":memory:").await.unwrap());
        let mut config = PfyConfig::default();
        config.auth.jwt_secret = SECRET.into();
        let state = AppState::new(service, config);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        let app = build_router(state.clone());
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

        Self {
            base: format!("http://{addr}"),
            state,
            client: reqwest::Client::new(),
        }
    }

    async fn user(&self, name: &str) -> (String, String) {
        self.user_with_role(name, UserRole::User).await
    }

    async fn user_with_role(&self, name: &str, role: UserRole) -> (String, String) {
        let id = self
            .state
            .service
            .create_user(name, &format!("{name}@example.com"), role, None)
            .await
            .unwrap()
            .id;
        let token = issue_token(&id, role, SECRET, 3_600).unwrap();
        (id, token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn get(&self, token: &str, path: &str) -> (StatusCode, Value) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        (resp.status(), resp.json().await.unwrap())
    }

    async fn send(
        &self,
        method: reqwest::Method,
        token: &str,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = self.client.request(method, self.url(path)).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await.unwrap();
        (resp.status(), resp.json().await.unwrap())
    }
}

fn due_in(minutes: i64) -> String {
    (Utc::now() + TimeDelta::minutes(minutes)).to_rfc3339()
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::spawn().await;
    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn api_requires_valid_token() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .get(app.url("/api/v1/tasks"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["errorMessages"].as_array().is_some_and(|a| !a.is_empty()));

    let forged = issue_token("usr-x", UserRole::Admin, "other-secret", 3_600).unwrap();
    let (status, _) = app.get(&forged, "/api/v1/tasks").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_is_limited_to_staff_roles() {
    let app = TestApp::spawn().await;
    let (_, member) = app.user("member").await;
    let (admin_id, admin) = app.user_with_role("boss", UserRole::Admin).await;

    let (status, body) = app.get(&member, "/api/v1/users/me").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, body) = app.get(&admin, "/api/v1/users/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], admin_id.as_str());
    assert_eq!(body["data"]["email"], "boss@example.com");
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn task_listing_paginates_and_filters() {
    let app = TestApp::spawn().await;
    let (_, token) = app.user("ann").await;

    for i in 0..5 {
        let priority = if i % 2 == 0 { "high" } else { "low" };
        let (status, body) = app
            .send(
                reqwest::Method::POST,
                &token,
                "/api/v1/tasks",
                Some(json!({
                    "title": format!("Task {i}"),
                    "priority": priority,
                    "dueDate": due_in(60 * (i + 1)),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["message"], "Task created successfully");
    }

    let mut seen = Vec::new();
    for page in 1..=3 {
        let (status, body) = app
            .get(
                &token,
                &format!("/api/v1/tasks?page={page}&limit=2&sortBy=dueDate&sortOrder=asc"),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["meta"]["total"], 5);
        for task in body["data"].as_array().unwrap() {
            seen.push(task["title"].as_str().unwrap().to_string());
        }
    }
    assert_eq!(seen, (0..5).map(|i| format!("Task {i}")).collect::<Vec<_>>());

    let (_, body) = app.get(&token, "/api/v1/tasks?limit=1").await;
    let first = &body["data"][0];
    for key in ["dueDate", "dueDateNotified", "commentCount", "createdAt"] {
        assert!(first.get(key).is_some(), "missing {key} in {first}");
    }
    assert!(first.get("due_date").is_none());
    assert_eq!(first["creator"]["fullName"], "ann");

    let (_, body) = app.get(&token, "/api/v1/tasks/my-tasks?priority=high").await;
    assert_eq!(body["meta"]["total"], 3);

    let (_, body) = app.get(&token, "/api/v1/tasks?searchTerm=task%204").await;
    assert_eq!(body["meta"]["total"], 1);

    let (status, body) = app.get(&token, "/api/v1/tasks?sortBy=password").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorMessages"][0]["path"], "sortBy");
}

#[tokio::test]
async fn task_update_notifies_group_members_live_and_durably() {
    let app = TestApp::spawn().await;
    let (owner, owner_token) = app.user("owner").await;
    let (member, member_token) = app.user("member").await;
    let (_, outsider_token) = app.user("outsider").await;

    let (_, body) = app
        .send(
            reqwest::Method::POST,
            &owner_token,
            "/api/v1/groups",
            Some(json!({ "title": "Team", "members": [member] })),
        )
        .await;
    let group_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = app
        .send(
            reqwest::Method::POST,
            &owner_token,
            "/api/v1/tasks",
            Some(json!({
                "title": "Ship",
                "dueDate": due_in(600),
                "assignee": { "kind": "group", "id": group_id },
            })),
        )
        .await;
    let task_id = body["data"]["id"].as_str().unwrap().to_string();

    let mut live = app.state.hub.join(&member);
    let (status, body) = app
        .send(
            reqwest::Method::PATCH,
            &owner_token,
            &format!("/api/v1/tasks/{task_id}"),
            Some(json!({ "status": "in_progress" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "in_progress");

    let frame = tokio::time::timeout(Duration::from_secs(2), live.recv())
        .await
        .expect("push within timeout")
        .unwrap();
    assert_eq!(frame.event, TASK_UPDATED);
    assert_eq!(frame.payload.sender_id, owner);
    assert_eq!(frame.payload.message, "Task \"Ship\" was updated");

    let (_, inbox) = app
        .get(&member_token, "/api/v1/notifications/my-notifications")
        .await;
    assert_eq!(inbox["data"]["unreadCount"], 1);
    let notification_id = inbox["data"]["data"][0]["id"].as_str().unwrap().to_string();

    let read_path = format!("/api/v1/notifications/read-notification/{notification_id}");
    for _ in 0..2 {
        let (status, body) = app
            .send(reqwest::Method::POST, &member_token, &read_path, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["isRead"], true);
    }

    let (status, _) = app
        .send(
            reqwest::Method::DELETE,
            &outsider_token,
            &format!("/api/v1/notifications/delete-notification/{notification_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, inbox) = app
        .get(&outsider_token, "/api/v1/notifications/my-notifications")
        .await;
    assert_eq!(inbox["data"]["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn comments_thread_under_their_task() {
    let app = TestApp::spawn().await;
    let (_, ann) = app.user("ann").await;
    let (_, bob) = app.user("bob").await;

    let (_, body) = app
        .send(
            reqwest::Method::POST,
            &ann,
            "/api/v1/tasks",
            Some(json!({ "title": "Discuss", "dueDate": due_in(30) })),
        )
        .await;
    let task_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(
            reqwest::Method::POST,
            &ann,
            "/api/v1/task-comments",
            Some(json!({ "taskId": task_id, "comment": "first" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let parent_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(
            reqwest::Method::POST,
            &bob,
            "/api/v1/task-comments",
            Some(json!({ "taskId": task_id, "comment": "reply", "parentId": parent_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            reqwest::Method::PATCH,
            &bob,
            &format!("/api/v1/task-comments/{parent_id}"),
            Some(json!({ "comment": "hijack" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app
        .get(&ann, &format!("/api/v1/tasks/{task_id}"))
        .await;
    let threads = body["data"]["comments"].as_array().unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0]["comment"], "first");
    assert_eq!(threads[0]["replyThreads"][0]["comment"], "reply");

    let (status, _) = app.get(&ann, "/api/v1/tasks/tsk-missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

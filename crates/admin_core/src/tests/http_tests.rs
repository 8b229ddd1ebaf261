use super::*;
use crate::error::ErrorKind;
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode, Uri},
    Router,
};
use serde_json::{json, Value};
use shared::{domain::Role, error::ErrorCode};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    path: String,
    query: Option<String>,
    auth: Option<String>,
    body: Option<Value>,
}

#[derive(Clone, Default)]
struct ServerState {
    seen: Arc<Mutex<Vec<Seen>>>,
}

fn user_json(id: i64) -> Value {
    json!({
        "id": id,
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "role": "admin",
        "wordsUsed": 120,
        "totalWords": 5000,
        "createdAt": "2024-03-01T09:30:00Z"
    })
}

fn category_tree_json() -> Value {
    json!([
        {
            "id": 1,
            "title": "Web",
            "alias": "web",
            "type": "blueprint",
            "level": 0,
            "children": [
                { "id": 2, "title": "Landing", "alias": "landing", "type": "project", "level": 1, "parentId": 1 }
            ]
        },
        { "id": 3, "title": "Mobile", "alias": "mobile", "type": "blueprint", "level": 0, "children": [] }
    ])
}

/// Answers by method and path; everything unknown is a 404.
async fn respond(method: &Method, path: &str) -> (StatusCode, String) {
    let ok = |value: Value| (StatusCode::OK, value.to_string());
    match (method.as_str(), path) {
        ("GET", "/api/users") => ok(json!({
            "data": [user_json(11)],
            "pagination": { "currentPage": 2, "totalPages": 5, "totalItems": 42, "itemsPerPage": 10 }
        })),
        ("POST", "/api/users") => ok(user_json(77)),
        ("PUT", "/api/users/5") => (
            StatusCode::CONFLICT,
            json!({ "message": "Email already registered" }).to_string(),
        ),
        ("DELETE", "/api/users/5") => (StatusCode::NO_CONTENT, String::new()),
        ("GET", "/api/categories") => ok(json!({ "data": category_tree_json() })),
        ("POST", "/api/categories") => ok(json!({
            "data": { "id": 40, "title": "Desktop", "alias": "desktop", "type": "project", "level": 0 }
        })),
        ("DELETE", "/api/categories/3") => (StatusCode::INTERNAL_SERVER_ERROR, String::new()),
        _ => (StatusCode::NOT_FOUND, String::new()),
    }
}

async fn record_and_respond(
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    state.seen.lock().await.push(Seen {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        auth: headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_str(&body).ok(),
    });
    respond(&method, uri.path()).await
}

async fn spawn_admin_server() -> anyhow::Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .fallback(record_and_respond)
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/api"), state))
}

async fn api(token: Option<&str>) -> (HttpAdminApi, ServerState) {
    let (base_url, state) = spawn_admin_server().await.expect("spawn server");
    let credentials: Arc<dyn CredentialProvider> = match token {
        Some(token) => Arc::new(StaticToken::new(token)),
        None => Arc::new(NoCredentials),
    };
    let api = HttpAdminApi::new(&base_url, credentials).expect("api client");
    (api, state)
}

async fn last_seen(state: &ServerState) -> Seen {
    state
        .seen
        .lock()
        .await
        .last()
        .cloned()
        .expect("server saw a request")
}

#[tokio::test]
async fn list_users_sends_paging_and_search_with_bearer() {
    let (api, state) = api(Some("session-token")).await;

    let page = api
        .users()
        .list(&ListQuery::new(2, 10, "  ada "))
        .await
        .expect("list users");

    let seen = last_seen(&state).await;
    assert_eq!(seen.method, Method::GET);
    assert_eq!(seen.path, "/api/users");
    assert_eq!(seen.query.as_deref(), Some("page=2&limit=10&search=ada"));
    assert_eq!(seen.auth.as_deref(), Some("Bearer session-token"));

    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages, 5);
    assert_eq!(page.total_items, 42);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, UserId(11));
    assert_eq!(page.items[0].role, Role::Admin);
    assert!(page.items[0].created_at.is_some());
}

#[tokio::test]
async fn blank_search_is_omitted_and_no_credentials_send_no_header() {
    let (api, state) = api(None).await;

    api.users()
        .list(&ListQuery::new(1, 10, "   "))
        .await
        .expect("list users");

    let seen = last_seen(&state).await;
    assert_eq!(seen.query.as_deref(), Some("page=1&limit=10"));
    assert_eq!(seen.auth, None);
}

#[tokio::test]
async fn category_list_without_pagination_is_a_single_page() {
    let (api, _state) = api(Some("t")).await;

    let page = api
        .categories()
        .list(&ListQuery::new(1, 25, ""))
        .await
        .expect("list categories");

    assert_eq!(page.page, 1);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.total_items, 2);
    assert_eq!(page.page_size, 25);
    assert_eq!(page.items[0].children().len(), 1);
    assert_eq!(page.items[0].children()[0].parent_id, Some(CategoryId(1)));
    assert!(!page.items[1].has_children());
}

#[tokio::test]
async fn create_accepts_bare_and_wrapped_records() {
    let (api, state) = api(Some("t")).await;

    let user = api
        .users()
        .create_user(&CreateUserRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            role: Role::Admin,
            password: "engine".into(),
        })
        .await
        .expect("create user");
    assert_eq!(user.id, UserId(77));

    let sent = last_seen(&state).await;
    assert_eq!(sent.method, Method::POST);
    let body = sent.body.expect("json body");
    assert_eq!(body["firstName"], "Ada");
    assert_eq!(body["role"], "admin");

    let category = api
        .categories()
        .create_category(&CreateCategoryRequest {
            title: "Desktop".into(),
            alias: "desktop".into(),
            kind: shared::domain::CategoryType::Project,
            level: 0,
            parent_id: None,
        })
        .await
        .expect("create category");
    assert_eq!(category.id, CategoryId(40));
    assert_eq!(last_seen(&state).await.body.expect("json body")["type"], "project");
}

#[tokio::test]
async fn rejected_update_surfaces_server_message() {
    let (api, state) = api(Some("t")).await;

    let err = api
        .users()
        .update_user(
            UserId(5),
            &UpdateUserRequest {
                email: Some("taken@example.com".into()),
                ..UpdateUserRequest::default()
            },
        )
        .await
        .expect_err("conflict");

    assert_eq!(err.kind(), ErrorKind::Rejected);
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.code(), Some(ErrorCode::Conflict));
    assert_eq!(err.message(), "Email already registered");

    let seen = last_seen(&state).await;
    assert_eq!(seen.method, Method::PUT);
    assert_eq!(seen.path, "/api/users/5");
    assert_eq!(seen.auth.as_deref(), Some("Bearer t"));
}

#[tokio::test]
async fn delete_treats_missing_record_as_done() {
    let (api, state) = api(Some("t")).await;

    api.users().delete_user(UserId(5)).await.expect("delete");
    api.users()
        .delete_user(UserId(404))
        .await
        .expect("already gone");

    let seen = state.seen.lock().await.clone();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|request| request.method == Method::DELETE));
    assert_eq!(seen[1].path, "/api/users/404");
}

#[tokio::test]
async fn server_error_without_body_reports_status() {
    let (api, _state) = api(Some("t")).await;

    let err = api
        .categories()
        .delete_category(CategoryId(3))
        .await
        .expect_err("server error");

    assert_eq!(err.kind(), ErrorKind::Rejected);
    assert_eq!(err.message(), "request failed with status 500");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");

    let api = HttpAdminApi::new(&format!("http://{addr}/api"), Arc::new(NoCredentials))
        .expect("api client");
    let err = api
        .users()
        .list(&ListQuery::new(1, 10, ""))
        .await
        .expect_err("nothing listening");

    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[test]
fn base_url_must_parse() {
    let err = HttpAdminApi::new("not a url", Arc::new(NoCredentials))
        .err()
        .expect("invalid url");
    assert_eq!(err.kind(), ErrorKind::Validation);
}

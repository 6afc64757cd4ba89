//! Route tests driving the router in-process.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use todo_list_lib::repository::parse_connection_string;
use todo_list_lib::AppState;
use tower::ServiceExt;

use crate::app::build_router;
use crate::config::Config;
use crate::context::WebState;
use crate::models::ListView;

const BOUNDARY: &str = "todo-test-boundary";

async fn test_router() -> Router {
    let app = AppState::open(std::path::Path::new(":memory:"))
        .await
        .expect("Failed to open in-memory DB");
    build_router(WebState::new(app, Config::for_tests()))
}

fn get(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-forwarded-user", user);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, user: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("x-forwarded-user", user)
        .header("x-forwarded-user-id", format!("id-{}", user))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

fn post_file(user: &str, file_name: &str, content: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n{c}\r\n--{b}--\r\n",
        b = BOUNDARY,
        f = file_name,
        c = content
    );
    Request::builder()
        .method(Method::POST)
        .uri("/Todo/Import")
        .header("x-forwarded-user", user)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send_view(router: &Router, request: Request<Body>) -> (StatusCode, ListView) {
    let (status, body) = send(router, request).await;
    let view = serde_json::from_slice(&body).expect("body is not a list view");
    (status, view)
}

fn text(body: &[u8]) -> &str {
    std::str::from_utf8(body).unwrap()
}

#[tokio::test]
async fn test_health_and_missing_identity() {
    let router = test_router().await;

    let (status, body) = send(&router, get("/healthz", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text(&body), "ok");

    let (status, _) = send(&router, get("/Todo/ListTodos", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&router, get("/Todo/ListTodos", Some("   "))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_add_list_and_toggle() {
    let router = test_router().await;

    let (status, view) =
        send_view(&router, post_form("/Todo/AddTodo", "alice", "Description=buy+milk&Category=home")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view.todo_items.len(), 1);
    assert!(view.message.is_none());
    let item = view.todo_items[0].clone();
    assert_eq!(item.description, "buy milk");
    assert_eq!(item.category, "home");
    assert_eq!(item.owner_id, "id-alice");

    // other users see nothing
    let (_, view) = send_view(&router, get("/Todo/ListTodos", Some("bob"))).await;
    assert!(view.todo_items.is_empty());

    let form = format!("id={}&isChecked=true", item.id);
    let (status, _) = send(&router, post_form("/Todo/UpdateCheckboxState", "bob", &form)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, post_form("/Todo/UpdateCheckboxState", "alice", &form)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, view) = send_view(&router, get("/Todo/ListTodos", Some("alice"))).await;
    assert!(view.todo_items[0].is_completed);
}

#[tokio::test]
async fn test_add_rejects_long_description() {
    let router = test_router().await;
    let form = format!("Description={}&Category=x", "a".repeat(1024));

    let (status, view) = send_view(&router, post_form("/Todo/AddTodo", "alice", &form)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(view.todo_items.is_empty());
    assert_eq!(
        view.message.as_deref(),
        Some("Description must be less than or equal to 1024 characters")
    );
}

#[tokio::test]
async fn test_export() {
    let router = test_router().await;
    send(&router, post_form("/Todo/AddTodo", "alice", "Description=one&Category=a")).await;

    let (status, body) = send(&router, get("/Todo/Export", Some("alice"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body), "Missing format");

    let (status, _) = send(&router, get("/Todo/Export?format=csv", Some("alice"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let response = router
        .clone()
        .oneshot(get("/Todo/Export?format=xml", Some("alice")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"todos.xml\""
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(text(&bytes).contains("<Description>one</Description>"));

    let (status, body) = send(&router, get("/Todo/Export?format=json", Some("alice"))).await;
    assert_eq!(status, StatusCode::OK);
    let exported: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(exported[0]["Description"], "one");
}

#[tokio::test]
async fn test_import() {
    let router = test_router().await;

    let json = r#"[{"Description":"from json","Category":"a"},{"Description":"second","Category":"b"}]"#;
    let (status, view) = send_view(&router, post_file("alice", "todos.json", json)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view.todo_items.len(), 2);

    let (status, view) = send_view(&router, post_file("alice", "todos.csv", "a;b\nc;d")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        view.message.as_deref(),
        Some("Import failed: unrecognized import format")
    );
    assert_eq!(view.todo_items.len(), 2);

    let partial = format!(
        r#"[{{"Description":"kept"}},{{"Description":"{}"}},{{"Description":"never"}}]"#,
        "x".repeat(2000)
    );
    let (status, view) = send_view(&router, post_file("alice", "todos.json", &partial)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(view.message.unwrap().starts_with("Import failed: item 2 of 3"));
    let descriptions: Vec<_> = view.todo_items.iter().map(|i| i.description.as_str()).collect();
    assert_eq!(descriptions, vec!["from json", "second", "kept"]);
}

#[tokio::test]
async fn test_filters() {
    let router = test_router().await;
    send(&router, post_form("/Todo/AddTodo", "alice", "Description=one&Category=work")).await;
    send(&router, post_form("/Todo/AddTodo", "alice", "Description=two&Category=home")).await;

    let form = "name=work&category=work&fromDate=&fromTime=&toDate=&toTime=";
    let (status, view) = send_view(&router, post_form("/Todo/AddFilter", "alice", form)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view.filters.len(), 1);
    assert_eq!(view.filters[0].name, "work");

    let (status, view) =
        send_view(&router, post_form("/Todo/AddFilter", "alice", "name=work&category=home")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(view.message.as_deref(), Some("Filter work already exists"));
    assert_eq!(view.todo_items.len(), 2);
    assert_eq!(view.filters.len(), 1);

    let (status, view) =
        send_view(&router, post_form("/Todo/AddFilter", "alice", "name=+&category=home")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(view.message.as_deref(), Some("Filter name is required"));
    assert_eq!(view.filters.len(), 1);

    let (status, view) = send_view(&router, get("/Todo/ApplyFilter?name=work", Some("alice"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view.todo_items.len(), 1);
    assert_eq!(view.todo_items[0].description, "one");
    assert_eq!(view.filters.len(), 1);

    send(&router, post_form("/Todo/AddTodo", "bob", "Description=bobs&Category=work")).await;
    let (status, view) = send_view(&router, get("/Todo/ApplyFilter?name=work", Some("bob"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(view.message.as_deref(), Some("Filter not found"));
    assert_eq!(view.todo_items.len(), 1);
    assert_eq!(view.todo_items[0].description, "bobs");
    assert!(view.filters.is_empty());
}

#[tokio::test]
async fn test_import_upload_with_byte_order_mark() {
    let router = test_router().await;

    let json = "\u{feff}[{\"Description\":\"bom json\"}]";
    let (status, view) = send_view(&router, post_file("alice", "todos.json", json)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view.todo_items.len(), 1);

    let xml = "\u{feff}<?xml version=\"1.0\" encoding=\"utf-8\"?><ArrayOfTodoItem><TodoItem><Description>bom xml</Description></TodoItem></ArrayOfTodoItem>";
    let (status, view) = send_view(&router, post_file("alice", "todos.xml", xml)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(view.message.is_none());

    let descriptions: Vec<_> = view.todo_items.iter().map(|i| i.description.as_str()).collect();
    assert_eq!(descriptions, vec!["bom json", "bom xml"]);
}

#[tokio::test]
async fn test_file_backed_database() {
    let dir = tempfile::TempDir::new().unwrap();
    let url = format!("Data Source={}", dir.path().join("todo.db").display());
    let path = parse_connection_string(&url).unwrap();

    let router = build_router(WebState::new(
        AppState::open(&path).await.unwrap(),
        Config::for_tests(),
    ));
    send(&router, post_form("/Todo/AddTodo", "alice", "Description=persisted")).await;

    // a second process-level state on the same file sees the item
    let reopened = build_router(WebState::new(
        AppState::open(&path).await.unwrap(),
        Config::for_tests(),
    ));
    let (_, view) = send_view(&reopened, get("/Todo/ListTodos", Some("alice"))).await;
    assert_eq!(view.todo_items.len(), 1);
    assert_eq!(view.todo_items[0].description, "persisted");
}

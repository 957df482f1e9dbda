use axum::body::to_bytes;
use axum::Router;
use serde_json::json;

use tasks_api::application::task_service::TaskServiceImpl;
use tasks_api::domain::repository::TaskRepository;
use tasks_api::http::routing::{self, tasks};
use tasks_api::infrastructure::sqlite_repo::SqliteTaskRepository;

async fn app() -> Router {
    // in-memory sqlite, one database per test
    let repo = SqliteTaskRepository::connect("sqlite::memory:").await.unwrap();
    repo.init().await.unwrap();
    let service = TaskServiceImpl::new(repo);
    routing::app(tasks::router(tasks::AppState { service }))
}

#[tokio::test]
async fn acceptance_create_list_update_delete() {
    let app = app().await;

    // create
    let res = request(&app, "POST", "/tasks", Some(json!({ "title": "Buy milk" }))).await;
    assert_eq!(res.status(), 201);
    let body = read_json(res).await;
    let id = body["id"].as_i64().unwrap();
    assert_eq!(body["title"], "Buy milk");
    assert_eq!(body["completed"], false);
    assert!(body["created_at"].is_string());

    // list contains exactly the created task
    let res = request(&app, "GET", "/tasks", None).await;
    assert_eq!(res.status(), 200);
    let listed = read_json(res).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], id);

    // partial update: completed only, title preserved
    let res = request(&app, "PUT", &format!("/tasks/{id}"), Some(json!({ "completed": true }))).await;
    assert_eq!(res.status(), 200);
    let updated = read_json(res).await;
    assert_eq!(updated["title"], "Buy milk");
    assert_eq!(updated["completed"], true);

    // partial update: title only, completed preserved
    let res = request(&app, "PUT", &format!("/tasks/{id}"), Some(json!({ "title": "Buy oat milk" }))).await;
    assert_eq!(res.status(), 200);
    let updated = read_json(res).await;
    assert_eq!(updated["title"], "Buy oat milk");
    assert_eq!(updated["completed"], true);

    // delete is a 200 ack, and repeating it is a no-op success
    let res = request(&app, "DELETE", &format!("/tasks/{id}"), None).await;
    assert_eq!(res.status(), 200);
    let res = request(&app, "DELETE", &format!("/tasks/{id}"), None).await;
    assert_eq!(res.status(), 200);

    // deleted task no longer listed
    let res = request(&app, "GET", "/tasks", None).await;
    let listed = read_json(res).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn acceptance_blank_title_rejected() {
    let app = app().await;

    for payload in [json!({ "title": "" }), json!({ "title": "   " })] {
        let res = request(&app, "POST", "/tasks", Some(payload)).await;
        assert_eq!(res.status(), 400);
        let body = read_json(res).await;
        assert!(body["error"].is_string());
    }

    // no row was inserted
    let res = request(&app, "GET", "/tasks", None).await;
    let listed = read_json(res).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn acceptance_update_validation_and_not_found() {
    let app = app().await;

    let res = request(&app, "POST", "/tasks", Some(json!({ "title": "A" }))).await;
    let id = read_json(res).await["id"].as_i64().unwrap();

    // empty partial rejected, row unaltered
    let res = request(&app, "PUT", &format!("/tasks/{id}"), Some(json!({}))).await;
    assert_eq!(res.status(), 400);
    let res = request(&app, "GET", "/tasks", None).await;
    let listed = read_json(res).await;
    assert_eq!(listed[0]["title"], "A");
    assert_eq!(listed[0]["completed"], false);

    // blank title rejected
    let res = request(&app, "PUT", &format!("/tasks/{id}"), Some(json!({ "title": "  " }))).await;
    assert_eq!(res.status(), 400);

    // unknown id
    let res = request(&app, "PUT", "/tasks/999999", Some(json!({ "completed": true }))).await;
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn acceptance_list_is_newest_first() {
    let app = app().await;

    for title in ["T1", "T2", "T3"] {
        let res = request(&app, "POST", "/tasks", Some(json!({ "title": title }))).await;
        assert_eq!(res.status(), 201);
    }

    let res = request(&app, "GET", "/tasks", None).await;
    let listed = read_json(res).await;
    let titles: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["T3", "T2", "T1"]);
}

async fn request(app: &Router, method: &str, path: &str, body: Option<serde_json::Value>) -> hyper::Response<axum::body::Body> {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    let req = Request::builder().method(Method::from_bytes(method.as_bytes()).unwrap()).uri(path);
    let req = match body {
        Some(json) => req.header("content-type", "application/json").body(Body::from(json.to_string())).unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
}

async fn read_json(res: hyper::Response<axum::body::Body>) -> serde_json::Value {
    serde_json::from_slice(&to_bytes(res.into_body(), 1024 * 1024).await.unwrap()).unwrap()
}

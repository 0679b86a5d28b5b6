//! HTTP routing and response tests.
//!
//! Drives the full router with `oneshot` requests against a mock engine.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use duckie::db::{DataSources, FailingEngine, MockEngine, Value};
use duckie::query::QueryService;
use duckie::web::router;
use pretty_assertions::assert_eq;
use tower::ServiceExt;

const FORM: &str = "application/x-www-form-urlencoded";

fn mock_engine() -> Arc<MockEngine> {
    Arc::new(
        MockEngine::new()
            .with_table("stores.csv", &[("id", "BIGINT"), ("city", "VARCHAR")])
            .with_table("staff.csv", &[("name", "VARCHAR")])
            .with_result(
                "SELECT * FROM stores",
                2,
                vec![
                    vec![Value::Int(1), Value::from("Oslo")],
                    vec![Value::Int(2), Value::Null],
                ],
            ),
    )
}

fn app(engine: Arc<MockEngine>) -> Router {
    let sources = DataSources::new(["stores.csv", "staff.csv"]);
    router(QueryService::new(engine, sources))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/query")
        .header(header::CONTENT_TYPE, FORM)
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_root_without_selection_shows_prompt() {
    let engine = mock_engine();
    let (status, body) = send(app(engine.clone()), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Please choose data source from above."));
    assert!(body.contains("<option value=\"stores.csv\">stores.csv</option>"));
    assert!(body.contains("<option value=\"staff.csv\">staff.csv</option>"));
    assert!(body.contains("<th>column_name</th>"));
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_empty_datasource_means_no_selection() {
    let engine = mock_engine();
    let (status, body) = send(app(engine.clone()), get("/query?datasource=")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Please choose data source from above."));
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_describe_selected_source() {
    let (status, body) = send(app(mock_engine()), get("/query?datasource=stores.csv")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<option value=\"stores.csv\" selected>stores.csv</option>"));
    assert!(body.contains("DESCRIBE SELECT * FROM &quot;stores.csv&quot;"));
    assert!(body.contains("<td>city</td><td>VARCHAR</td>"));
}

#[tokio::test]
async fn test_describe_unlisted_source_is_rejected() {
    let engine = mock_engine();
    let (status, body) = send(app(engine.clone()), get("/query?datasource=secrets.csv")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        "Validation error: selected data source does not exist"
    );
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_post_query_renders_rows() {
    let (status, body) = send(
        app(mock_engine()),
        post_form("datasource=stores.csv&query=SELECT+*+FROM+stores"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<th>id</th><th>city</th>"));
    assert!(body.contains("<td>1</td><td>Oslo</td>"));
    assert!(body.contains("<td class=\"null\">NULL</td>"));
    assert!(body.contains("SELECT * FROM stores</textarea>"));
    assert!(body.contains("<input type=\"hidden\" name=\"datasource\" value=\"stores.csv\">"));
}

#[tokio::test]
async fn test_post_query_as_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/query")
        .header(header::CONTENT_TYPE, FORM)
        .header(header::ACCEPT, "application/json")
        .body(Body::from("datasource=stores.csv&query=SELECT+*+FROM+stores"))
        .unwrap();
    let (status, body) = send(app(mock_engine()), request).await;

    assert_eq!(status, StatusCode::OK);
    let page: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        page,
        serde_json::json!({
            "selectedSource": "stores.csv",
            "dataSourceChoices": ["stores.csv", "staff.csv"],
            "query": "SELECT * FROM stores",
            "columns": ["id", "city"],
            "results": [[1, "Oslo"], [2, null]],
        })
    );
}

#[tokio::test]
async fn test_post_non_select_is_rejected_before_engine() {
    let engine = mock_engine();
    let (status, body) = send(
        app(engine.clone()),
        post_form("datasource=stores.csv&query=DELETE+FROM+stores"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Validation error: Not a SELECT statement");
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_post_unparsable_query_is_syntax_error() {
    let (status, body) = send(
        app(mock_engine()),
        post_form("datasource=stores.csv&query=SELEC+id+FRM"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with("Syntax error: "));
}

#[tokio::test]
async fn test_post_unlisted_source_short_circuits() {
    let engine = mock_engine();
    let (status, _) = send(
        app(engine.clone()),
        post_form("datasource=secrets.csv&query=SELECT+*+FROM+stores"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_engine_failure_is_server_error() {
    let sources = DataSources::new(["stores.csv"]);
    let app = router(QueryService::new(Arc::new(FailingEngine), sources));
    let (status, body) = send(app, get("/query?datasource=stores.csv")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.starts_with("Engine error: "));
}

#[tokio::test]
async fn test_unknown_paths_are_not_found() {
    for uri in ["/other", "/query/", "/query/extra"] {
        let (status, body) = send(app(mock_engine()), get(uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "path {uri}");
        assert_eq!(body, "404 page not found");
    }
}

#[tokio::test]
async fn test_unsupported_method_on_query() {
    let request = Request::builder()
        .method("DELETE")
        .uri("/query")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(mock_engine()), request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

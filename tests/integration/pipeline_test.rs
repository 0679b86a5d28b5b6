//! End-to-end query pipeline tests against DuckDB.
//!
//! Each test writes its CSV fixtures into a fresh temp directory.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::NaiveDate;
use duckie::config::EngineConfig;
use duckie::db::{DataSources, DuckDbEngine, Value};
use duckie::error::DuckieError;
use duckie::query::QueryService;
use duckie::web::router;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tower::ServiceExt;

const PEOPLE_CSV: &str = "id,name,joined\n1,Ada,2024-01-02\n2,Grace,1906-12-09\n3,Linus,1969-12-28\n";
const TEAMS_CSV: &str = "team,size\nstorage,4\nweb,2\n";

fn fixture() -> (TempDir, QueryService) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("people.csv"), PEOPLE_CSV).unwrap();
    std::fs::write(dir.path().join("teams.csv"), TEAMS_CSV).unwrap();

    let config = EngineConfig {
        data_dir: dir.path().to_path_buf(),
        threads: 1,
        max_connections: 2,
        ..EngineConfig::default()
    };
    let engine = Arc::new(DuckDbEngine::new(&config));
    let service = QueryService::new(engine, DataSources::new(["people.csv", "teams.csv"]));
    (dir, service)
}

#[tokio::test]
async fn test_describe_source() {
    let (_dir, service) = fixture();
    let outcome = service.describe(Some("people.csv")).await.unwrap();

    assert_eq!(
        outcome.result.columns,
        vec!["column_name", "column_type", "null", "key", "default", "extra"]
    );
    let names: Vec<_> = outcome
        .result
        .rows
        .iter()
        .map(|row| row[0].to_display_string())
        .collect();
    assert_eq!(names, vec!["id", "name", "joined"]);
    assert_eq!(outcome.query, "DESCRIBE SELECT * FROM \"people.csv\"");
}

#[tokio::test]
async fn test_wildcard_query() {
    let (_dir, service) = fixture();
    let outcome = service
        .run(
            Some("people.csv"),
            "SELECT * FROM \"people.csv\" ORDER BY id",
        )
        .await
        .unwrap();

    assert_eq!(outcome.result.columns, vec!["id", "name", "joined"]);
    assert_eq!(outcome.result.row_count(), 3);
    assert_eq!(
        outcome.result.rows[0],
        vec![
            Value::Int(1),
            Value::from("Ada"),
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
        ]
    );
}

#[tokio::test]
async fn test_wildcard_with_exclude() {
    let (_dir, service) = fixture();
    let outcome = service
        .run(
            Some("people.csv"),
            "SELECT * EXCLUDE (joined) FROM \"people.csv\" WHERE id = 3",
        )
        .await
        .unwrap();

    assert_eq!(outcome.result.columns, vec!["id", "name"]);
    assert_eq!(
        outcome.result.rows,
        vec![vec![Value::Int(3), Value::from("Linus")]]
    );
}

#[tokio::test]
async fn test_named_and_computed_columns() {
    let (_dir, service) = fixture();
    let outcome = service
        .run(
            Some("people.csv"),
            "SELECT name, id * 2 AS doubled FROM \"people.csv\" WHERE id = 2",
        )
        .await
        .unwrap();

    assert_eq!(outcome.result.columns, vec!["name", "doubled"]);
    assert_eq!(
        outcome.result.rows,
        vec![vec![Value::from("Grace"), Value::Int(4)]]
    );
}

#[tokio::test]
async fn test_explicit_columns_without_selection() {
    let (_dir, service) = fixture();
    let outcome = service
        .run(None, "SELECT team FROM \"teams.csv\" ORDER BY team")
        .await
        .unwrap();

    assert!(outcome.source.is_none());
    assert_eq!(outcome.result.columns, vec!["team"]);
    assert_eq!(outcome.result.row_count(), 2);
}

#[tokio::test]
async fn test_empty_result_keeps_columns() {
    let (_dir, service) = fixture();
    let outcome = service
        .run(
            Some("people.csv"),
            "SELECT id, name FROM \"people.csv\" WHERE 1 = 0",
        )
        .await
        .unwrap();

    assert_eq!(outcome.result.columns, vec!["id", "name"]);
    assert!(outcome.result.is_empty());
}

#[tokio::test]
async fn test_wildcard_over_other_source_is_consistency_error() {
    let (_dir, service) = fixture();
    // Columns are resolved from people.csv but the engine reads teams.csv
    let err = service
        .run(Some("people.csv"), "SELECT * FROM \"teams.csv\"")
        .await
        .unwrap_err();

    assert!(matches!(err, DuckieError::Consistency(_)), "{err:?}");
}

#[tokio::test]
async fn test_unknown_column_is_engine_error() {
    let (_dir, service) = fixture();
    let err = service
        .run(Some("people.csv"), "SELECT emal FROM \"people.csv\"")
        .await
        .unwrap_err();

    assert!(matches!(err, DuckieError::Engine(_)), "{err:?}");
}

#[tokio::test]
async fn test_http_round_trip() {
    let (_dir, service) = fixture();
    let request = Request::builder()
        .method("POST")
        .uri("/query")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::ACCEPT, "application/json")
        .body(Body::from(
            "datasource=people.csv&query=SELECT+name+FROM+%22people.csv%22+WHERE+id+%3D+1",
        ))
        .unwrap();

    let response = router(service).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let page: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(page["selectedSource"], "people.csv");
    assert_eq!(page["columns"], serde_json::json!(["name"]));
    assert_eq!(page["results"], serde_json::json!([["Ada"]]));
}

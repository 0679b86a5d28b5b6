//! HTTP request handlers.
//!
//! Each handler runs one pipeline operation and answers with the rendered
//! page, or with the page model as JSON when the client asks for it.

use axum::{
    extract::{Form, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::page::PageModel;
use super::render::render_page;
use crate::error::DuckieError;
use crate::query::{QueryOutcome, QueryService};

/// Shared state handed to every handler.
pub struct AppState {
    pub service: QueryService,
}

/// Query string of `GET /` and `GET /query`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DescribeParams {
    pub datasource: Option<String>,
}

/// Form body of `POST /query`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QueryForm {
    pub datasource: Option<String>,
    pub query: String,
}

/// `GET /` and `GET /query?datasource=...`: describes the selected source.
pub async fn query_page_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DescribeParams>,
    headers: HeaderMap,
) -> Response {
    match state.service.describe(params.datasource.as_deref()).await {
        Ok(outcome) => page_response(&state, outcome, &headers),
        Err(e) => e.into_response(),
    }
}

/// `POST /query`: runs the submitted query against the selected source.
pub async fn query_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<QueryForm>,
) -> Response {
    match state
        .service
        .run(form.datasource.as_deref(), &form.query)
        .await
    {
        Ok(outcome) => page_response(&state, outcome, &headers),
        Err(e) => e.into_response(),
    }
}

/// Fallback for every other path.
pub async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "404 page not found")
}

fn page_response(state: &AppState, outcome: QueryOutcome, headers: &HeaderMap) -> Response {
    let page = PageModel::from_outcome(state.service.sources(), outcome);
    if wants_json(headers) {
        Json(page).into_response()
    } else {
        Html(render_page(&page)).into_response()
    }
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

/// HTTP status for each error category.
pub fn status_for(error: &DuckieError) -> StatusCode {
    match error {
        DuckieError::Validation(_) | DuckieError::Syntax(_) => StatusCode::BAD_REQUEST,
        DuckieError::EngineBusy(_) => StatusCode::SERVICE_UNAVAILABLE,
        DuckieError::Engine(_)
        | DuckieError::Consistency(_)
        | DuckieError::Config(_)
        | DuckieError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for DuckieError {
    fn into_response(self) -> Response {
        (status_for(&self), self.to_string()).into_response()
    }
}

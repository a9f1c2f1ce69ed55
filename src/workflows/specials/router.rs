use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::NamedSpecial;
use super::repository::{SpecialRecordView, SpecialsRepository};
use super::service::{SpecialsService, SpecialsServiceError};

#[derive(Debug, Deserialize)]
pub(crate) struct ExtractRequest {
    pub(crate) text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GroupDaysRequest {
    pub(crate) lines: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SaveNamedRequest {
    pub(crate) restaurant_name: String,
    pub(crate) special_details: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DaySpecialPayload {
    pub(crate) day: String,
    #[serde(default)]
    pub(crate) description: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SaveDaysRequest {
    pub(crate) restaurant_name: String,
    pub(crate) specials: Vec<DaySpecialPayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    pub(crate) limit: Option<usize>,
}

struct RouterState<R> {
    service: Arc<SpecialsService<R>>,
    default_limit: usize,
}

impl<R> Clone for RouterState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            default_limit: self.default_limit,
        }
    }
}

/// Router builder exposing extraction, grouping, and persistence endpoints.
pub fn specials_router<R>(service: Arc<SpecialsService<R>>, default_limit: usize) -> Router
where
    R: SpecialsRepository + 'static,
{
    Router::new()
        .route("/api/v1/specials/extract", post(extract_handler::<R>))
        .route("/api/v1/specials/days", post(group_days_handler::<R>))
        .route("/api/v1/specials/days/save", post(save_days_handler::<R>))
        .route(
            "/api/v1/specials",
            post(save_named_handler::<R>).get(list_handler::<R>),
        )
        .with_state(RouterState {
            service,
            default_limit,
        })
}

async fn extract_handler<R>(
    State(state): State<RouterState<R>>,
    Json(request): Json<ExtractRequest>,
) -> Response
where
    R: SpecialsRepository + 'static,
{
    let draft = state.service.draft(&request.text);
    (StatusCode::OK, Json(draft)).into_response()
}

async fn group_days_handler<R>(
    State(state): State<RouterState<R>>,
    Json(request): Json<GroupDaysRequest>,
) -> Response
where
    R: SpecialsRepository + 'static,
{
    let report = state.service.group_days(&request.lines);
    (StatusCode::OK, Json(report)).into_response()
}

async fn save_named_handler<R>(
    State(state): State<RouterState<R>>,
    Json(request): Json<SaveNamedRequest>,
) -> Response
where
    R: SpecialsRepository + 'static,
{
    let special = NamedSpecial {
        name: request.restaurant_name,
        details: request.special_details,
    };
    match state.service.save_named(special) {
        Ok(record) => (StatusCode::CREATED, Json(record.view())).into_response(),
        Err(error) => error_response(error),
    }
}

async fn save_days_handler<R>(
    State(state): State<RouterState<R>>,
    Json(request): Json<SaveDaysRequest>,
) -> Response
where
    R: SpecialsRepository + 'static,
{
    let pairs = request
        .specials
        .into_iter()
        .map(|payload| (payload.day, payload.description));
    match state.service.save_days(&request.restaurant_name, pairs) {
        Ok(records) => {
            let views: Vec<SpecialRecordView> = records.iter().map(|record| record.view()).collect();
            (StatusCode::CREATED, Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn list_handler<R>(
    State(state): State<RouterState<R>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: SpecialsRepository + 'static,
{
    let limit = query.limit.unwrap_or(state.default_limit);
    match state.service.recent(limit) {
        Ok(records) => {
            let views: Vec<SpecialRecordView> = records.iter().map(|record| record.view()).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: SpecialsServiceError) -> Response {
    let status = if error.is_validation() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        tracing::error!(%error, "specials store failure");
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

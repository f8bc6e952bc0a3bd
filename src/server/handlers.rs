use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::cli::{DatasetArgs, QueryArgs, SearchArgs};
use crate::error::AppError;
use crate::query::{Criteria, FilterValues, NameSearchResponse, QueryResponse};
use crate::store::{DatasetKey, DatasetSummary};
use crate::websearch::WebSearchRequest;

use super::state::AppState;

/// GET /health - liveness plus the datasets currently in memory
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let engine = state.engine();
    Json(json!({
        "status": "ok",
        "datasets": engine.registry().loaded(),
    }))
}

/// GET /seniors - composite filter over a dataset
pub async fn list_seniors(
    State(state): State<AppState>,
    Query(args): Query<QueryArgs>,
) -> Result<Json<QueryResponse>, AppError> {
    let criteria = Criteria::try_from(&args)?;
    let key = DatasetKey::from_param(args.academic_year.as_deref());
    let response = state.with_engine(move |engine| engine.query(&key, &criteria)).await?;
    Ok(Json(response))
}

/// GET /seniors/:roll_no - a miss is a normal `{"error": "not found"}` body
pub async fn get_senior(
    State(state): State<AppState>,
    Path(roll_no): Path<String>,
    Query(args): Query<DatasetArgs>,
) -> Result<Response, AppError> {
    let key = DatasetKey::from_param(args.academic_year.as_deref());
    let found = state
        .with_engine(move |engine| engine.get_by_id(&roll_no, &key))
        .await?;

    Ok(match found {
        Some(record) => Json(record).into_response(),
        None => Json(json!({ "error": "not found" })).into_response(),
    })
}

/// GET /search - ranked name search
pub async fn search_by_name(
    State(state): State<AppState>,
    Query(args): Query<SearchArgs>,
) -> Result<Json<NameSearchResponse>, AppError> {
    let key = DatasetKey::from_param(args.academic_year.as_deref());
    let response = state
        .with_engine(move |engine| engine.search_by_name(&args.name, args.limit, &key))
        .await?;
    Ok(Json(response))
}

/// GET /filters - dropdown values
pub async fn filters(
    State(state): State<AppState>,
    Query(args): Query<DatasetArgs>,
) -> Result<Json<FilterValues>, AppError> {
    let key = DatasetKey::from_param(args.academic_year.as_deref());
    let values = state
        .with_engine(move |engine| engine.list_filter_values(&key))
        .await?;
    Ok(Json(values))
}

/// POST /reload - re-read a dataset source and swap the cached snapshot
pub async fn reload_dataset(
    State(state): State<AppState>,
    Query(args): Query<DatasetArgs>,
) -> Result<Json<DatasetSummary>, AppError> {
    let key = DatasetKey::from_param(args.academic_year.as_deref());
    let summary = state
        .with_engine(move |engine| Ok(engine.registry().reload(&key)?.summary()))
        .await?;
    Ok(Json(summary))
}

/// POST /proxy/linkedin-search - provider JSON passed through unchanged
pub async fn linkedin_search(
    State(state): State<AppState>,
    Json(request): Json<WebSearchRequest>,
) -> Result<Json<Value>, AppError> {
    let body = state.web_search().search(&request).await?;
    Ok(Json(body))
}

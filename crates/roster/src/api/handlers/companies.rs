//! Company handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::company::{Company, CreateCompanyRequest};

#[instrument(skip(state, request))]
pub async fn create_company(
    State(state): State<AppState>,
    Json(request): Json<CreateCompanyRequest>,
) -> ApiResult<impl IntoResponse> {
    let company = state.companies.create_company(request).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

#[instrument(skip(state))]
pub async fn list_companies(State(state): State<AppState>) -> ApiResult<Json<Vec<Company>>> {
    Ok(Json(state.companies.list_companies().await?))
}

#[instrument(skip(state))]
pub async fn delete_company(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.companies.delete_company(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

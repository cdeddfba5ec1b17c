//! Store/registration listing, detail view, and lifecycle transitions.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tindago_core::{
    LifecycleAction, RecordDetail, StoreRecord, StoreStatus, TransitionOutcome, TransitionRequest,
};

use crate::middleware::RequestId;

use super::{
    map_db_error, map_lifecycle_error, normalize_limit, ApiError, ApiResponse, AppState,
    ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(super) struct StoreListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct StoreListItem {
    pub id: String,
    pub status: StoreStatus,
    pub display_name: String,
    pub owner_name: Option<String>,
    pub business_category: Option<String>,
    pub document_count: usize,
    pub version: i64,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<StoreRecord> for StoreListItem {
    fn from(record: StoreRecord) -> Self {
        Self {
            display_name: record.display_name().to_string(),
            document_count: record.uploaded_documents().len(),
            id: record.id,
            status: record.status,
            owner_name: record.owner_name,
            business_category: record.business_category,
            version: record.version,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TransitionBody {
    pub action: String,
    pub reason: Option<String>,
    pub expected_version: Option<i64>,
}

pub(super) async fn list_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<StoreListQuery>,
) -> Result<Json<ApiResponse<Vec<StoreListItem>>>, ApiError> {
    let status = params
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<StoreStatus>)
        .transpose()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;
    let limit = normalize_limit(params.limit, state.default_page_size);

    let rows = tindago_db::list_stores(&state.pool, status, limit)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        match row.into_record() {
            Ok(record) => items.push(StoreListItem::from(record)),
            Err(e) => tracing::warn!(error = %e, "skipping unreadable store row"),
        }
    }

    Ok(Json(ApiResponse {
        data: items,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_store(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RecordDetail>>, ApiError> {
    let record = load_record(&state, &req_id, &id).await?;
    let processing = state.engine.is_processing(&id);

    Ok(Json(ApiResponse {
        data: RecordDetail::build(record, processing),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn apply_transition(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<ApiResponse<TransitionOutcome>>, ApiError> {
    let action = body
        .action
        .parse::<LifecycleAction>()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let request = TransitionRequest {
        id,
        action,
        reason: body.reason,
        expected_version: body.expected_version,
    };
    let outcome = state
        .engine
        .apply(request)
        .await
        .map_err(|e| map_lifecycle_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: outcome,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn load_record(
    state: &AppState,
    req_id: &RequestId,
    id: &str,
) -> Result<StoreRecord, ApiError> {
    let row = tindago_db::get_store(&state.pool, id)
        .await
        .map_err(|e| match e {
            tindago_db::DbError::NotFound => ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("store '{id}' not found"),
            ),
            other => map_db_error(req_id.0.clone(), &other),
        })?;
    row.into_record()
        .map_err(|e| map_db_error(req_id.0.clone(), &e))
}

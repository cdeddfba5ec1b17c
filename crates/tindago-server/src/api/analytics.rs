use axum::{extract::State, Extension, Json};
use tindago_core::{summarize_sales, SalesSummary};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) async fn sales_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SalesSummary>>, ApiError> {
    let rows = tindago_db::list_transactions(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let transactions = rows
        .into_iter()
        .map(tindago_db::TransactionRow::into_record)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: summarize_sales(&transactions),
        meta: ResponseMeta::new(req_id.0),
    }))
}

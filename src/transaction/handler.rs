use crate::{auth::Claims, error::AppError, metrics::METRICS, AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use super::model::{CreateTransactionRequest, Transaction, UpdateTransactionRequest};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionIdResponse {
    pub transaction_id: Uuid,
}

/// 非法 id 与不存在的 id 同样处理
fn parse_id(raw: &str, message: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::UnprocessableEntity(message.to_string()))
}

/// GET /transactions
pub async fn list_transactions(State(state): State<AppState>) -> Json<Vec<Transaction>> {
    METRICS.transaction("list");
    Json(state.transactions.list())
}

/// POST /transactions
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Result<Json<Transaction>, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let tx = state.transactions.create(req);
    METRICS.transaction("create");
    tracing::info!(
        transaction_id = %tx.id,
        user_id = %tx.user_id,
        created_by = %claims.sub,
        "交易已创建"
    );

    Ok(Json(tx))
}

/// GET /transactions/:id
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Transaction>, AppError> {
    const UNKNOWN: &str = "Unknown transaction";
    let id = parse_id(&id, UNKNOWN)?;

    METRICS.transaction("get");
    state
        .transactions
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::UnprocessableEntity(UNKNOWN.to_string()))
}

/// PUT /transactions/:id
pub async fn update_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTransactionRequest>, JsonRejection>,
) -> Result<Json<TransactionIdResponse>, AppError> {
    const FAILED: &str = "Failed to update transaction";
    let Json(req) = payload?;
    let id = parse_id(&id, FAILED)?;
    req.validate()?;

    let tx = state
        .transactions
        .update(&id, req)
        .ok_or_else(|| AppError::UnprocessableEntity(FAILED.to_string()))?;
    METRICS.transaction("update");
    tracing::info!(transaction_id = %tx.id, "交易已更新");

    Ok(Json(TransactionIdResponse { transaction_id: tx.id }))
}

/// DELETE /transactions/:id
pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransactionIdResponse>, AppError> {
    const FAILED: &str = "Failed to delete transaction";
    let id = parse_id(&id, FAILED)?;

    let tx = state
        .transactions
        .delete(&id)
        .ok_or_else(|| AppError::UnprocessableEntity(FAILED.to_string()))?;
    METRICS.transaction("delete");
    tracing::info!(transaction_id = %tx.id, "交易已删除");

    Ok(Json(TransactionIdResponse { transaction_id: tx.id }))
}

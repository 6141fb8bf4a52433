use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::procedure::{ProcedureKind, RpcContext};
use crate::shared::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct QueryParams {
    /// JSON-encoded procedure input
    pub input: Option<String>,
}

/// HTTP handler for RPC queries
///
/// GET /api/trpc/:procedure?input=<json>
#[instrument(name = "rpc_query", skip(state, headers, params))]
pub async fn rpc_query(
    State(state): State<AppState>,
    Path(procedure): Path<String>,
    Query(params): Query<QueryParams>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let input = match params.input.as_deref() {
        None | Some("") => Value::Null,
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| AppError::BadRequest(format!("Input is not valid JSON: {}", e)))?,
    };

    dispatch(state, headers, &procedure, ProcedureKind::Query, input).await
}

/// HTTP handler for RPC mutations; the request body is the input
///
/// POST /api/trpc/:procedure
#[instrument(name = "rpc_mutation", skip(state, headers, body))]
pub async fn rpc_mutation(
    State(state): State<AppState>,
    Path(procedure): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let input = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Body is not valid JSON: {}", e)))?
    };

    dispatch(state, headers, &procedure, ProcedureKind::Mutation, input).await
}

async fn dispatch(
    state: AppState,
    headers: HeaderMap,
    procedure: &str,
    kind: ProcedureKind,
    input: Value,
) -> Result<Json<Value>, AppError> {
    let router = state.rpc_router.clone();
    let ctx = RpcContext { state, headers };

    let data = router.call(procedure, kind, ctx, input).await?;
    info!(procedure = %procedure, kind = %kind, "Procedure call succeeded");

    Ok(Json(json!({ "result": { "data": data } })))
}

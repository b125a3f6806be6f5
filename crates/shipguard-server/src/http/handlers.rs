// SPDX-License-Identifier: Apache-2.0

use crate::reconcile::ReconcileError;
use crate::{AppState, StoreError};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use shipguard_api::params;
use shipguard_api::{
    ApiError, CartItemDto, CartSnapshotDto, PreviewResponseDto, RecalculateResponseDto,
    SetInsuranceResponseDto,
};
use shipguard_core::CartSnapshot;
use std::collections::HashMap;
use tracing::{info, warn};

pub(crate) fn api_error_response(err: ApiError) -> Response {
    let status = StatusCode::from_u16(err.code.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    // `success` is explicit and distinct from the transport status;
    // callers check the flag, not just the status line.
    (status, Json(json!({"success": false, "error": err}))).into_response()
}

fn reconcile_error_to_api(err: ReconcileError, cart_id: &str) -> ApiError {
    match err {
        ReconcileError::InvalidArgument(msg) => ApiError::invalid_argument("request", &msg),
        ReconcileError::Store(StoreError::NotFound) => ApiError::cart_not_found(cart_id),
        ReconcileError::Store(StoreError::Auth(msg)) => ApiError::upstream_auth(&msg),
        ReconcileError::Store(StoreError::Upstream { status, message }) => {
            ApiError::upstream(status, &message)
        }
        ReconcileError::Store(StoreError::Transport(msg)) => ApiError::upstream(None, &msg),
        ReconcileError::Malformed(msg) => ApiError::malformed_response(&msg),
    }
}

pub(crate) async fn healthz_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub(crate) async fn set_insurance_handler(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Response {
    let req = match params::parse_set_insurance(&body) {
        Ok(req) => req,
        Err(err) => return api_error_response(err),
    };
    info!(
        cart_id = req.cart_id.as_str(),
        desired_state = %req.desired_state,
        subtotal_basis = ?req.subtotal_basis,
        "set insurance request"
    );
    match state
        .reconciler
        .reconcile(&req.cart_id, req.desired_state, req.subtotal_basis)
        .await
    {
        Ok(outcome) => Json(SetInsuranceResponseDto {
            success: true,
            applied_amount: outcome.applied_amount,
            action: outcome.action.as_str().to_string(),
            product_id: state.reconciler.insurance_product_id(),
            cart_id: req.cart_id,
        })
        .into_response(),
        Err(err) => {
            warn!(cart_id = req.cart_id.as_str(), %err, "set insurance failed");
            api_error_response(reconcile_error_to_api(err, &req.cart_id))
        }
    }
}

pub(crate) async fn recalculate_handler(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Response {
    let req = match params::parse_recalculate(&body) {
        Ok(req) => req,
        Err(err) => return api_error_response(err),
    };
    match state
        .reconciler
        .recalculate(&req.cart_id, req.subtotal_basis)
        .await
    {
        Ok(outcome) => Json(RecalculateResponseDto {
            success: true,
            applied_amount: outcome.applied_amount,
        })
        .into_response(),
        Err(err) => {
            warn!(cart_id = req.cart_id.as_str(), %err, "recalculate failed");
            api_error_response(reconcile_error_to_api(err, &req.cart_id))
        }
    }
}

/// Pure preview: prices a subtotal without touching the cart store.
pub(crate) async fn preview_handler(
    State(state): State<AppState>,
    Query(query_params): Query<HashMap<String, String>>,
) -> Response {
    let Some(raw) = query_params.get("subtotal") else {
        return api_error_response(ApiError::invalid_argument("subtotal", "is required"));
    };
    let Ok(subtotal) = raw.trim().parse::<Decimal>() else {
        return api_error_response(ApiError::invalid_argument(
            "subtotal",
            "must be a decimal number",
        ));
    };
    let rule = state.reconciler.rule();
    match rule.insurance_amount(subtotal) {
        Ok(applied_amount) => Json(PreviewResponseDto {
            subtotal,
            applied_amount,
            rate_applied: rule.rate_applied(subtotal),
        })
        .into_response(),
        Err(err) => api_error_response(ApiError::invalid_argument("subtotal", &err.to_string())),
    }
}

pub(crate) async fn cart_snapshot_handler(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> Response {
    match state.reconciler.snapshot(&cart_id).await {
        Ok(snapshot) => Json(snapshot_dto(&cart_id, snapshot)).into_response(),
        Err(err) => {
            warn!(cart_id = cart_id.as_str(), %err, "cart snapshot failed");
            api_error_response(reconcile_error_to_api(err, &cart_id))
        }
    }
}

fn snapshot_dto(cart_id: &str, snapshot: CartSnapshot) -> CartSnapshotDto {
    let to_dto = |items: Vec<shipguard_core::CartItem>| {
        items
            .into_iter()
            .map(|item| CartItemDto {
                item_id: item.item_id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_list_price: item.unit_list_price,
            })
            .collect()
    };
    CartSnapshotDto {
        cart_id: cart_id.to_string(),
        physical_items: to_dto(snapshot.physical_items),
        digital_items: to_dto(snapshot.digital_items),
    }
}

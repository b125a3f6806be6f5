// SPDX-License-Identifier: Apache-2.0

//! Request parsing and validation performed before any upstream call.
//!
//! Mutating requests are parsed from raw JSON rather than through a
//! typed extractor so that an unrecognized `desired_state` or a bad
//! field type surfaces as our own `invalid_argument` error shape, not
//! a framework rejection.

use crate::dto::{DesiredState, RecalculateRequestDto, SetInsuranceRequestDto};
use crate::errors::ApiError;
use rust_decimal::Decimal;
use serde_json::Value;

pub fn parse_set_insurance(body: &Value) -> Result<SetInsuranceRequestDto, ApiError> {
    let obj = body
        .as_object()
        .ok_or_else(|| ApiError::invalid_argument("body", "must be a JSON object"))?;
    let cart_id = string_field(obj, "cart_id")?;
    validate_cart_id(&cart_id)?;
    let raw_state = string_field(obj, "desired_state")?;
    let desired_state = DesiredState::parse(&raw_state)
        .map_err(|reason| ApiError::invalid_argument("desired_state", reason))?;
    let subtotal_basis = decimal_field(obj, "subtotal_basis")?;
    if let Some(basis) = subtotal_basis {
        validate_subtotal("subtotal_basis", basis)?;
    }
    Ok(SetInsuranceRequestDto {
        cart_id,
        desired_state,
        subtotal_basis,
    })
}

pub fn parse_recalculate(body: &Value) -> Result<RecalculateRequestDto, ApiError> {
    let obj = body
        .as_object()
        .ok_or_else(|| ApiError::invalid_argument("body", "must be a JSON object"))?;
    let cart_id = string_field(obj, "cart_id")?;
    validate_cart_id(&cart_id)?;
    let subtotal_basis = decimal_field(obj, "subtotal_basis")?
        .ok_or_else(|| ApiError::invalid_argument("subtotal_basis", "is required"))?;
    validate_subtotal("subtotal_basis", subtotal_basis)?;
    Ok(RecalculateRequestDto {
        cart_id,
        subtotal_basis,
    })
}

pub fn validate_cart_id(cart_id: &str) -> Result<(), ApiError> {
    if cart_id.trim().is_empty() {
        return Err(ApiError::invalid_argument("cart_id", "must be non-empty"));
    }
    Ok(())
}

pub fn validate_subtotal(field: &str, subtotal: Decimal) -> Result<(), ApiError> {
    if subtotal.is_sign_negative() {
        return Err(ApiError::invalid_argument(field, "must be non-negative"));
    }
    Ok(())
}

fn string_field(obj: &serde_json::Map<String, Value>, name: &str) -> Result<String, ApiError> {
    obj.get(name)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ApiError::invalid_argument(name, "is required and must be a string"))
}

/// Accepts JSON numbers and numeric strings, matching what storefront
/// clients actually send for amounts.
fn decimal_field(
    obj: &serde_json::Map<String, Value>,
    name: &str,
) -> Result<Option<Decimal>, ApiError> {
    match obj.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .to_string()
            .parse::<Decimal>()
            .map(Some)
            .map_err(|_| ApiError::invalid_argument(name, "must be a decimal number")),
        Some(Value::String(s)) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(|_| ApiError::invalid_argument(name, "must be a decimal number")),
        Some(_) => Err(ApiError::invalid_argument(name, "must be a decimal number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiErrorCode;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn well_formed_request_parses() {
        let req = parse_set_insurance(&json!({
            "cart_id": "c-1",
            "desired_state": "enabled",
            "subtotal_basis": 150.0
        }))
        .expect("parse");
        assert_eq!(req.cart_id, "c-1");
        assert_eq!(req.desired_state, DesiredState::Enabled);
        assert_eq!(req.subtotal_basis, Some(dec!(150)));
    }

    #[test]
    fn unrecognized_desired_state_is_invalid_argument() {
        let err = parse_set_insurance(&json!({
            "cart_id": "c-1",
            "desired_state": "on",
            "subtotal_basis": 1
        }))
        .expect_err("bad state");
        assert_eq!(err.code, ApiErrorCode::InvalidArgument);
    }

    #[test]
    fn blank_cart_id_is_invalid_argument() {
        let err = parse_set_insurance(&json!({
            "cart_id": "   ",
            "desired_state": "disabled"
        }))
        .expect_err("blank id");
        assert_eq!(err.code, ApiErrorCode::InvalidArgument);
    }

    #[test]
    fn negative_basis_is_invalid_argument() {
        let err = parse_set_insurance(&json!({
            "cart_id": "c-1",
            "desired_state": "enabled",
            "subtotal_basis": -0.01
        }))
        .expect_err("negative basis");
        assert_eq!(err.code, ApiErrorCode::InvalidArgument);
    }

    #[test]
    fn omitted_basis_parses_to_none() {
        let req = parse_set_insurance(&json!({
            "cart_id": "c-1",
            "desired_state": "disabled"
        }))
        .expect("parse");
        assert_eq!(req.subtotal_basis, None);
    }

    #[test]
    fn string_amounts_are_accepted() {
        let req = parse_recalculate(&json!({
            "cart_id": "c-1",
            "subtotal_basis": "250.00"
        }))
        .expect("parse");
        assert_eq!(req.subtotal_basis, dec!(250.00));
    }

    #[test]
    fn recalculate_requires_a_basis() {
        let err = parse_recalculate(&json!({"cart_id": "c-1"})).expect_err("missing basis");
        assert_eq!(err.code, ApiErrorCode::InvalidArgument);
    }
}

// SPDX-License-Identifier: Apache-2.0

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Target state for the insurance line item on a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    Enabled,
    Disabled,
}

impl DesiredState {
    /// Parses the two recognized wire values; anything else is an
    /// argument error the caller must reject before any upstream call.
    pub fn parse(input: &str) -> Result<Self, &'static str> {
        match input {
            "enabled" => Ok(Self::Enabled),
            "disabled" => Ok(Self::Disabled),
            _ => Err("desired_state must be \"enabled\" or \"disabled\""),
        }
    }
}

impl Display for DesiredState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enabled => f.write_str("enabled"),
            Self::Disabled => f.write_str("disabled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetInsuranceRequestDto {
    pub cart_id: String,
    pub desired_state: DesiredState,
    /// Physical-goods subtotal to price against. When absent the
    /// service derives it from the fetched cart.
    #[serde(default)]
    pub subtotal_basis: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetInsuranceResponseDto {
    pub success: bool,
    pub applied_amount: Decimal,
    pub action: String,
    pub product_id: i64,
    pub cart_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecalculateRequestDto {
    pub cart_id: String,
    pub subtotal_basis: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecalculateResponseDto {
    pub success: bool,
    pub applied_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreviewResponseDto {
    pub subtotal: Decimal,
    pub applied_amount: Decimal,
    pub rate_applied: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CartItemDto {
    pub item_id: Option<String>,
    pub product_id: i64,
    pub quantity: u32,
    pub unit_list_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CartSnapshotDto {
    pub cart_id: String,
    pub physical_items: Vec<CartItemDto>,
    pub digital_items: Vec<CartItemDto>,
}

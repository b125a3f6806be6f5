// SPDX-License-Identifier: Apache-2.0

//! Drives the external cart store so a cart's insurance line item
//! converges to the desired state: absent, or present exactly once at
//! the correct price.
//!
//! The store has no multi-item transaction, so a price change is a
//! remove followed by an add. The remove is best-effort (a concurrent
//! request may already have taken the item); the add is the operation
//! the caller asked for and its failure always surfaces. Two
//! concurrent enables on the same cart can still race into duplicate
//! items — there is no per-cart locking primitive upstream — and the
//! duplicate-collapse pass here repairs that on the next call touching
//! the cart.

use crate::{CartStoreBackend, StoreError};
use rust_decimal::Decimal;
use shipguard_api::DesiredState;
use shipguard_core::{normalize_cart, CartSnapshot, PricingRule};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    Add,
    Remove,
    Update,
    None,
}

impl ReconcileAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Update => "update",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub applied_amount: Decimal,
    pub action: ReconcileAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReconcileError {
    /// Bad request fields, rejected before any external call.
    InvalidArgument(String),
    /// Fatal upstream failure: the add step, or a read the caller
    /// explicitly asked for.
    Store(StoreError),
    /// Upstream returned a payload the normalizer cannot interpret.
    Malformed(String),
}

impl Display for ReconcileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Store(err) => write!(f, "cart store failure: {err}"),
            Self::Malformed(msg) => write!(f, "malformed upstream payload: {msg}"),
        }
    }
}

impl std::error::Error for ReconcileError {}

/// Stateless across requests: holds the store handle, the pricing
/// rule, and the configured insurance product id. No hidden globals.
pub struct Reconciler {
    store: Arc<dyn CartStoreBackend>,
    rule: PricingRule,
    insurance_product_id: i64,
}

impl Reconciler {
    #[must_use]
    pub fn new(store: Arc<dyn CartStoreBackend>, rule: PricingRule, insurance_product_id: i64) -> Self {
        Self {
            store,
            rule,
            insurance_product_id,
        }
    }

    #[must_use]
    pub fn insurance_product_id(&self) -> i64 {
        self.insurance_product_id
    }

    #[must_use]
    pub fn rule(&self) -> &PricingRule {
        &self.rule
    }

    /// Converges the cart's insurance item to `desired`. A caller who
    /// omits the subtotal basis gets it derived from the fetched
    /// cart's physical goods. See the module docs for the
    /// partial-failure policy.
    pub async fn reconcile(
        &self,
        cart_id: &str,
        desired: DesiredState,
        subtotal_basis: Option<Decimal>,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        if cart_id.trim().is_empty() {
            return Err(ReconcileError::InvalidArgument(
                "cart_id must be non-empty".to_string(),
            ));
        }
        if subtotal_basis.is_some_and(|basis| basis.is_sign_negative()) {
            return Err(ReconcileError::InvalidArgument(
                "subtotal_basis must be non-negative".to_string(),
            ));
        }

        let current = self.read_cart_state(cart_id).await;
        let applied_amount = match desired {
            DesiredState::Disabled => Decimal::ZERO,
            DesiredState::Enabled => {
                let basis = subtotal_basis.unwrap_or_else(|| {
                    current
                        .as_ref()
                        .map_or(Decimal::ZERO, |state| state.physical_subtotal)
                });
                self.rule
                    .insurance_amount(basis)
                    .map_err(|e| ReconcileError::InvalidArgument(e.to_string()))?
            }
        };

        let removed_any = self
            .remove_existing_insurance(cart_id, current.map(|state| state.insurance_ids))
            .await;

        let action = match desired {
            DesiredState::Disabled => {
                if removed_any {
                    ReconcileAction::Remove
                } else {
                    ReconcileAction::None
                }
            }
            DesiredState::Enabled => {
                self.store
                    .add_line_item(cart_id, self.insurance_product_id, 1, Some(applied_amount))
                    .await
                    .map_err(ReconcileError::Store)?;
                if removed_any {
                    ReconcileAction::Update
                } else {
                    ReconcileAction::Add
                }
            }
        };
        info!(
            cart_id,
            product_id = self.insurance_product_id,
            amount = %applied_amount,
            action = action.as_str(),
            "insurance reconciled"
        );
        Ok(ReconcileOutcome {
            applied_amount,
            action,
        })
    }

    /// Reprices the insurance item to match whatever is currently
    /// present: absent carts are a successful no-op.
    pub async fn recalculate(
        &self,
        cart_id: &str,
        subtotal_basis: Decimal,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        if cart_id.trim().is_empty() {
            return Err(ReconcileError::InvalidArgument(
                "cart_id must be non-empty".to_string(),
            ));
        }
        if subtotal_basis.is_sign_negative() {
            return Err(ReconcileError::InvalidArgument(
                "subtotal_basis must be non-negative".to_string(),
            ));
        }
        match self.read_cart_state(cart_id).await {
            Some(state) if !state.insurance_ids.is_empty() => {
                self.reconcile(cart_id, DesiredState::Enabled, Some(subtotal_basis))
                    .await
            }
            _ => Ok(ReconcileOutcome {
                applied_amount: Decimal::ZERO,
                action: ReconcileAction::None,
            }),
        }
    }

    /// Read-only fetch plus normalization. Unlike the reconcile read
    /// path, failures here surface: the snapshot is what the caller
    /// asked for.
    pub async fn snapshot(&self, cart_id: &str) -> Result<CartSnapshot, ReconcileError> {
        if cart_id.trim().is_empty() {
            return Err(ReconcileError::InvalidArgument(
                "cart_id must be non-empty".to_string(),
            ));
        }
        let raw = self
            .store
            .fetch_cart(cart_id)
            .await
            .map_err(ReconcileError::Store)?;
        normalize_cart(&raw).map_err(|e| ReconcileError::Malformed(e.to_string()))
    }

    /// Best-effort removal of every existing insurance item, starting
    /// from an already-fetched view. Each successful remove triggers a
    /// re-fetch, so however many duplicates prior inconsistent states
    /// left behind, they all collapse before the add. Returns whether
    /// anything was removed.
    async fn remove_existing_insurance(
        &self,
        cart_id: &str,
        initial_ids: Option<Vec<String>>,
    ) -> bool {
        let mut ids = initial_ids;
        let mut removed_any = false;
        while let Some(list) = &ids {
            let Some(item_id) = list.first() else {
                break;
            };
            let remaining = list.len();
            match self.store.remove_line_item(cart_id, item_id).await {
                Ok(()) => removed_any = true,
                Err(err) => {
                    // The item may already be gone, e.g. a concurrent
                    // request took it. Not fatal to this flow.
                    warn!(
                        cart_id,
                        item_id = item_id.as_str(),
                        %err,
                        "best-effort insurance remove failed"
                    );
                    break;
                }
            }
            let next = self
                .read_cart_state(cart_id)
                .await
                .map(|state| state.insurance_ids);
            // An acknowledged remove must shrink the list; if it does
            // not, the store is misbehaving and looping on it would
            // never terminate.
            if next.as_ref().is_some_and(|left| left.len() >= remaining) {
                warn!(
                    cart_id,
                    remaining, "insurance item count did not shrink after remove; stopping"
                );
                break;
            }
            ids = next;
        }
        removed_any
    }

    /// Current insurance item ids and physical subtotal. A fetch or
    /// normalization failure reads as "nothing to remove": a missing
    /// or fresh cart must not block an add.
    async fn read_cart_state(&self, cart_id: &str) -> Option<CartReadState> {
        let raw = match self.store.fetch_cart(cart_id).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(cart_id, %err, "cart fetch failed; treating as no existing insurance");
                return None;
            }
        };
        let cart = match normalize_cart(&raw) {
            Ok(cart) => cart,
            Err(err) => {
                warn!(cart_id, %err, "cart payload unusable; treating as no existing insurance");
                return None;
            }
        };
        Some(CartReadState {
            insurance_ids: cart
                .insurance_items(self.insurance_product_id)
                .into_iter()
                .filter_map(|item| item.item_id.clone())
                .collect(),
            physical_subtotal: cart.physical_subtotal(),
        })
    }
}

struct CartReadState {
    insurance_ids: Vec<String>,
    physical_subtotal: Decimal,
}

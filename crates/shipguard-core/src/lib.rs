#![forbid(unsafe_code)]

pub mod cart;
pub mod money;
pub mod normalize;
pub mod pricing;

pub const CRATE_NAME: &str = "shipguard-core";

pub use cart::{CartItem, CartSnapshot};
pub use money::round_money;
pub use normalize::{normalize_cart, NormalizeError};
pub use pricing::{PricingError, PricingRule};

//! Subscription gating and plan renewal.

mod access;
mod signature;

pub use access::{Plan, SubscriptionState, renewed_expiry};
pub use signature::verify_checkout_signature;

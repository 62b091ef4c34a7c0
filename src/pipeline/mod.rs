//! Pipeline Module - Derivation and the tour controller.
//!
//! - **Derived** - Invalidation-keyed caching of anchor + context
//! - **Mount** - The [`Tour`] controller: lifecycle, sync loop,
//!   subscriptions and resource reconciliation

pub(crate) mod derived;
mod mount;

pub use mount::{Tour, TourLink};

//! Shared types and models for the BioMarket platform
//!
//! This crate contains the marketplace domain shared between the backend, the
//! browser client (via WASM), and other components of the system.

pub mod access;
pub mod marketplace;
pub mod models;
pub mod onboarding;
pub mod purchase;
pub mod types;
pub mod validation;

pub use access::*;
pub use marketplace::*;
pub use models::*;
pub use onboarding::*;
pub use purchase::*;
pub use types::*;
pub use validation::*;

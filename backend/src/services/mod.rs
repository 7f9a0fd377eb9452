//! Business logic services for the BioMarket platform

pub mod auth;
pub mod dashboard;
pub mod listing;
pub mod profile;
pub mod purchase;

pub use auth::AuthService;
pub use dashboard::DashboardService;
pub use listing::ListingService;
pub use profile::ProfileService;
pub use purchase::PurchaseService;

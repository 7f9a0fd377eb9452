//! HTTP request handlers

mod auth;
mod dashboard;
mod health;
mod listing;
mod profile;
mod purchase;
mod session;
mod upload;

pub use auth::*;
pub use dashboard::*;
pub use health::*;
pub use listing::*;
pub use profile::*;
pub use purchase::*;
pub use session::*;
pub use upload::*;

//! casevault gateway - REST backend for criminal case records
//!
//! Cases, evidence (text and image), persons, public crime reports and an
//! audit trail, behind Basic or Bearer authentication with role and
//! clearance checks from `casevault-authz`.

pub mod audit;
pub mod auth;
pub mod cases;
pub mod config;
pub mod error;
pub mod evidence;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod objects;
pub mod persons;
pub mod reports;
pub mod state;
pub mod store;
pub mod users;

pub use error::{ApiError, ApiResult};
pub use handlers::build_router;
pub use state::AppState;

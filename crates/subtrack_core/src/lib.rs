//! Core domain logic for the subscription record service.
//! This crate owns the record model, its storage and the request contract.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{DbError, DbResult, Store};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::subscription::{Subscription, SubscriptionId, UserId};
pub use repo::subscription_repo::{
    RepoError, RepoResult, SqliteSubscriptionRepository, SubscriptionFilter,
    SubscriptionRepository,
};
pub use service::subscription_service::{
    parse_month, ListParams, PriceSummary, ServiceError, ServiceResult, SubscriptionService,
    SummaryParams,
};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

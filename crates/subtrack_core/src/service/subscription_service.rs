//! Subscription use-case service.
//!
//! # Responsibility
//! - Decode request payloads and query parameters into domain values.
//! - Apply id generation, full-replace update and filter semantics.
//! - Map repository failures onto the service error taxonomy.
//!
//! # Invariants
//! - Create rejects undecodable bodies before touching the store.
//! - Update checks existence before reading the body.
//! - Malformed ids behave exactly like absent ids.
//! - Malformed summary month filters are dropped, not rejected.

use crate::db::DbError;
use crate::model::subscription::{Subscription, SubscriptionId};
use crate::repo::subscription_repo::{RepoError, SubscriptionFilter, SubscriptionRepository};
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NOT_FOUND_MESSAGE: &str = "subscription not found";
const STORED_SUBSEC_DIGITS: u16 = 6;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error taxonomy surfaced to request handlers.
#[derive(Debug)]
pub enum ServiceError {
    /// Request body could not be decoded into a subscription.
    Validation(String),
    /// No row matches the requested id.
    NotFound,
    /// Any persistence failure.
    Storage(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "invalid input format: {message}"),
            Self::NotFound => f.write_str(NOT_FOUND_MESSAGE),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Validation(_) | Self::NotFound => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(_) => Self::NotFound,
            other => Self::Storage(other),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        Self::Storage(RepoError::Db(value))
    }
}

/// Query parameters accepted by the list operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

/// Query parameters accepted by the summary operation.
///
/// `start_date` and `end_date` use the `YYYY-MM` month format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SummaryParams {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Aggregated price of the matching subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub total: i64,
}

/// Use-case service for subscription records.
pub struct SubscriptionService<R: SubscriptionRepository> {
    repo: R,
}

impl<R: SubscriptionRepository> SubscriptionService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Decodes `body` and inserts it, generating an id when none is given.
    pub fn create(&self, body: &[u8]) -> ServiceResult<Subscription> {
        let mut subscription = decode_body(body, "create")?;
        let generated = subscription.ensure_id();

        self.repo
            .create_subscription(&subscription)
            .map_err(|err| storage_failure("create", err))?;

        info!(
            "event=subscription_create module=service status=ok id={} generated_id={generated}",
            subscription.id
        );
        Ok(subscription)
    }

    /// Loads one record by its textual id.
    pub fn get(&self, id: &str) -> ServiceResult<Subscription> {
        let id = parse_id(id, "get")?;
        self.load(id, "get")
    }

    /// Replaces every mutable field of an existing record with the body's values.
    ///
    /// Fields missing from the body are written as zero values.
    pub fn update(&self, id: &str, body: &[u8]) -> ServiceResult<Subscription> {
        let id = parse_id(id, "update")?;
        let mut subscription = self.load(id, "update")?;
        let incoming = decode_body(body, "update")?;
        subscription.replace_fields(incoming);

        // Zero affected rows means the record vanished after the read.
        match self.repo.update_subscription(&subscription) {
            Ok(()) => {}
            Err(RepoError::NotFound(_)) => return Err(not_found("update", id)),
            Err(err) => return Err(storage_failure("update", err)),
        }

        info!("event=subscription_update module=service status=ok id={id}");
        Ok(subscription)
    }

    /// Deletes a record. Unknown or malformed ids succeed without effect.
    pub fn delete(&self, id: &str) -> ServiceResult<()> {
        let Ok(id) = Uuid::parse_str(id.trim()) else {
            info!("event=subscription_delete module=service status=ok removed=0 reason=malformed_id");
            return Ok(());
        };

        let removed = self
            .repo
            .delete_subscription(id)
            .map_err(|err| storage_failure("delete", err))?;

        info!("event=subscription_delete module=service status=ok id={id} removed={removed}");
        Ok(())
    }

    /// Lists records matching the optional user and service-name filters.
    pub fn list(&self, params: &ListParams) -> ServiceResult<Vec<Subscription>> {
        let filter = SubscriptionFilter {
            user_id: normalize_user_id(params.user_id.as_deref()),
            service_name: non_blank(params.service_name.as_deref()),
            ..SubscriptionFilter::default()
        };

        let subscriptions = self
            .repo
            .list_subscriptions(&filter)
            .map_err(|err| storage_failure("list", err))?;

        info!(
            "event=subscription_list module=service status=ok count={}",
            subscriptions.len()
        );
        Ok(subscriptions)
    }

    /// Sums `price` over records matching every supplied filter.
    pub fn summary(&self, params: &SummaryParams) -> ServiceResult<PriceSummary> {
        let filter = SubscriptionFilter {
            user_id: normalize_user_id(params.user_id.as_deref()),
            service_name: non_blank(params.service_name.as_deref()),
            start_from: month_filter(params.start_date.as_deref(), "start_date"),
            end_until: month_filter(params.end_date.as_deref(), "end_date"),
        };

        let total = self
            .repo
            .sum_prices(&filter)
            .map_err(|err| storage_failure("summary", err))?;

        info!("event=subscription_summary module=service status=ok total={total}");
        Ok(PriceSummary { total })
    }

    fn load(&self, id: SubscriptionId, operation: &str) -> ServiceResult<Subscription> {
        self.repo
            .get_subscription(id)
            .map_err(|err| storage_failure(operation, err))?
            .ok_or_else(|| not_found(operation, id))
    }
}

/// Parses a `YYYY-MM` month into the first instant of that month (UTC).
pub fn parse_month(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let (year, month) = value.split_once('-')?;
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if year.len() != 4 || month.len() != 2 || !all_digits(year) || !all_digits(month) {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

fn decode_body(body: &[u8], operation: &str) -> ServiceResult<Subscription> {
    let mut subscription: Subscription = serde_json::from_slice(body).map_err(|err| {
        warn!(
            "event=subscription_{operation} module=service status=error error_code=invalid_body error={err}"
        );
        ServiceError::Validation(err.to_string())
    })?;

    // Storage keeps microseconds; return exactly what a later read will see.
    subscription.start_date = subscription.start_date.trunc_subsecs(STORED_SUBSEC_DIGITS);
    subscription.end_date = subscription
        .end_date
        .map(|end_date| end_date.trunc_subsecs(STORED_SUBSEC_DIGITS));
    Ok(subscription)
}

fn parse_id(value: &str, operation: &str) -> ServiceResult<SubscriptionId> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        warn!(
            "event=subscription_{operation} module=service status=error error_code=not_found reason=malformed_id"
        );
        ServiceError::NotFound
    })
}

fn not_found(operation: &str, id: SubscriptionId) -> ServiceError {
    warn!("event=subscription_{operation} module=service status=error error_code=not_found id={id}");
    ServiceError::NotFound
}

fn storage_failure(operation: &str, err: RepoError) -> ServiceError {
    error!(
        "event=subscription_{operation} module=service status=error error_code=storage error={err}"
    );
    ServiceError::Storage(err)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn normalize_user_id(value: Option<&str>) -> Option<String> {
    let value = non_blank(value)?;
    match Uuid::parse_str(&value) {
        Ok(id) => Some(id.to_string()),
        Err(_) => Some(value),
    }
}

fn month_filter(value: Option<&str>, name: &str) -> Option<DateTime<Utc>> {
    let raw = non_blank(value)?;
    let parsed = parse_month(&raw);
    if parsed.is_none() {
        warn!(
            "event=subscription_summary module=service status=ignored filter={name} value={raw} reason=malformed_month"
        );
    }
    parsed
}

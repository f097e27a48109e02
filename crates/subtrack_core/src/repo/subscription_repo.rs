//! Subscription repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert, lookup, update, delete, filtered list and price
//!   aggregation over the `subscriptions` table.
//! - Translate between `Subscription` and its storage encoding.
//!
//! # Invariants
//! - Dates are stored as UTC unix microseconds.
//! - `update_subscription` only touches an existing row; it never inserts.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Connections must come from `db::open_db*`, which registers `casefold`.

use crate::db::DbError;
use crate::model::subscription::{Subscription, SubscriptionId};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const SUBSCRIPTION_SELECT_SQL: &str = "SELECT
    id,
    service_name,
    price,
    user_id,
    start_date,
    end_date
FROM subscriptions";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for subscription persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(SubscriptionId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "subscription not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted subscription data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Row predicate shared by list and summary queries.
///
/// All present conditions are combined with `AND`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    /// Exact match against the stored user id text.
    pub user_id: Option<String>,
    /// Case-insensitive substring match against `service_name`.
    pub service_name: Option<String>,
    /// Inclusive lower bound on `start_date`.
    pub start_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `end_date`. Rows without an end date never match.
    pub end_until: Option<DateTime<Utc>>,
}

/// Repository interface for subscription records.
pub trait SubscriptionRepository {
    fn create_subscription(&self, subscription: &Subscription) -> RepoResult<SubscriptionId>;
    fn get_subscription(&self, id: SubscriptionId) -> RepoResult<Option<Subscription>>;
    /// Replaces every column of an existing row. Missing rows yield `NotFound`.
    fn update_subscription(&self, subscription: &Subscription) -> RepoResult<()>;
    /// Deletes the row if present and returns the number of rows removed.
    fn delete_subscription(&self, id: SubscriptionId) -> RepoResult<usize>;
    fn list_subscriptions(&self, filter: &SubscriptionFilter) -> RepoResult<Vec<Subscription>>;
    /// Returns `SUM(price)` over matching rows, `0` when nothing matches.
    fn sum_prices(&self, filter: &SubscriptionFilter) -> RepoResult<i64>;
}

/// SQLite-backed subscription repository.
pub struct SqliteSubscriptionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSubscriptionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SubscriptionRepository for SqliteSubscriptionRepository<'_> {
    fn create_subscription(&self, subscription: &Subscription) -> RepoResult<SubscriptionId> {
        self.conn.execute(
            "INSERT INTO subscriptions (
                id,
                service_name,
                price,
                user_id,
                start_date,
                end_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                subscription.id.to_string(),
                subscription.service_name.as_str(),
                subscription.price,
                subscription.user_id.to_string(),
                date_to_db(subscription.start_date),
                subscription.end_date.map(date_to_db),
            ],
        )?;

        Ok(subscription.id)
    }

    fn get_subscription(&self, id: SubscriptionId) -> RepoResult<Option<Subscription>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SUBSCRIPTION_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_subscription_row(row)?));
        }

        Ok(None)
    }

    fn update_subscription(&self, subscription: &Subscription) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE subscriptions
             SET
                service_name = ?1,
                price = ?2,
                user_id = ?3,
                start_date = ?4,
                end_date = ?5
             WHERE id = ?6;",
            params![
                subscription.service_name.as_str(),
                subscription.price,
                subscription.user_id.to_string(),
                date_to_db(subscription.start_date),
                subscription.end_date.map(date_to_db),
                subscription.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(subscription.id));
        }

        Ok(())
    }

    fn delete_subscription(&self, id: SubscriptionId) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM subscriptions WHERE id = ?1;", [id.to_string()])?;
        Ok(removed)
    }

    fn list_subscriptions(&self, filter: &SubscriptionFilter) -> RepoResult<Vec<Subscription>> {
        let (predicate, bind_values) = build_predicate(filter);
        let sql = format!("{SUBSCRIPTION_SELECT_SQL} WHERE 1 = 1{predicate};");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut subscriptions = Vec::new();

        while let Some(row) = rows.next()? {
            subscriptions.push(parse_subscription_row(row)?);
        }

        Ok(subscriptions)
    }

    fn sum_prices(&self, filter: &SubscriptionFilter) -> RepoResult<i64> {
        let (predicate, bind_values) = build_predicate(filter);
        let sql =
            format!("SELECT COALESCE(SUM(price), 0) FROM subscriptions WHERE 1 = 1{predicate};");

        let total = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        Ok(total)
    }
}

fn build_predicate(filter: &SubscriptionFilter) -> (String, Vec<Value>) {
    let mut sql = String::new();
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(user_id) = &filter.user_id {
        sql.push_str(" AND user_id = ?");
        bind_values.push(Value::Text(user_id.clone()));
    }

    if let Some(service_name) = &filter.service_name {
        sql.push_str(" AND instr(casefold(service_name), casefold(?)) > 0");
        bind_values.push(Value::Text(service_name.clone()));
    }

    if let Some(start_from) = filter.start_from {
        sql.push_str(" AND start_date >= ?");
        bind_values.push(Value::Integer(date_to_db(start_from)));
    }

    if let Some(end_until) = filter.end_until {
        sql.push_str(" AND end_date IS NOT NULL AND end_date <= ?");
        bind_values.push(Value::Integer(date_to_db(end_until)));
    }

    (sql, bind_values)
}

fn parse_subscription_row(row: &Row<'_>) -> RepoResult<Subscription> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "id")?;

    let user_id_text: String = row.get("user_id")?;
    let user_id = parse_uuid(&user_id_text, "user_id")?;

    let start_date = parse_date(row.get("start_date")?, "start_date")?;
    let end_date = match row.get::<_, Option<i64>>("end_date")? {
        Some(value) => Some(parse_date(value, "end_date")?),
        None => None,
    };

    Ok(Subscription {
        id,
        service_name: row.get("service_name")?,
        price: row.get("price")?,
        user_id,
        start_date,
        end_date,
    })
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{value}` in subscriptions.{column}"
        ))
    })
}

fn parse_date(value: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_micros(value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{value}` in subscriptions.{column}"
        ))
    })
}

fn date_to_db(value: DateTime<Utc>) -> i64 {
    value.timestamp_micros()
}

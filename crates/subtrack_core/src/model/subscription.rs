//! Subscription domain model.
//!
//! # Responsibility
//! - Define the single persisted record and its JSON wire shape.
//! - Provide the identity and full-replace helpers used by the service.
//!
//! # Invariants
//! - `id` is never nil once a record is persisted and never changes.
//! - Deserialization fills omitted fields with zero values; callers that
//!   update must resend the whole record.
//! - `end_date` is not checked against `start_date`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Stable identifier of a subscription record.
pub type SubscriptionId = Uuid;

/// Identifier of the user owning a subscription.
pub type UserId = Uuid;

/// One user's subscription to a paid service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscription {
    /// Nil until assigned on create. `null` on the wire reads as nil.
    #[serde(deserialize_with = "nil_if_null")]
    pub id: SubscriptionId,
    pub service_name: String,
    /// Per-period cost in minor currency units.
    pub price: i64,
    pub user_id: UserId,
    pub start_date: DateTime<Utc>,
    /// `None` means open-ended.
    pub end_date: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Creates a record with a generated id and no end date.
    pub fn new(
        service_name: impl Into<String>,
        price: i64,
        user_id: UserId,
        start_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            service_name: service_name.into(),
            price,
            user_id,
            start_date,
            end_date: None,
        }
    }

    /// Assigns a fresh id when none was supplied.
    ///
    /// Returns whether an id was generated.
    pub fn ensure_id(&mut self) -> bool {
        if self.id.is_nil() {
            self.id = Uuid::new_v4();
            return true;
        }
        false
    }

    /// Overwrites every mutable field from `other`, keeping `self.id`.
    pub fn replace_fields(&mut self, other: Subscription) {
        self.service_name = other.service_name;
        self.price = other.price;
        self.user_id = other.user_id;
        self.start_date = other.start_date;
        self.end_date = other.end_date;
    }
}

fn nil_if_null<'de, D>(deserializer: D) -> Result<SubscriptionId, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<SubscriptionId>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::Subscription;
    use uuid::Uuid;

    #[test]
    fn omitted_fields_decode_to_zero_values() {
        let decoded: Subscription = serde_json::from_str(r#"{"service_name":"Netflix"}"#).unwrap();
        assert!(decoded.id.is_nil());
        assert_eq!(decoded.price, 0);
        assert!(decoded.user_id.is_nil());
        assert_eq!(decoded.start_date, chrono::DateTime::UNIX_EPOCH);
        assert_eq!(decoded.end_date, None);
    }

    #[test]
    fn null_id_is_treated_as_absent() {
        let mut decoded: Subscription =
            serde_json::from_str(r#"{"id":null,"service_name":"Netflix"}"#).unwrap();
        assert!(decoded.id.is_nil());
        assert!(decoded.ensure_id());
        assert!(!decoded.id.is_nil());
        assert!(!decoded.ensure_id());
    }

    #[test]
    fn replace_fields_keeps_identity() {
        let user = Uuid::new_v4();
        let mut stored = Subscription::new("Netflix", 999, user, chrono::DateTime::UNIX_EPOCH);
        let id = stored.id;
        let incoming = Subscription {
            id: Uuid::new_v4(),
            service_name: "Hulu".to_string(),
            ..Subscription::default()
        };

        stored.replace_fields(incoming);
        assert_eq!(stored.id, id);
        assert_eq!(stored.service_name, "Hulu");
        assert_eq!(stored.price, 0);
        assert!(stored.user_id.is_nil());
    }
}

use chrono::{DateTime, TimeZone, Utc};
use subtrack_core::db::open_db_in_memory;
use subtrack_core::{
    RepoError, SqliteSubscriptionRepository, Subscription, SubscriptionFilter,
    SubscriptionRepository,
};
use uuid::Uuid;

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSubscriptionRepository::new(&conn);

    let mut subscription = Subscription::new("Netflix", 999, Uuid::new_v4(), date(2024, 1, 1));
    subscription.end_date = Some(date(2024, 12, 31));
    let id = repo.create_subscription(&subscription).unwrap();

    let loaded = repo.get_subscription(id).unwrap().unwrap();
    assert_eq!(loaded, subscription);
}

#[test]
fn get_missing_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSubscriptionRepository::new(&conn);

    assert!(repo.get_subscription(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn create_duplicate_id_is_a_db_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSubscriptionRepository::new(&conn);

    let subscription = Subscription::new("Spotify", 120, Uuid::new_v4(), date(2024, 1, 1));
    repo.create_subscription(&subscription).unwrap();

    let err = repo.create_subscription(&subscription).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}

#[test]
fn update_existing_subscription() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSubscriptionRepository::new(&conn);

    let mut subscription = Subscription::new("Spotify", 120, Uuid::new_v4(), date(2024, 1, 1));
    repo.create_subscription(&subscription).unwrap();

    subscription.service_name = "Spotify Family".to_string();
    subscription.price = 200;
    subscription.end_date = Some(date(2025, 1, 1));
    repo.update_subscription(&subscription).unwrap();

    let loaded = repo.get_subscription(subscription.id).unwrap().unwrap();
    assert_eq!(loaded, subscription);
}

#[test]
fn update_not_found_returns_not_found_and_inserts_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSubscriptionRepository::new(&conn);

    let subscription = Subscription::new("Ghost", 1, Uuid::new_v4(), date(2024, 1, 1));
    let err = repo.update_subscription(&subscription).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == subscription.id));
    assert!(repo.get_subscription(subscription.id).unwrap().is_none());
}

#[test]
fn delete_reports_removed_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSubscriptionRepository::new(&conn);

    let subscription = Subscription::new("Hulu", 800, Uuid::new_v4(), date(2024, 2, 1));
    repo.create_subscription(&subscription).unwrap();

    assert_eq!(repo.delete_subscription(subscription.id).unwrap(), 1);
    assert_eq!(repo.delete_subscription(subscription.id).unwrap(), 0);
    assert!(repo.get_subscription(subscription.id).unwrap().is_none());
}

#[test]
fn list_filters_are_conjunctive() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSubscriptionRepository::new(&conn);
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let alice_netflix = Subscription::new("Netflix", 999, alice, date(2024, 1, 1));
    let alice_spotify = Subscription::new("Spotify", 120, alice, date(2024, 1, 1));
    let bob_netflix = Subscription::new("Netflix Premium", 1999, bob, date(2024, 1, 1));
    for subscription in [&alice_netflix, &alice_spotify, &bob_netflix] {
        repo.create_subscription(subscription).unwrap();
    }

    let all = repo
        .list_subscriptions(&SubscriptionFilter::default())
        .unwrap();
    assert_eq!(all.len(), 3);

    let by_name = repo
        .list_subscriptions(&SubscriptionFilter {
            service_name: Some("net".to_string()),
            ..SubscriptionFilter::default()
        })
        .unwrap();
    assert_eq!(by_name.len(), 2);

    let by_both = repo
        .list_subscriptions(&SubscriptionFilter {
            user_id: Some(alice.to_string()),
            service_name: Some("NET".to_string()),
            ..SubscriptionFilter::default()
        })
        .unwrap();
    assert_eq!(by_both, vec![alice_netflix]);
}

#[test]
fn service_name_filter_matches_wildcards_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSubscriptionRepository::new(&conn);
    let user = Uuid::new_v4();

    repo.create_subscription(&Subscription::new("100% Music", 100, user, date(2024, 1, 1)))
        .unwrap();
    repo.create_subscription(&Subscription::new("1000 Movies", 100, user, date(2024, 1, 1)))
        .unwrap();

    let matched = repo
        .list_subscriptions(&SubscriptionFilter {
            service_name: Some("0%".to_string()),
            ..SubscriptionFilter::default()
        })
        .unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].service_name, "100% Music");
}

#[test]
fn service_name_filter_folds_non_ascii_case() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSubscriptionRepository::new(&conn);
    let user = Uuid::new_v4();

    repo.create_subscription(&Subscription::new("Яндекс Плюс", 299, user, date(2024, 1, 1)))
        .unwrap();
    repo.create_subscription(&Subscription::new("Ärzte Digital", 500, user, date(2024, 1, 1)))
        .unwrap();
    repo.create_subscription(&Subscription::new("Netflix", 999, user, date(2024, 1, 1)))
        .unwrap();

    for (filter, expected) in [("яндекс", "Яндекс Плюс"), ("ÄRZTE", "Ärzte Digital")] {
        let matched = repo
            .list_subscriptions(&SubscriptionFilter {
                service_name: Some(filter.to_string()),
                ..SubscriptionFilter::default()
            })
            .unwrap();
        assert_eq!(matched.len(), 1, "filter `{filter}`");
        assert_eq!(matched[0].service_name, expected);
    }

    let total = repo
        .sum_prices(&SubscriptionFilter {
            service_name: Some("ПЛЮС".to_string()),
            ..SubscriptionFilter::default()
        })
        .unwrap();
    assert_eq!(total, 299);
}

#[test]
fn sum_prices_applies_date_bounds() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSubscriptionRepository::new(&conn);
    let user = Uuid::new_v4();

    let mut inside = Subscription::new("Inside", 100, user, date(2024, 1, 15));
    inside.end_date = Some(date(2024, 2, 15));
    let mut before = Subscription::new("Before", 250, user, date(2023, 12, 1));
    before.end_date = Some(date(2024, 2, 1));
    let mut after = Subscription::new("After", 650, user, date(2024, 1, 1));
    after.end_date = Some(date(2024, 4, 1));
    let open_ended = Subscription::new("Open", 1000, user, date(2024, 2, 1));
    for subscription in [&inside, &before, &after, &open_ended] {
        repo.create_subscription(subscription).unwrap();
    }

    let unfiltered = repo.sum_prices(&SubscriptionFilter::default()).unwrap();
    assert_eq!(unfiltered, 2000);

    let bounded = repo
        .sum_prices(&SubscriptionFilter {
            start_from: Some(date(2024, 1, 1)),
            end_until: Some(date(2024, 3, 1)),
            ..SubscriptionFilter::default()
        })
        .unwrap();
    assert_eq!(bounded, 100);
}

#[test]
fn sum_prices_without_matches_is_zero() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSubscriptionRepository::new(&conn);

    let total = repo
        .sum_prices(&SubscriptionFilter {
            user_id: Some(Uuid::new_v4().to_string()),
            ..SubscriptionFilter::default()
        })
        .unwrap();
    assert_eq!(total, 0);
}

#[test]
fn invalid_persisted_uuid_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO subscriptions (id, service_name, price, user_id, start_date, end_date)
         VALUES ('broken', 'Netflix', 1, 'also-broken', 0, NULL);",
        [],
    )
    .unwrap();
    let repo = SqliteSubscriptionRepository::new(&conn);

    let err = repo
        .list_subscriptions(&SubscriptionFilter::default())
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("subscriptions.id")));
}

//! End-to-end tracking against the SQLite list store.

mod common;

use std::sync::Arc;

use common::{open_store, post_tracker, reader, Post, User};
use timeline_db::{DbRuntimeSettings, PoolError};
use timeline_track::{ListStore, SqliteListStore, StoreSetupError, TrackOutcome};
use timeline_types::{decode_activity, EntityId, FeedKey};

fn count(store: &Arc<timeline_track::SqliteListStore>, key: &str) -> usize {
    store.len(key).expect("len should succeed")
}

#[test]
fn post_with_followers_and_mention_makes_five_pushes() {
    let (_dir, store) = open_store();
    let tracker = post_tracker(store.clone());

    let author = User::with_followers(
        1,
        "alice",
        vec![User::new(2, "bob"), User::new(3, "carol")],
    );
    let post = Post {
        id: 50,
        body: "great job @dave".to_string(),
        creator: Some(author),
    };

    let outcome = tracker.track("new_post", &post).expect("registered");
    let TrackOutcome::Dispatched(report) = outcome else {
        panic!("expected a dispatch");
    };
    assert_eq!(report.attempted(), 5);
    assert_eq!(report.written().count(), 5);

    for key in [
        "global:activity",
        "user:id:1:activity",
        "user:id:9:mentions",
        "user:id:2:activity",
        "user:id:3:activity",
    ] {
        assert_eq!(count(&store, key), 1, "expected one push to {key}");
    }

    let total: i64 = store
        .pool()
        .get()
        .expect("connection")
        .query_row("SELECT COUNT(*) FROM feed_items", [], |row| row.get(0))
        .expect("count");
    assert_eq!(total, 5);

    let payloads: Vec<String> = store
        .pool()
        .get()
        .expect("connection")
        .prepare("SELECT DISTINCT payload FROM feed_items")
        .expect("prepare")
        .query_map([], |row| row.get(0))
        .expect("query")
        .map(|row| row.expect("row"))
        .collect();
    assert_eq!(payloads.len(), 1, "every feed carries the same payload");

    let activity = decode_activity(&payloads[0]).expect("payload should decode");
    assert_eq!(activity.verb, "new_post");
    assert_eq!(activity.actor.id, EntityId::from(1));
    assert!(activity.actor.extra_fields.is_empty());
    assert_eq!(
        activity.object.as_ref().map(|object| object.id.clone()),
        Some(EntityId::from(50))
    );
    assert!(activity.target.is_none());
}

#[test]
fn missing_creator_writes_nothing() {
    let (_dir, store) = open_store();
    let tracker = post_tracker(store.clone());

    let post = Post {
        id: 51,
        body: "orphan @dave".to_string(),
        creator: None,
    };

    assert_eq!(
        tracker.track("new_post", &post).expect("registered"),
        TrackOutcome::Aborted
    );
    assert_eq!(count(&store, "global:activity"), 0);
    assert_eq!(count(&store, "user:id:9:mentions"), 0);
}

#[test]
fn feeds_read_back_newest_first() {
    let (_dir, store) = open_store();
    let tracker = post_tracker(store.clone());
    let author = User::new(1, "alice");

    for (id, body) in [(1, "first"), (2, "second"), (3, "third")] {
        let post = Post {
            id,
            body: body.to_string(),
            creator: Some(author.clone()),
        };
        tracker.track("new_post", &post).expect("registered");
    }

    let feed = reader(&store)
        .read(&FeedKey::UserActivity(EntityId::from(1)), 0, 2)
        .expect("read should succeed");

    let ids: Vec<EntityId> = feed
        .iter()
        .filter_map(|activity| activity.object.as_ref().map(|object| object.id.clone()))
        .collect();
    assert_eq!(ids, vec![EntityId::from(3), EntityId::from(2)]);
}

#[test]
fn range_past_the_end_is_empty_even_for_huge_offsets() {
    let (_dir, store) = open_store();
    store.push("k", "a").expect("push a");
    store.push("k", "b").expect("push b");

    assert_eq!(
        store.range("k", 0, usize::MAX).expect("range should succeed"),
        vec!["b".to_string(), "a".to_string()]
    );
    assert!(store
        .range("k", 2, 10)
        .expect("range should succeed")
        .is_empty());
    assert!(store
        .range("k", usize::MAX, 10)
        .expect("range should succeed")
        .is_empty());
}

#[test]
fn open_rejects_zero_pool_settings() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("timeline.db");
    let path = path.to_str().expect("utf-8 path");

    for settings in [
        DbRuntimeSettings {
            pool_max_size: 0,
            ..DbRuntimeSettings::default()
        },
        DbRuntimeSettings {
            connection_timeout_ms: 0,
            ..DbRuntimeSettings::default()
        },
    ] {
        let err = SqliteListStore::open(path, settings)
            .err()
            .expect("zero setting should be rejected");
        assert!(
            matches!(err, StoreSetupError::Pool(PoolError::InvalidSettings(_))),
            "unexpected error: {err}"
        );
    }
}

#[test]
fn round_trip_through_store_preserves_activity() {
    let (_dir, store) = open_store();
    let tracker = post_tracker(store.clone());
    let post = Post {
        id: 60,
        body: "plain".to_string(),
        creator: Some(User::new(1, "alice")),
    };

    let before = chrono::Utc::now();
    tracker.track("new_post", &post).expect("registered");
    let after = chrono::Utc::now();

    let feed = reader(&store)
        .read(&FeedKey::Global, 0, 10)
        .expect("read should succeed");
    assert_eq!(feed.len(), 1);

    let activity = &feed[0];
    assert_eq!(activity.verb, "new_post");
    assert_eq!(activity.actor.type_name, "User");
    assert_eq!(activity.actor.display_name, "alice");
    let object = activity.object.as_ref().expect("object");
    assert_eq!(object.type_name, "Post");
    assert_eq!(object.display_name, "Post #60");
    assert_eq!(object.extra_fields["body"], "plain");
    assert!(activity.created_at >= before && activity.created_at <= after);
}

#[test]
fn concurrent_trackers_share_one_store() {
    let (_dir, store) = open_store();
    let tracker = Arc::new(post_tracker(store.clone()));

    let handles: Vec<_> = (0..4)
        .map(|n| {
            let tracker = Arc::clone(&tracker);
            std::thread::spawn(move || {
                let post = Post {
                    id: 100 + n,
                    body: "hi @alice".to_string(),
                    creator: Some(User::new(2, "bob")),
                };
                tracker.track("new_post", &post).expect("registered")
            })
        })
        .collect();

    for handle in handles {
        let outcome = handle.join().expect("thread should finish");
        assert!(matches!(outcome, TrackOutcome::Dispatched(_)));
    }

    assert_eq!(count(&store, "global:activity"), 4);
    assert_eq!(count(&store, "user:id:2:activity"), 4);
    assert_eq!(count(&store, "user:id:1:mentions"), 4);
}

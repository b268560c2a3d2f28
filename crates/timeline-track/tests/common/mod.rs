#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tempfile::TempDir;
use timeline_db::DbRuntimeSettings;
use timeline_track::{
    FanoutWriter, FeedReader, FeedStore, MentionRule, SqliteListStore, Subject, TrackOptions,
    TrackRegistry, Trackable, Tracker,
};
use timeline_types::EntityId;

pub struct User {
    pub id: i64,
    pub username: String,
    pub followers: Vec<Arc<User>>,
}

impl User {
    pub fn new(id: i64, username: &str) -> Arc<Self> {
        Arc::new(Self {
            id,
            username: username.to_string(),
            followers: Vec::new(),
        })
    }

    pub fn with_followers(id: i64, username: &str, followers: Vec<Arc<User>>) -> Arc<Self> {
        Arc::new(Self {
            id,
            username: username.to_string(),
            followers,
        })
    }
}

impl Trackable for User {
    fn id(&self) -> EntityId {
        EntityId::from(self.id)
    }

    fn display_name(&self) -> String {
        self.username.clone()
    }

    fn followers(&self) -> Option<Vec<EntityId>> {
        Some(self.followers.iter().map(|user| user.id()).collect())
    }
}

#[derive(Clone)]
pub struct Post {
    pub id: i64,
    pub body: String,
    pub creator: Option<Arc<User>>,
}

impl Trackable for Post {
    fn id(&self) -> EntityId {
        EntityId::from(self.id)
    }

    fn display_name(&self) -> String {
        format!("Post #{}", self.id)
    }

    fn creator(&self) -> Option<Subject> {
        self.creator.clone().map(|user| user as Subject)
    }

    fn fields_for(&self, _verb: &str) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("body".to_string(), json!(self.body));
        fields
    }
}

pub fn find_user(handle: &str) -> Option<EntityId> {
    match handle {
        "dave" => Some(EntityId::from(9)),
        "alice" => Some(EntityId::from(1)),
        _ => None,
    }
}

/// A migrated on-disk store that lives as long as the returned directory.
pub fn open_store() -> (TempDir, Arc<SqliteListStore>) {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("timeline.db");
    let store = SqliteListStore::open(
        path.to_str().expect("utf-8 path"),
        DbRuntimeSettings::default(),
    )
    .expect("store should open");
    (dir, Arc::new(store))
}

pub fn post_tracker(store: Arc<SqliteListStore>) -> Tracker<Post> {
    let mut registry = TrackRegistry::new();
    registry
        .track(
            "new_post",
            TrackOptions::new().mentionable(MentionRule::field("body", |post: &Post| {
                Some(post.body.clone())
            })),
        )
        .expect("should register new_post");

    Tracker::new(
        registry,
        FanoutWriter::new(FeedStore::new(store), Arc::new(find_user)),
    )
}

pub fn reader(store: &Arc<SqliteListStore>) -> FeedReader {
    FeedReader::new(store.clone())
}

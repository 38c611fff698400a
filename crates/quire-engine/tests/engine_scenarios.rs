//! End-to-end scenarios against the in-memory store.

use async_trait::async_trait;
use quire_engine::{
    Actor, ContentError, Engine, EngineConfig, MemoryStore, Outcome, PostFilter, PostStore,
    StoreError, StoreResult,
};
use quire_events::{
    Event, EventBus, EventBusError, EventBusResult, EventBusStats, EventHandler, Subscription,
};
use quire_model::{
    Article, Flicker, Gallery, NewPost, Post, PostKind, PostMeta, PostPayload, PostUpdate,
    ReactionKind, UserProfile,
};
use quire_rbac::{Authorizer, Permission, Role};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

struct Platform {
    engine: Engine,
    keeper: Actor,
    editor: Actor,
    reader: Actor,
}

/// Registers a keeper (first user) plus an editor and a reader.
async fn platform() -> Platform {
    let engine = Engine::in_memory(&EngineConfig::default()).unwrap();
    let users = engine.users();

    let keeper = users
        .register(UserProfile::new("keeper", "k@example.com"), "h")
        .await
        .unwrap()
        .into_inner();
    let editor = users
        .register(UserProfile::new("editor", "e@example.com"), "h")
        .await
        .unwrap()
        .into_inner();
    let reader = users
        .register(UserProfile::new("reader", "r@example.com"), "h")
        .await
        .unwrap()
        .into_inner();

    let keeper = Actor::from(&keeper);
    users
        .assign_role(&keeper, editor.id, Role::Editor)
        .await
        .unwrap();

    Platform {
        engine,
        keeper,
        editor: Actor::new(editor.id, Role::Editor),
        reader: Actor::from(&reader),
    }
}

fn payloads() -> Vec<NewPost> {
    vec![
        NewPost::new(PostMeta::titled("prose"), Article::new("words").into()),
        NewPost::new(
            PostMeta::titled("shore"),
            Gallery::new(vec!["a.jpg".into(), "b.jpg".into()], vec!["first".into()]).into(),
        ),
        NewPost::new(PostMeta::titled("clip"), Flicker::new("c.mp4", "loop").into()),
    ]
}

#[test]
fn inheritance_is_monotonic() {
    let auth = Authorizer::standard();
    let roles = Role::all();
    for (i, junior) in roles.iter().enumerate() {
        for senior in &roles[i..] {
            for permission in Permission::all() {
                if auth.is_granted(*junior, permission) {
                    assert!(auth.is_granted(*senior, permission));
                }
            }
        }
    }
}

#[tokio::test]
async fn first_user_is_keeper_second_is_reader() {
    let engine = Engine::in_memory(&EngineConfig::default()).unwrap();
    let first = engine
        .users()
        .register(UserProfile::new("a", "a@example.com"), "h")
        .await
        .unwrap();
    let second = engine
        .users()
        .register(UserProfile::new("b", "b@example.com"), "h")
        .await
        .unwrap();

    assert_eq!(first.value().role, Role::Keeper);
    assert_eq!(second.value().role, Role::Reader);
}

#[tokio::test]
async fn creator_always_acts_on_own_post() {
    let p = platform().await;
    let auth = Authorizer::standard();

    for new in payloads() {
        let mut post = p
            .engine
            .posts()
            .create(&p.editor, new)
            .await
            .unwrap()
            .into_inner();
        for role in Role::all() {
            assert!(auth.can_act_on_post(p.editor.user_id, role, &post));
        }
        post.publish();
        for role in Role::all() {
            assert!(auth.can_act_on_post(p.editor.user_id, role, &post));
        }
    }
}

#[tokio::test]
async fn publish_and_retract_are_idempotent_for_every_variant() {
    let p = platform().await;
    let posts = p.engine.posts();

    for new in payloads() {
        let post = posts.create(&p.editor, new).await.unwrap().into_inner();
        posts.read(post.id).await.unwrap();

        let first = posts.publish(&p.keeper, post.id).await.unwrap();
        assert!(matches!(first, Outcome::Accepted(_)));
        assert!(first.value().released);
        assert_eq!(first.value().summons, 0);

        let second = posts.publish(&p.keeper, post.id).await.unwrap();
        assert!(matches!(second, Outcome::NotModified(_)));
        assert_eq!(second.value(), first.value());

        posts.read(post.id).await.unwrap();
        let retracted = posts.retract(&p.keeper, post.id).await.unwrap();
        assert!(matches!(retracted, Outcome::Accepted(_)));
        assert!(!retracted.value().released);
        assert_eq!(retracted.value().summons, 0);

        let again = posts.retract(&p.keeper, post.id).await.unwrap();
        assert_eq!(again.status_code(), 304);
    }
}

#[tokio::test]
async fn transfer_to_current_owner_changes_nothing() {
    let p = platform().await;
    let posts = p.engine.posts();
    let post = posts
        .create(&p.editor, payloads().remove(0))
        .await
        .unwrap()
        .into_inner();
    posts.publish(&p.keeper, post.id).await.unwrap();
    posts.read(post.id).await.unwrap();
    let before = posts.read(post.id).await.unwrap().into_inner();

    // Even an actor without rights gets NotModified
    let outcome = posts
        .transfer(&p.reader, post.id, p.editor.user_id)
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::NotModified(before.clone()));

    let after = posts.read(post.id).await.unwrap().into_inner();
    assert_eq!(after.creator, before.creator);
    assert_eq!(after.released, before.released);
    assert_eq!(after.summons, before.summons + 1);
}

#[tokio::test]
async fn reader_cannot_update_others_posts() {
    let p = platform().await;
    let posts = p.engine.posts();
    let update = PostUpdate {
        subject: Some("defaced".into()),
        ..PostUpdate::default()
    };

    let draft = posts
        .create(&p.editor, payloads().remove(0))
        .await
        .unwrap()
        .into_inner();
    let err = posts
        .update(&p.reader, draft.id, update.clone())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ContentError::Forbidden {
            permission: Some(Permission::DraftOps)
        }
    );

    posts.publish(&p.keeper, draft.id).await.unwrap();
    let err = posts
        .update(&p.reader, draft.id, update)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ContentError::Forbidden {
            permission: Some(Permission::PostOps)
        }
    );
}

#[tokio::test]
async fn editor_updates_anothers_draft() {
    let p = platform().await;
    let posts = p.engine.posts();
    let draft = posts
        .create(&p.keeper, payloads().remove(1))
        .await
        .unwrap()
        .into_inner();

    let updated = posts
        .update(
            &p.editor,
            draft.id,
            PostUpdate {
                tags: Some(vec!["sea".into(), "sea".into(), " sand ".into()]),
                ..PostUpdate::default()
            },
        )
        .await
        .unwrap()
        .into_inner();
    assert_eq!(updated.meta.tags, vec!["sea", "sand"]);
    assert_eq!(updated.creator, p.keeper.user_id);
}

#[tokio::test]
async fn reaction_text_rules() {
    let p = platform().await;
    let post = p
        .engine
        .posts()
        .create(&p.editor, payloads().remove(2))
        .await
        .unwrap()
        .into_inner();
    let reactions = p.engine.reactions();

    for kind in [ReactionKind::Approve, ReactionKind::Sticker] {
        let r = reactions
            .create(&p.reader, post.id, kind, "ignored")
            .await
            .unwrap()
            .into_inner();
        assert_eq!(r.text, "");

        let err = reactions.update(&p.reader, r.id, "now?").await.unwrap_err();
        assert!(matches!(err, ContentError::MethodNotAllowed(_)));
        assert_eq!(reactions.read(r.id).await.unwrap().value().text, "");
    }

    let by_kind = reactions
        .for_post_by_kinds(post.id, &[ReactionKind::Approve, ReactionKind::Sticker])
        .await
        .unwrap();
    assert_eq!(by_kind.len(), 2);
}

#[tokio::test]
async fn deleting_the_sole_keeper_is_blocked() {
    let p = platform().await;
    let users = p.engine.users();

    let err = users.delete(&p.keeper, p.keeper.user_id).await.unwrap_err();
    assert_eq!(err, ContentError::SoleKeeper);
    assert_eq!(err.status_code(), 304);

    users
        .assign_role(&p.keeper, p.editor.user_id, Role::Keeper)
        .await
        .unwrap();
    let outcome = users.delete(&p.keeper, p.keeper.user_id).await.unwrap();
    assert!(outcome.is_modified());
}

#[tokio::test]
async fn mutations_are_announced() {
    let p = platform().await;
    let mut sub = p.engine.bus().subscribe("#").await.unwrap();
    let posts = p.engine.posts();

    let post = posts
        .create(&p.editor, payloads().remove(0))
        .await
        .unwrap()
        .into_inner();
    posts.publish(&p.keeper, post.id).await.unwrap();
    posts.publish(&p.keeper, post.id).await.unwrap();
    posts.delete(&p.keeper, post.id).await.unwrap();

    let topics: Vec<String> = std::iter::from_fn(|| sub.try_recv())
        .map(|e| e.event_type)
        .collect();
    assert_eq!(topics, vec!["post.created", "post.published", "post.deleted"]);
}

/// Bus that refuses every publish.
struct BrokenBus;

#[async_trait]
impl EventBus for BrokenBus {
    async fn publish(&self, _event: Event) -> EventBusResult<()> {
        Err(EventBusError::PublishError("offline".into()))
    }

    async fn subscribe(&self, _topic: &str) -> EventBusResult<Subscription> {
        Err(EventBusError::SubscribeError("offline".into()))
    }

    async fn register_handler(&self, _handler: Arc<dyn EventHandler>) -> EventBusResult<()> {
        Ok(())
    }

    async fn unsubscribe(&self, _subscription_id: &str) -> EventBusResult<()> {
        Ok(())
    }

    async fn stats(&self) -> EventBusStats {
        EventBusStats::default()
    }
}

#[tokio::test]
async fn bus_failure_does_not_fail_mutation() {
    let store = Arc::new(MemoryStore::new());
    let engine = Engine::new(
        &EngineConfig::default(),
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(BrokenBus),
    )
    .unwrap();

    let keeper = engine
        .users()
        .register(UserProfile::new("k", "k@example.com"), "h")
        .await
        .unwrap()
        .into_inner();
    let actor = Actor::from(&keeper);
    let post = engine
        .posts()
        .create(&actor, payloads().remove(0))
        .await
        .unwrap()
        .into_inner();

    let outcome = engine.posts().publish(&actor, post.id).await.unwrap();
    assert!(outcome.is_modified());
    assert!(store.find_post(post.id).await.unwrap().unwrap().released);
}

/// Post store whose backend is down.
struct DownPosts;

#[async_trait]
impl PostStore for DownPosts {
    async fn insert_post(&self, _post: Post) -> StoreResult<Post> {
        Err(StoreError::Unavailable("down".into()))
    }

    async fn find_post(&self, _id: Uuid) -> StoreResult<Option<Post>> {
        Err(StoreError::Unavailable("down".into()))
    }

    async fn update_content(
        &self,
        _id: Uuid,
        _meta: &PostMeta,
        _payload: &PostPayload,
    ) -> StoreResult<u64> {
        Err(StoreError::Unavailable("down".into()))
    }

    async fn set_released(&self, _id: Uuid, _released: bool) -> StoreResult<u64> {
        Err(StoreError::Unavailable("down".into()))
    }

    async fn set_creator(&self, _id: Uuid, _creator: Uuid) -> StoreResult<u64> {
        Err(StoreError::Unavailable("down".into()))
    }

    async fn record_view(&self, _id: Uuid, _filter: &PostFilter) -> StoreResult<Option<Post>> {
        Err(StoreError::Unavailable("down".into()))
    }

    async fn delete_post(&self, _id: Uuid) -> StoreResult<u64> {
        Err(StoreError::Unavailable("down".into()))
    }

    async fn list_posts(&self, _filter: &PostFilter) -> StoreResult<Vec<Post>> {
        Err(StoreError::Unavailable("down".into()))
    }
}

#[tokio::test]
async fn storage_failures_surface_as_internal() {
    let store = Arc::new(MemoryStore::new());
    let engine = Engine::new(
        &EngineConfig::default(),
        store.clone(),
        Arc::new(DownPosts),
        store,
        Arc::new(quire_events::MemoryEventBus::new()),
    )
    .unwrap();
    let keeper = Actor::new(Uuid::now_v7(), Role::Keeper);

    let err = engine.posts().publish(&keeper, Uuid::now_v7()).await.unwrap_err();
    assert!(err.is_server_error());
    assert_eq!(err.status_code(), 500);

    let err = engine.posts().list(PostKind::Article).await.unwrap_err();
    assert_eq!(err.error_code(), "INTERNAL_ERROR");
}

/// Post store that lets another writer commit a transfer and a publish
/// right after the next lookup returns.
struct InterleavedPosts {
    inner: Arc<MemoryStore>,
    heir: Mutex<Option<Uuid>>,
}

impl InterleavedPosts {
    fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            heir: Mutex::new(None),
        }
    }

    fn arm(&self, heir: Uuid) {
        *self.heir.lock().unwrap() = Some(heir);
    }
}

#[async_trait]
impl PostStore for InterleavedPosts {
    async fn insert_post(&self, post: Post) -> StoreResult<Post> {
        self.inner.insert_post(post).await
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let found = self.inner.find_post(id).await?;
        let heir = self.heir.lock().unwrap().take();
        if let Some(heir) = heir {
            self.inner.set_creator(id, heir).await?;
            self.inner.set_released(id, true).await?;
        }
        Ok(found)
    }

    async fn update_content(
        &self,
        id: Uuid,
        meta: &PostMeta,
        payload: &PostPayload,
    ) -> StoreResult<u64> {
        self.inner.update_content(id, meta, payload).await
    }

    async fn set_released(&self, id: Uuid, released: bool) -> StoreResult<u64> {
        self.inner.set_released(id, released).await
    }

    async fn set_creator(&self, id: Uuid, creator: Uuid) -> StoreResult<u64> {
        self.inner.set_creator(id, creator).await
    }

    async fn record_view(&self, id: Uuid, filter: &PostFilter) -> StoreResult<Option<Post>> {
        self.inner.record_view(id, filter).await
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<u64> {
        self.inner.delete_post(id).await
    }

    async fn list_posts(&self, filter: &PostFilter) -> StoreResult<Vec<Post>> {
        self.inner.list_posts(filter).await
    }
}

#[tokio::test]
async fn update_keeps_concurrent_transfer_and_publish() {
    let store = Arc::new(MemoryStore::new());
    let posts = Arc::new(InterleavedPosts::new(store.clone()));
    let engine = Engine::new(
        &EngineConfig::default(),
        store.clone(),
        posts.clone(),
        store.clone(),
        Arc::new(quire_events::MemoryEventBus::new()),
    )
    .unwrap();

    let users = engine.users();
    let keeper = users
        .register(UserProfile::new("keeper", "k@example.com"), "h")
        .await
        .unwrap()
        .into_inner();
    let heir = users
        .register(UserProfile::new("heir", "h@example.com"), "h")
        .await
        .unwrap()
        .into_inner();
    let author = Actor::from(&keeper);
    let draft = engine
        .posts()
        .create(&author, payloads().remove(0))
        .await
        .unwrap()
        .into_inner();

    posts.arm(heir.id);
    let updated = engine
        .posts()
        .update(
            &author,
            draft.id,
            PostUpdate {
                subject: Some("revised".into()),
                ..PostUpdate::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.is_modified());

    let stored = store.find_post(draft.id).await.unwrap().unwrap();
    assert_eq!(stored.meta.subject, "revised");
    assert_eq!(stored.creator, heir.id);
    assert!(stored.released);
}

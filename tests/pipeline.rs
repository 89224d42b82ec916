//! End-to-end flows: services buffer, one flush cycle commits

use async_trait::async_trait;
use futures_util::future::join_all;
use quire::app::{Adapters, App};
use quire::buffer::{BufferKey, BufferMode};
use quire::cache::{CacheStore, MemoryCache};
use quire::config::Config;
use quire::domain::{
    AgeRestriction, Category, ChapterPatch, CommentPatch, Tag, TagPatch, User, UserTag, Work,
    WorkLike, WorkPatch, WorkTag,
};
use quire::notify::{EmailOutbox, EmailSender, LogChat, OutboundEmail};
use quire::pipeline::TickOutcome;
use quire::services::{NewChapter, NewComment, NewTag, NewWork, WriteState};
use quire::storage::{MemoryStore, Stores};
use quire::{QuireError, QuireResult};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<String>>,
    reject: Mutex<Option<String>>,
}

impl RecordingMailer {
    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    fn reject(&self, to: Option<&str>) {
        *self.reject.lock().unwrap() = to.map(str::to_string);
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> QuireResult<()> {
        if self.reject.lock().unwrap().as_deref() == Some(email.to.as_str()) {
            return Err(QuireError::Mail(format!("{} bounced", email.to)));
        }
        self.sent.lock().unwrap().push(email.to.clone());
        Ok(())
    }
}

struct Harness {
    app: App,
    store: Arc<MemoryStore>,
    mailer: Arc<RecordingMailer>,
    config: Config,
}

/// Cache that refuses any write touching the email outbox
struct OutboxDown {
    inner: MemoryCache,
}

impl OutboxDown {
    fn refuse(key: &str) -> QuireResult<()> {
        if key == BufferKey::EmailsToSend.as_str() {
            return Err(QuireError::CacheUnavailable(format!("{} is read-only", key)));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for OutboxDown {
    async fn get_string(&self, key: &str) -> QuireResult<Option<String>> {
        self.inner.get_string(key).await
    }

    async fn set_string(&self, key: &str, value: String, ttl: Duration) -> QuireResult<()> {
        Self::refuse(key)?;
        self.inner.set_string(key, value, ttl).await
    }

    async fn remove(&self, key: &str) -> QuireResult<()> {
        self.inner.remove(key).await
    }

    async fn list_push(&self, key: &str, values: Vec<String>, ttl: Duration) -> QuireResult<usize> {
        Self::refuse(key)?;
        self.inner.list_push(key, values, ttl).await
    }

    async fn list_push_many(
        &self,
        pushes: Vec<(String, Vec<String>)>,
        ttl: Duration,
    ) -> QuireResult<()> {
        for (key, _) in &pushes {
            Self::refuse(key)?;
        }
        self.inner.list_push_many(pushes, ttl).await
    }

    async fn list_range(&self, key: &str) -> QuireResult<Vec<String>> {
        self.inner.list_range(key).await
    }

    async fn list_trim_front(&self, key: &str, count: usize) -> QuireResult<()> {
        self.inner.list_trim_front(key, count).await
    }

    async fn list_replace(&self, key: &str, values: Vec<String>, ttl: Duration) -> QuireResult<()> {
        self.inner.list_replace(key, values, ttl).await
    }

    async fn list_len(&self, key: &str) -> QuireResult<usize> {
        self.inner.list_len(key).await
    }

    fn backend_name(&self) -> &'static str {
        "outbox-down"
    }
}

fn harness_with(config: Config) -> Harness {
    harness_over(config, Arc::new(MemoryCache::new()))
}

fn harness_over(config: Config, cache: Arc<dyn CacheStore>) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let mailer = Arc::new(RecordingMailer::default());
    let adapters = Adapters {
        cache,
        stores: Stores::shared(store.clone()),
        mailer: mailer.clone(),
        chat: Arc::new(LogChat),
    };
    let app = App::build(&config, adapters).unwrap();
    Harness {
        app,
        store,
        mailer,
        config,
    }
}

fn harness() -> Harness {
    harness_with(Config::default())
}

impl Harness {
    fn author(&self) -> User {
        let user = User::new(Uuid::new_v4(), "inkwell", "inkwell@example.com");
        self.store.seed(user.clone()).unwrap();
        user
    }

    fn tag(&self, name: &str) -> Tag {
        let tag = Tag::new(
            Uuid::new_v4(),
            name,
            AgeRestriction::Teens,
            "Tag description",
        )
        .unwrap();
        self.store.seed(tag.clone()).unwrap();
        tag
    }

    fn committed_work(&self, author: &User, title: &str) -> Work {
        let work = Work::new(
            Uuid::new_v4(),
            author.id,
            title,
            "Description",
            Category::Gen,
            "https://covers.example.com/w.png",
        )
        .unwrap();
        self.store.seed(work.clone()).unwrap();
        work
    }

    async fn flush(&self) -> Vec<(BufferKey, QuireResult<TickOutcome>)> {
        self.app.pipeline.run_once().await
    }

    async fn pending(&self, key: BufferKey) -> usize {
        self.app.buffer.pending(key).await.unwrap()
    }
}

fn outcome(
    results: &[(BufferKey, QuireResult<TickOutcome>)],
    key: BufferKey,
) -> &QuireResult<TickOutcome> {
    &results.iter().find(|(k, _)| *k == key).unwrap().1
}

fn new_work(author: &User, tag_ids: Vec<Uuid>) -> NewWork {
    NewWork {
        user_id: author.id,
        title: "Salt and Ash".to_string(),
        description: "A coastal town keeps a secret".to_string(),
        category: Category::FemaleFemale,
        cover_url: "https://covers.example.com/salt.png".to_string(),
        tag_ids,
        first_chapter: Some(NewChapter {
            user_id: author.id,
            title: "Low tide".to_string(),
            description: "Something washes up".to_string(),
            content: "The gulls went quiet first.".to_string(),
        }),
    }
}

#[tokio::test]
async fn empty_buffers_leave_storage_untouched() {
    let h = harness();

    let results = h.flush().await;

    assert!(results
        .iter()
        .all(|(_, r)| matches!(r, Ok(TickOutcome::Idle))));
    assert_eq!(h.store.commits(), 0);
    assert!(h.mailer.sent().is_empty());
}

#[tokio::test]
async fn created_work_is_pending_until_flushed() {
    let h = harness();
    let author = h.author();
    let romance = h.tag("Romance");
    let mystery = h.tag("Mystery");

    let receipt = h
        .app
        .works
        .create(&new_work(&author, vec![romance.id, mystery.id, romance.id]))
        .await
        .unwrap();
    assert_eq!(receipt.state, WriteState::Pending);
    assert_eq!(receipt.key, BufferKey::WorksCreate);

    let work_id = receipt.snapshot.id;
    assert!(matches!(
        h.app.works.get(work_id).await,
        Err(QuireError::NotFound { .. })
    ));
    assert_eq!(h.pending(BufferKey::WorkTagsCreate).await, 2);

    let results = h.flush().await;
    assert!(results.iter().all(|(_, r)| r.is_ok()));

    let work = h.app.works.get(work_id).await.unwrap();
    assert_eq!(work.title, "Salt and Ash");

    let chapters = h.store.all::<quire::domain::Chapter>().unwrap();
    assert_eq!(chapters.len(), 1);
    assert_eq!(chapters[0].work_id, work_id);

    let links = h.store.all::<WorkTag>().unwrap();
    assert_eq!(links.len(), 2);
    assert!(links.iter().all(|l| l.work_id == work_id));

    assert_eq!(h.mailer.sent(), vec![author.email.clone()]);
    for key in BufferKey::ALL {
        assert_eq!(h.pending(key).await, 0, "{} not drained", key);
    }
}

#[tokio::test]
async fn invalid_work_buffers_nothing() {
    let h = harness();
    let author = h.author();
    let mut request = new_work(&author, vec![]);
    request.title = "t".repeat(31);

    let err = h.app.works.create(&request).await.unwrap_err();
    assert!(matches!(err, QuireError::Validation { .. }));

    for key in BufferKey::ALL {
        assert_eq!(h.pending(key).await, 0);
    }
}

#[tokio::test]
async fn updates_apply_in_buffer_order() {
    let h = harness();
    let author = h.author();
    let work = h.committed_work(&author, "Draft");

    for title in ["First pass", "Second pass"] {
        let patch = WorkPatch {
            id: work.id,
            title: Some(title.to_string()),
            ..Default::default()
        };
        let receipt = h.app.works.update(patch, None).await.unwrap();
        assert_eq!(receipt.snapshot.title, "Draft");
    }

    let results = h.flush().await;
    match outcome(&results, BufferKey::WorksUpdate) {
        Ok(TickOutcome::Flushed(applied)) => assert_eq!(applied.consumed, 2),
        other => panic!("unexpected outcome: {:?}", other),
    }

    assert_eq!(h.app.works.get(work.id).await.unwrap().title, "Second pass");
    assert_eq!(h.store.commits(), 1);
}

#[tokio::test]
async fn update_replaces_tag_set_by_diff() {
    let h = harness();
    let author = h.author();
    let work = h.committed_work(&author, "Tagged");
    let (a, b, c) = (h.tag("Angst"), h.tag("Banter"), h.tag("Comfort"));
    h.store.seed(WorkTag::new(work.id, a.id).unwrap()).unwrap();
    h.store.seed(WorkTag::new(work.id, b.id).unwrap()).unwrap();

    let patch = WorkPatch {
        id: work.id,
        category: Some(Category::Multi),
        ..Default::default()
    };
    h.app
        .works
        .update(patch, Some(&[b.id, c.id]))
        .await
        .unwrap();

    assert_eq!(h.pending(BufferKey::WorkTagsDelete).await, 1);
    assert_eq!(h.pending(BufferKey::WorkTagsCreate).await, 1);

    let results = h.flush().await;
    assert!(results.iter().all(|(_, r)| r.is_ok()));

    let mut tags: Vec<Uuid> = h
        .store
        .all::<WorkTag>()
        .unwrap()
        .into_iter()
        .map(|l| l.tag_id)
        .collect();
    tags.sort();
    let mut expected = vec![b.id, c.id];
    expected.sort();
    assert_eq!(tags, expected);
    assert_eq!(h.app.works.get(work.id).await.unwrap().category, Category::Multi);
}

#[tokio::test]
async fn duplicate_likes_in_one_cycle_collapse() {
    let h = harness();
    let author = h.author();
    let reader = h.author();
    let work = h.committed_work(&author, "Beloved");

    h.app.works.like(reader.id, work.id).await.unwrap();
    h.app.works.like(reader.id, work.id).await.unwrap();
    assert_eq!(h.pending(BufferKey::WorkLikesCreate).await, 2);

    let results = h.flush().await;
    match outcome(&results, BufferKey::WorkLikesCreate) {
        Ok(TickOutcome::Flushed(applied)) => {
            assert_eq!(applied.consumed, 2);
            assert_eq!(applied.skipped, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(
        h.store.all::<WorkLike>().unwrap(),
        vec![WorkLike::new(reader.id, work.id).unwrap()]
    );

    let err = h.app.works.like(reader.id, work.id).await.unwrap_err();
    assert_eq!(err.to_string(), "User has already liked this work");

    h.app.works.unlike(reader.id, work.id).await.unwrap();
    h.flush().await;
    assert!(h.store.all::<WorkLike>().unwrap().is_empty());

    let err = h.app.works.unlike(reader.id, work.id).await.unwrap_err();
    assert_eq!(err.to_string(), "User has not liked this work");
}

#[tokio::test]
async fn concurrent_duplicate_likes_collapse() {
    let h = harness();
    let author = h.author();
    let reader = h.author();
    let work = h.committed_work(&author, "Crowded");

    let results = join_all((0..5).map(|_| h.app.works.like(reader.id, work.id))).await;
    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(h.pending(BufferKey::WorkLikesCreate).await, 5);

    let results = h.flush().await;
    match outcome(&results, BufferKey::WorkLikesCreate) {
        Ok(TickOutcome::Flushed(applied)) => {
            assert_eq!(applied.consumed, 5);
            assert_eq!(applied.skipped, 4);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(h.store.all::<WorkLike>().unwrap().len(), 1);
    assert_eq!(h.app.works.likes(work.id).await.unwrap(), 1);
}

#[tokio::test]
async fn like_count_follows_committed_likes() {
    let h = harness();
    let author = h.author();
    let (first, second) = (h.author(), h.author());
    let work = h.committed_work(&author, "Counted");
    let other = h.committed_work(&author, "Elsewhere");

    h.app.works.like(first.id, work.id).await.unwrap();
    h.app.works.like(second.id, work.id).await.unwrap();
    h.app.works.like(first.id, other.id).await.unwrap();
    assert_eq!(h.app.works.likes(work.id).await.unwrap(), 0);

    h.flush().await;
    assert_eq!(h.app.works.likes(work.id).await.unwrap(), 2);
    assert_eq!(h.app.works.likes(other.id).await.unwrap(), 1);

    h.app.works.unlike(second.id, work.id).await.unwrap();
    h.flush().await;
    assert_eq!(h.app.works.likes(work.id).await.unwrap(), 1);

    assert!(matches!(
        h.app.works.likes(Uuid::new_v4()).await,
        Err(QuireError::NotFound { .. })
    ));
}

#[tokio::test]
async fn outbox_failure_buffers_nothing() {
    let h = harness_over(
        Config::default(),
        Arc::new(OutboxDown {
            inner: MemoryCache::new(),
        }),
    );
    let author = h.author();
    let reader = h.author();
    let tag = h.tag("Slow burn");
    let work = h.committed_work(&author, "Unlucky");

    let err = h.app.works.like(reader.id, work.id).await.unwrap_err();
    assert!(matches!(err, QuireError::CacheUnavailable(_)));
    assert_eq!(h.pending(BufferKey::WorkLikesCreate).await, 0);

    let err = h
        .app
        .works
        .create(&new_work(&author, vec![tag.id]))
        .await
        .unwrap_err();
    assert!(matches!(err, QuireError::CacheUnavailable(_)));

    assert!(h.app.tags.follow(reader.id, tag.id).await.is_err());

    for key in BufferKey::ALL {
        assert_eq!(h.pending(key).await, 0, "{} was buffered", key);
    }

    // a user with email off never touches the outbox
    let mut quiet = User::new(Uuid::new_v4(), "quiet", "quiet@example.com");
    quiet.notify_email = false;
    h.store.seed(quiet.clone()).unwrap();
    h.app.works.like(quiet.id, work.id).await.unwrap();
    assert_eq!(h.pending(BufferKey::WorkLikesCreate).await, 1);
}

#[tokio::test]
async fn follow_and_unfollow_round_trip() {
    let h = harness();
    let reader = h.author();
    let tag = h.tag("Fluff");

    h.app.tags.follow(reader.id, tag.id).await.unwrap();
    h.flush().await;
    assert_eq!(
        h.store.all::<UserTag>().unwrap(),
        vec![UserTag::new(reader.id, tag.id).unwrap()]
    );

    let err = h.app.tags.follow(reader.id, tag.id).await.unwrap_err();
    assert_eq!(err.to_string(), "User is already following this tag");

    h.app.tags.unfollow(reader.id, tag.id).await.unwrap();
    h.flush().await;
    assert!(h.store.all::<UserTag>().unwrap().is_empty());

    let err = h.app.tags.unfollow(reader.id, tag.id).await.unwrap_err();
    assert_eq!(err.to_string(), "User is not following this tag");

    // follow + unfollow notifications, both delivered by the outbox
    assert_eq!(h.mailer.sent().len(), 2);
}

#[tokio::test]
async fn failed_flush_retries_the_same_batch() {
    let h = harness();
    let author = h.author();
    let receipt = h
        .app
        .works
        .create(&new_work(&author, vec![]))
        .await
        .unwrap();

    h.store.set_offline(true);
    let results = h.flush().await;
    let err = outcome(&results, BufferKey::WorksCreate).as_ref().unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(h.pending(BufferKey::WorksCreate).await, 1);
    assert_eq!(h.pending(BufferKey::ChaptersCreate).await, 1);

    h.store.set_offline(false);
    h.flush().await;
    assert_eq!(h.pending(BufferKey::WorksCreate).await, 0);
    assert_eq!(h.app.works.get(receipt.snapshot.id).await.unwrap(), receipt.snapshot);
}

#[tokio::test]
async fn invalid_patch_blocks_the_whole_cycle() {
    let h = harness();
    let author = h.author();
    let work = h.committed_work(&author, "Stable");

    let good = WorkPatch {
        id: work.id,
        description: Some("Rewritten".to_string()),
        ..Default::default()
    };
    let bad = WorkPatch {
        id: work.id,
        title: Some("x".repeat(31)),
        ..Default::default()
    };
    h.app.buffer.append(BufferKey::WorksUpdate, &good).await.unwrap();
    h.app.buffer.append(BufferKey::WorksUpdate, &bad).await.unwrap();

    let results = h.flush().await;
    assert!(matches!(
        outcome(&results, BufferKey::WorksUpdate),
        Err(QuireError::Validation { .. })
    ));
    assert_eq!(h.pending(BufferKey::WorksUpdate).await, 2);
    assert_eq!(h.app.works.get(work.id).await.unwrap(), work);
    assert_eq!(h.store.commits(), 0);
}

#[tokio::test]
async fn outbox_evicts_only_delivered_emails() {
    let h = harness();
    let outbox = EmailOutbox::new(h.app.buffer.clone(), &h.config.mail);
    for to in ["a@example.com", "b@example.com", "c@example.com"] {
        outbox.enqueue(to, "Hello", "<p>hi</p>").await.unwrap();
    }

    h.mailer.reject(Some("b@example.com"));
    let results = h.flush().await;
    match outcome(&results, BufferKey::EmailsToSend) {
        Err(QuireError::PartialFlush { consumed, .. }) => assert_eq!(*consumed, 1),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(h.mailer.sent(), vec!["a@example.com"]);
    assert_eq!(h.pending(BufferKey::EmailsToSend).await, 2);

    h.mailer.reject(None);
    h.flush().await;
    assert_eq!(
        h.mailer.sent(),
        vec!["a@example.com", "b@example.com", "c@example.com"]
    );
    assert_eq!(h.pending(BufferKey::EmailsToSend).await, 0);
}

#[tokio::test]
async fn scalar_buffers_flush_the_same_way() {
    let mut config = Config::default();
    config.buffer.mode = BufferMode::Scalar;
    let h = harness_with(config);
    let author = h.author();

    let receipt = h
        .app
        .works
        .create(&new_work(&author, vec![]))
        .await
        .unwrap();
    h.flush().await;

    assert_eq!(h.app.works.get(receipt.snapshot.id).await.unwrap().title, "Salt and Ash");
    assert_eq!(h.pending(BufferKey::WorksCreate).await, 0);
}

#[tokio::test]
async fn chapter_and_comment_edits_follow_their_creates() {
    let h = harness();
    let author = h.author();
    let reader = h.author();
    let work = h.committed_work(&author, "Serial");

    let chapter = h
        .app
        .chapters
        .create(
            work.id,
            &NewChapter {
                user_id: author.id,
                title: "Part two".to_string(),
                description: "The storm".to_string(),
                content: "Rain.".to_string(),
            },
        )
        .await
        .unwrap()
        .snapshot;
    h.flush().await;

    let comment = h
        .app
        .comments
        .create(&NewComment {
            user_id: reader.id,
            chapter_id: chapter.id,
            content: "Loved the ending".to_string(),
        })
        .await
        .unwrap()
        .snapshot;
    h.app
        .chapters
        .update(ChapterPatch {
            id: chapter.id,
            title: None,
            description: None,
            content: Some("Rain, then silence.".to_string()),
        })
        .await
        .unwrap();
    h.flush().await;

    h.app
        .comments
        .update(CommentPatch {
            id: comment.id,
            content: "Loved the ending!!".to_string(),
        })
        .await
        .unwrap();
    h.flush().await;

    let stored = h.app.chapters.get(chapter.id).await.unwrap();
    assert_eq!(stored.content, "Rain, then silence.");
    assert_eq!(stored.title, "Part two");
    assert_eq!(
        h.app.comments.get(comment.id).await.unwrap().content,
        "Loved the ending!!"
    );
}

#[tokio::test]
async fn tag_update_is_checked_before_buffering() {
    let h = harness();
    let tag = h
        .app
        .tags
        .create(&NewTag {
            name: "Hurt/Comfort".to_string(),
            description: "Pain, then tea".to_string(),
            age_restriction: AgeRestriction::Teens,
        })
        .await
        .unwrap()
        .snapshot;

    let patch = TagPatch {
        id: tag.id,
        name: Some("H/C".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        h.app.tags.update(patch.clone()).await,
        Err(QuireError::NotFound { .. })
    ));

    h.flush().await;
    h.app.tags.update(patch).await.unwrap();

    let too_short = TagPatch {
        id: tag.id,
        name: Some("x".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        h.app.tags.update(too_short).await,
        Err(QuireError::Validation { .. })
    ));
    assert_eq!(h.pending(BufferKey::TagsUpdate).await, 1);

    h.flush().await;
    assert_eq!(h.app.tags.get(tag.id).await.unwrap().name, "H/C");
}

//! Story service unit tests.

mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use mockall::predicate::eq;

use common::{AppError, AppResult};
use domain::{Challenge, ReportOutcome, Story, StoryPolicy, User};
use story_service_lib::infra::{Transaction, UnitOfWork};
use story_service_lib::repository::{
    ChallengeRepository, MockChallengeRepository, MockStoryRepository, MockUserRepository,
    StoryRepository, UserRepository,
};
use story_service_lib::service::{NoopStoryEvents, StoryManager, StoryService};
use story_service_lib::storage::MockImageStore;
use support::{image, RecordingEvents};

fn create_test_story(id: i64, report_count: i32) -> Story {
    Story {
        id,
        user_id: 42,
        challenge_id: 1,
        image_url: format!("http://cdn.test/post/{}.png", id),
        report_count,
        created_at: Utc::now(),
    }
}

fn create_test_challenge(id: i64) -> Challenge {
    Challenge {
        id,
        title: "Morning run".to_string(),
        created_at: Utc::now(),
    }
}

#[derive(Default)]
struct TxLog {
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

/// Transaction over mocked repositories
struct MockedTransaction {
    challenges: MockChallengeRepository,
    users: MockUserRepository,
    stories: MockStoryRepository,
    log: Arc<TxLog>,
}

#[async_trait]
impl Transaction for MockedTransaction {
    fn challenges(&self) -> &dyn ChallengeRepository {
        &self.challenges
    }

    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn stories(&self) -> &dyn StoryRepository {
        &self.stories
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.log.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.log.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Test UnitOfWork that hands out a single mocked transaction
struct TestUnitOfWork {
    tx: Mutex<Option<MockedTransaction>>,
    log: Arc<TxLog>,
}

impl TestUnitOfWork {
    fn new(
        challenges: MockChallengeRepository,
        users: MockUserRepository,
        stories: MockStoryRepository,
    ) -> Self {
        let log = Arc::new(TxLog::default());
        Self {
            tx: Mutex::new(Some(MockedTransaction {
                challenges,
                users,
                stories,
                log: log.clone(),
            })),
            log,
        }
    }

    fn stories_only(stories: MockStoryRepository) -> Self {
        Self::new(MockChallengeRepository::new(), MockUserRepository::new(), stories)
    }

    fn unused() -> Self {
        Self {
            tx: Mutex::new(None),
            log: Arc::new(TxLog::default()),
        }
    }

    fn commits(&self) -> usize {
        self.log.commits.load(Ordering::SeqCst)
    }

    fn rollbacks(&self) -> usize {
        self.log.rollbacks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    async fn begin(&self) -> AppResult<Box<dyn Transaction>> {
        match self.tx.lock().unwrap().take() {
            Some(tx) => Ok(Box::new(tx)),
            None => Err(AppError::internal("No transaction scripted")),
        }
    }
}

fn manager(
    uow: Arc<TestUnitOfWork>,
    images: MockImageStore,
    events: Arc<RecordingEvents>,
    policy: StoryPolicy,
) -> StoryManager {
    StoryManager::new(uow, Arc::new(images), events, policy)
}

// =============================================================================
// create_post
// =============================================================================

#[tokio::test]
async fn test_create_post_returns_urls_in_input_order() {
    let mut challenges = MockChallengeRepository::new();
    challenges
        .expect_find_by_id()
        .with(eq(1))
        .times(1)
        .returning(|id| Ok(Some(create_test_challenge(id))));

    let mut stories = MockStoryRepository::new();
    stories
        .expect_create()
        .withf(|s| s.user_id == 42 && s.challenge_id == 1)
        .times(3)
        .returning(|s| {
            Ok(Story {
                id: 1,
                user_id: s.user_id,
                challenge_id: s.challenge_id,
                image_url: s.image_url,
                report_count: 0,
                created_at: Utc::now(),
            })
        });

    let mut images = MockImageStore::new();
    images
        .expect_upload()
        .withf(|_, folder| folder.to_string() == "post")
        .times(3)
        .returning(|image, folder| {
            Ok(format!(
                "http://cdn.test/{}/{}",
                folder,
                image.file_name.unwrap_or_default()
            ))
        });

    let uow = Arc::new(TestUnitOfWork::new(challenges, MockUserRepository::new(), stories));
    let events = Arc::new(RecordingEvents::new());
    let service = manager(uow.clone(), images, events.clone(), StoryPolicy::default());

    let urls = service
        .create_post(1, 42, vec![image("a.png"), image("b.png"), image("c.png")])
        .await
        .unwrap();

    assert_eq!(
        urls,
        vec![
            "http://cdn.test/post/a.png",
            "http://cdn.test/post/b.png",
            "http://cdn.test/post/c.png",
        ]
    );
    assert_eq!(uow.commits(), 1);
    assert_eq!(uow.rollbacks(), 0);
    assert_eq!(events.events().len(), 3);
}

#[tokio::test]
async fn test_create_post_unknown_challenge_uploads_nothing() {
    let mut challenges = MockChallengeRepository::new();
    challenges.expect_find_by_id().returning(|_| Ok(None));

    let mut stories = MockStoryRepository::new();
    stories.expect_create().times(0);

    let mut images = MockImageStore::new();
    images.expect_upload().times(0);

    let uow = Arc::new(TestUnitOfWork::new(challenges, MockUserRepository::new(), stories));
    let events = Arc::new(RecordingEvents::new());
    let service = manager(uow.clone(), images, events.clone(), StoryPolicy::default());

    let result = service.create_post(99, 42, vec![image("a.png")]).await;

    assert!(matches!(result.unwrap_err(), AppError::ChallengeNotFound));
    assert_eq!(uow.commits(), 0);
    assert_eq!(uow.rollbacks(), 1);
    assert!(events.events().is_empty());
}

#[tokio::test]
async fn test_create_post_without_images_is_rejected() {
    let mut images = MockImageStore::new();
    images.expect_upload().times(0);

    let uow = Arc::new(TestUnitOfWork::unused());
    let service = manager(
        uow.clone(),
        images,
        Arc::new(RecordingEvents::new()),
        StoryPolicy::default(),
    );

    let result = service.create_post(1, 42, Vec::new()).await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
    assert_eq!(uow.commits() + uow.rollbacks(), 0);
}

#[tokio::test]
async fn test_create_post_failure_reports_orphaned_uploads() {
    let mut challenges = MockChallengeRepository::new();
    challenges
        .expect_find_by_id()
        .returning(|id| Ok(Some(create_test_challenge(id))));

    let mut stories = MockStoryRepository::new();
    stories
        .expect_create()
        .times(1)
        .returning(|_| Err(AppError::internal("insert failed")));

    let mut images = MockImageStore::new();
    images
        .expect_upload()
        .times(1)
        .returning(|_, _| Ok("http://cdn.test/post/a.png".to_string()));

    let uow = Arc::new(TestUnitOfWork::new(challenges, MockUserRepository::new(), stories));
    let events = Arc::new(RecordingEvents::new());
    let service = manager(uow.clone(), images, events.clone(), StoryPolicy::default());

    let result = service
        .create_post(1, 42, vec![image("a.png"), image("b.png")])
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Internal(_)));
    assert_eq!(uow.rollbacks(), 1);
    assert_eq!(
        events.events().last().map(String::as_str),
        Some("orphaned 1 http://cdn.test/post/a.png")
    );
}

#[tokio::test]
async fn test_create_post_storage_failure_is_propagated() {
    let mut challenges = MockChallengeRepository::new();
    challenges
        .expect_find_by_id()
        .returning(|id| Ok(Some(create_test_challenge(id))));

    let mut stories = MockStoryRepository::new();
    stories.expect_create().times(0);

    let mut images = MockImageStore::new();
    images
        .expect_upload()
        .returning(|_, _| Err(AppError::storage("bucket unavailable")));

    let uow = Arc::new(TestUnitOfWork::new(challenges, MockUserRepository::new(), stories));
    let events = Arc::new(RecordingEvents::new());
    let service = manager(uow.clone(), images, events.clone(), StoryPolicy::default());

    let result = service.create_post(1, 42, vec![image("a.png")]).await;

    assert!(matches!(result.unwrap_err(), AppError::Storage(_)));
    assert_eq!(uow.rollbacks(), 1);
    // Nothing was stored, so nothing is orphaned
    assert!(events.events().is_empty());
}

// =============================================================================
// report_story
// =============================================================================

#[tokio::test]
async fn test_report_below_threshold_increments_count() {
    let mut stories = MockStoryRepository::new();
    stories
        .expect_find_by_id()
        .with(eq(7))
        .returning(|id| Ok(Some(create_test_story(id, 1))));
    stories
        .expect_update_report_count()
        .withf(|s| s.id == 7 && s.report_count == 2)
        .times(1)
        .returning(Ok);
    stories.expect_delete().times(0);

    let uow = Arc::new(TestUnitOfWork::stories_only(stories));
    let events = Arc::new(RecordingEvents::new());
    let service = manager(uow.clone(), MockImageStore::new(), events.clone(), StoryPolicy::default());

    let outcome = service.report_story(7).await.unwrap();

    assert_eq!(outcome, ReportOutcome::Active { report_count: 2 });
    assert_eq!(uow.commits(), 1);
    assert_eq!(events.events(), vec!["reported 7 2".to_string()]);
}

#[tokio::test]
async fn test_report_reaching_threshold_deletes_story() {
    let mut stories = MockStoryRepository::new();
    stories
        .expect_find_by_id()
        .returning(|id| Ok(Some(create_test_story(id, 2))));
    stories
        .expect_update_report_count()
        .withf(|s| s.report_count == 3)
        .times(1)
        .returning(Ok);
    stories
        .expect_delete()
        .with(eq(7))
        .times(1)
        .returning(|_| Ok(()));

    let uow = Arc::new(TestUnitOfWork::stories_only(stories));
    let events = Arc::new(RecordingEvents::new());
    let service = manager(uow.clone(), MockImageStore::new(), events.clone(), StoryPolicy::default());

    let outcome = service.report_story(7).await.unwrap();

    assert!(outcome.is_removed());
    assert_eq!(uow.commits(), 1);
    assert_eq!(events.events(), vec!["removed 7 3".to_string()]);
}

#[tokio::test]
async fn test_report_with_threshold_one_removes_immediately() {
    let mut stories = MockStoryRepository::new();
    stories
        .expect_find_by_id()
        .returning(|id| Ok(Some(create_test_story(id, 0))));
    stories.expect_update_report_count().returning(Ok);
    stories.expect_delete().times(1).returning(|_| Ok(()));

    let uow = Arc::new(TestUnitOfWork::stories_only(stories));
    let policy = StoryPolicy::new(1).unwrap();
    let service = StoryManager::new(
        uow,
        Arc::new(MockImageStore::new()),
        Arc::new(NoopStoryEvents),
        policy,
    );

    assert_eq!(service.report_story(3).await.unwrap(), ReportOutcome::Removed);
}

#[tokio::test]
async fn test_report_unknown_story_rolls_back() {
    let mut stories = MockStoryRepository::new();
    stories.expect_find_by_id().returning(|_| Ok(None));
    stories.expect_update_report_count().times(0);
    stories.expect_delete().times(0);

    let uow = Arc::new(TestUnitOfWork::stories_only(stories));
    let events = Arc::new(RecordingEvents::new());
    let service = manager(uow.clone(), MockImageStore::new(), events.clone(), StoryPolicy::default());

    let result = service.report_story(404).await;

    assert!(matches!(result.unwrap_err(), AppError::StoryNotFound));
    assert_eq!(uow.commits(), 0);
    assert_eq!(uow.rollbacks(), 1);
    assert!(events.events().is_empty());
}

#[tokio::test]
async fn test_report_failed_delete_rolls_back_increment() {
    let mut stories = MockStoryRepository::new();
    stories
        .expect_find_by_id()
        .returning(|id| Ok(Some(create_test_story(id, 2))));
    stories.expect_update_report_count().returning(Ok);
    stories
        .expect_delete()
        .returning(|_| Err(AppError::internal("delete failed")));

    let uow = Arc::new(TestUnitOfWork::stories_only(stories));
    let service = manager(
        uow.clone(),
        MockImageStore::new(),
        Arc::new(RecordingEvents::new()),
        StoryPolicy::default(),
    );

    assert!(service.report_story(7).await.is_err());
    assert_eq!(uow.commits(), 0);
    assert_eq!(uow.rollbacks(), 1);
}

// =============================================================================
// get_story
// =============================================================================

#[tokio::test]
async fn test_get_story_returns_nickname_and_urls() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().with(eq(42)).returning(|id| {
        Ok(Some(User {
            id,
            nickname: "runner".to_string(),
        }))
    });

    let mut stories = MockStoryRepository::new();
    stories
        .expect_find_by_user_and_challenge()
        .with(eq(42), eq(1))
        .returning(|_, _| Ok(vec![create_test_story(2, 0), create_test_story(3, 1)]));

    let uow = Arc::new(TestUnitOfWork::new(MockChallengeRepository::new(), users, stories));
    let service = manager(
        uow.clone(),
        MockImageStore::new(),
        Arc::new(RecordingEvents::new()),
        StoryPolicy::default(),
    );

    let result = service.get_story(42, 1).await.unwrap();

    assert_eq!(result.nickname, "runner");
    assert_eq!(
        result.image_urls,
        vec!["http://cdn.test/post/2.png", "http://cdn.test/post/3.png"]
    );
    assert_eq!(uow.commits(), 1);
}

#[tokio::test]
async fn test_get_story_without_stories_returns_empty_list() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|id| {
        Ok(Some(User {
            id,
            nickname: "walker".to_string(),
        }))
    });

    let mut stories = MockStoryRepository::new();
    stories
        .expect_find_by_user_and_challenge()
        .returning(|_, _| Ok(Vec::new()));

    let uow = Arc::new(TestUnitOfWork::new(MockChallengeRepository::new(), users, stories));
    let service = manager(
        uow,
        MockImageStore::new(),
        Arc::new(RecordingEvents::new()),
        StoryPolicy::default(),
    );

    let result = service.get_story(5, 1).await.unwrap();

    assert_eq!(result.nickname, "walker");
    assert!(result.image_urls.is_empty());
}

#[tokio::test]
async fn test_get_story_unknown_user_is_story_not_found() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|_| Ok(None));

    let mut stories = MockStoryRepository::new();
    stories.expect_find_by_user_and_challenge().times(0);

    let uow = Arc::new(TestUnitOfWork::new(MockChallengeRepository::new(), users, stories));
    let service = manager(
        uow.clone(),
        MockImageStore::new(),
        Arc::new(RecordingEvents::new()),
        StoryPolicy::default(),
    );

    let result = service.get_story(999, 1).await;

    assert!(matches!(result.unwrap_err(), AppError::StoryNotFound));
    assert_eq!(uow.rollbacks(), 1);
}

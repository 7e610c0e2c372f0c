//! Shared test doubles for story service tests.
//!
//! `MemoryUnitOfWork` keeps challenges, users and stories in memory. Each
//! transaction works on a copy of the data that is written back on commit,
//! so rollback really discards writes.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use common::{AppError, AppResult};
use domain::{Challenge, ImageUpload, NewStory, Story, User};
use story_service_lib::infra::{Transaction, UnitOfWork};
use story_service_lib::repository::{ChallengeRepository, StoryRepository, UserRepository};
use story_service_lib::service::StoryEvents;
use story_service_lib::storage::ImageStore;

// =============================================================================
// In-memory persistence
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub challenges: BTreeMap<i64, Challenge>,
    pub users: BTreeMap<i64, User>,
    pub stories: BTreeMap<i64, Story>,
    next_story_id: i64,
}

#[derive(Clone, Default)]
pub struct MemoryUnitOfWork {
    state: Arc<Mutex<MemoryState>>,
    commits: Arc<AtomicUsize>,
    rollbacks: Arc<AtomicUsize>,
}

impl MemoryUnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_challenge(self, id: i64, title: &str) -> Self {
        self.state.lock().unwrap().challenges.insert(
            id,
            Challenge {
                id,
                title: title.to_string(),
                created_at: Utc::now(),
            },
        );
        self
    }

    pub fn with_user(self, id: i64, nickname: &str) -> Self {
        self.state.lock().unwrap().users.insert(
            id,
            User {
                id,
                nickname: nickname.to_string(),
            },
        );
        self
    }

    /// Committed stories, ordered by id.
    pub fn stories(&self) -> Vec<Story> {
        self.state.lock().unwrap().stories.values().cloned().collect()
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn begin(&self) -> AppResult<Box<dyn Transaction>> {
        let snapshot = self.state.lock().unwrap().clone();
        Ok(Box::new(MemoryTransaction {
            working: Mutex::new(snapshot),
            owner: self.clone(),
        }))
    }
}

pub struct MemoryTransaction {
    working: Mutex<MemoryState>,
    owner: MemoryUnitOfWork,
}

#[async_trait]
impl Transaction for MemoryTransaction {
    fn challenges(&self) -> &dyn ChallengeRepository {
        self
    }

    fn users(&self) -> &dyn UserRepository {
        self
    }

    fn stories(&self) -> &dyn StoryRepository {
        self
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTransaction { working, owner } = *self;
        *owner.state.lock().unwrap() = working.into_inner().unwrap();
        owner.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.owner.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ChallengeRepository for MemoryTransaction {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Challenge>> {
        Ok(self.working.lock().unwrap().challenges.get(&id).cloned())
    }
}

#[async_trait]
impl UserRepository for MemoryTransaction {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.working.lock().unwrap().users.get(&id).cloned())
    }
}

#[async_trait]
impl StoryRepository for MemoryTransaction {
    async fn create(&self, story: NewStory) -> AppResult<Story> {
        let mut state = self.working.lock().unwrap();
        state.next_story_id += 1;
        let story = Story {
            id: state.next_story_id,
            user_id: story.user_id,
            challenge_id: story.challenge_id,
            image_url: story.image_url,
            report_count: 0,
            created_at: Utc::now(),
        };
        state.stories.insert(story.id, story.clone());
        Ok(story)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Story>> {
        Ok(self.working.lock().unwrap().stories.get(&id).cloned())
    }

    async fn find_by_user_and_challenge(
        &self,
        user_id: i64,
        challenge_id: i64,
    ) -> AppResult<Vec<Story>> {
        Ok(self
            .working
            .lock()
            .unwrap()
            .stories
            .values()
            .filter(|s| s.user_id == user_id && s.challenge_id == challenge_id)
            .cloned()
            .collect())
    }

    async fn update_report_count(&self, story: Story) -> AppResult<Story> {
        let mut state = self.working.lock().unwrap();
        let stored = state
            .stories
            .get_mut(&story.id)
            .ok_or(AppError::StoryNotFound)?;
        stored.report_count = story.report_count;
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.working
            .lock()
            .unwrap()
            .stories
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::StoryNotFound)
    }
}

// =============================================================================
// Image store and events
// =============================================================================

/// Hands out sequential URLs; optionally fails on the n-th upload (1-based).
#[derive(Default)]
pub struct SequentialImageStore {
    uploads: AtomicUsize,
    fail_on: Option<usize>,
}

impl SequentialImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(upload: usize) -> Self {
        Self {
            uploads: AtomicUsize::new(0),
            fail_on: Some(upload),
        }
    }

    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageStore for SequentialImageStore {
    async fn upload(&self, _image: ImageUpload, folder: &str) -> AppResult<String> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on == Some(n) {
            return Err(AppError::storage("bucket unavailable"));
        }
        Ok(format!("http://cdn.test/{}/{}.png", folder, n))
    }
}

/// Records every event as a short string.
#[derive(Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<String>>,
}

impl RecordingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl StoryEvents for RecordingEvents {
    fn image_uploaded(&self, challenge_id: i64, url: &str) {
        self.push(format!("uploaded {} {}", challenge_id, url));
    }

    fn story_reported(&self, story_id: i64, report_count: i32) {
        self.push(format!("reported {} {}", story_id, report_count));
    }

    fn story_removed(&self, story_id: i64, report_count: i32) {
        self.push(format!("removed {} {}", story_id, report_count));
    }

    fn uploads_orphaned(&self, challenge_id: i64, urls: &[String]) {
        self.push(format!("orphaned {} {}", challenge_id, urls.join(",")));
    }
}

pub fn image(name: &str) -> ImageUpload {
    ImageUpload::new(
        Some(name.to_string()),
        Some("image/png".to_string()),
        vec![0x89, 0x50, 0x4E, 0x47],
    )
}

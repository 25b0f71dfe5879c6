// shared.rs — SharedGoalStore: a cloneable handle for async callers.
//
// A photo attach suspends while the image is resized. Holding `&mut
// GoalStore` across that await would block every other mutation, so the
// shared handle splits the attach into three steps:
//
//   1. lock, check the goal exists, clone the pipeline, unlock
//   2. resize with no lock held
//   3. lock, append to the goal as it exists *now*, persist, unlock
//
// Step 3 is a read-modify-write against the current collection, so edits
// dispatched during step 2 are kept rather than overwritten by a snapshot.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ds_photo::PhotoPipeline;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::GoalError;
use crate::events::StoreObserver;
use crate::goal::{Goal, PhotoEntry};
use crate::store::GoalStore;

/// Cloneable, thread-safe handle to a [`GoalStore`].
#[derive(Clone)]
pub struct SharedGoalStore {
    inner: Arc<Mutex<GoalStore>>,
}

impl SharedGoalStore {
    pub fn new(store: GoalStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    // A panic mid-mutation leaves the collection in whatever state the last
    // completed statement produced, which is still a valid collection.
    fn lock(&self) -> MutexGuard<'_, GoalStore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the current collection, newest first.
    pub fn snapshot(&self) -> Vec<Goal> {
        self.lock().goals().to_vec()
    }

    pub fn get(&self, id: Uuid) -> Option<Goal> {
        self.lock().get(id).cloned()
    }

    pub fn revision(&self) -> u64 {
        self.lock().revision()
    }

    pub fn subscribe(&self, observer: Box<dyn StoreObserver>) {
        self.lock().subscribe(observer);
    }

    pub fn add(&self, title: &str, description: &str) -> Result<Goal, GoalError> {
        self.lock().add(title, description)
    }

    pub fn remove(&self, id: Uuid) -> Result<Option<Goal>, GoalError> {
        self.lock().remove(id)
    }

    pub fn toggle(
        &self,
        id: Uuid,
        today: NaiveDate,
        yesterday: NaiveDate,
    ) -> Result<Goal, GoalError> {
        self.lock().toggle(id, today, yesterday)
    }

    pub fn persist(&self) -> Result<(), GoalError> {
        self.lock().persist()
    }

    /// Resize `image_bytes` without holding the lock, then append the photo
    /// to the goal as it exists when the resize finishes.
    ///
    /// If the goal was removed in the meantime, returns `NotFound` and
    /// nothing is attached.
    pub async fn attach_photo(
        &self,
        id: Uuid,
        image_bytes: Vec<u8>,
    ) -> Result<PhotoEntry, GoalError> {
        let image = self.pipeline_for(id)?.resize(image_bytes).await?;
        self.lock().append_photo(id, image)
    }

    /// Like [`attach_photo`](Self::attach_photo), reading the image from
    /// `path` first. A missing or unreadable file leaves the goal untouched.
    pub async fn attach_photo_file(
        &self,
        id: Uuid,
        path: impl AsRef<Path>,
    ) -> Result<PhotoEntry, GoalError> {
        let image = self.pipeline_for(id)?.resize_file(path).await?;
        self.lock().append_photo(id, image)
    }

    fn pipeline_for(&self, id: Uuid) -> Result<PhotoPipeline, GoalError> {
        let store = self.lock();
        if store.get(id).is_none() {
            return Err(GoalError::NotFound(id));
        }
        Ok(store.photo_pipeline().clone())
    }
}

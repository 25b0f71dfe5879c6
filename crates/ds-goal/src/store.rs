// store.rs — GoalStore: the authoritative goal collection and its persistence.
//
// The whole collection lives in memory, newest goal first, and is written
// to the `goals` storage key as one JSON array after every mutation. There
// is no batching and no transaction spanning mutations.
//
// If a write is rejected (usually because photos pushed the collection past
// the storage quota) the in-memory change is kept and the store is marked
// dirty. The next successful write, triggered by any later mutation or an
// explicit `persist()`, brings durable state back in sync.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use ds_photo::{EncodedImage, PhotoPipeline};
use ds_storage::{KeyValueStore, GOALS_KEY};
use uuid::Uuid;

use crate::error::GoalError;
use crate::events::{EventDispatcher, GoalEvent, StoreObserver};
use crate::goal::{Goal, PhotoEntry};
use crate::ids::{IdGenerator, RandomIds};
use crate::streak;

/// Draws allowed beyond the number of ids already in use.
const EXTRA_ID_ATTEMPTS: usize = 16;

/// Result of reading the persisted collection.
#[derive(Debug)]
pub struct Loaded {
    pub goals: Vec<Goal>,
    /// Set when prior state existed but could not be read. The goals above
    /// are then empty; the unreadable content is discarded.
    pub error: Option<GoalError>,
}

/// Read the goal collection from storage.
///
/// A missing key is a first run and yields an empty collection with no
/// error. An unreadable or undecodable value also yields an empty
/// collection, with the failure reported in [`Loaded::error`].
pub fn load(storage: &dyn KeyValueStore) -> Loaded {
    let raw = match storage.get(GOALS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            return Loaded {
                goals: Vec::new(),
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!("could not read stored goals, starting empty: {}", e);
            return Loaded {
                goals: Vec::new(),
                error: Some(GoalError::Storage(e)),
            };
        }
    };

    match serde_json::from_str::<Vec<Goal>>(&raw) {
        Ok(goals) => Loaded {
            goals: dedupe_ids(goals),
            error: None,
        },
        Err(source) => {
            tracing::warn!("stored goals are unreadable, starting empty: {}", source);
            Loaded {
                goals: Vec::new(),
                error: Some(GoalError::CorruptData { source }),
            }
        }
    }
}

/// Keep the first record for each id; later duplicates are dropped.
fn dedupe_ids(goals: Vec<Goal>) -> Vec<Goal> {
    let mut seen = HashSet::new();
    let before = goals.len();
    let unique: Vec<Goal> = goals.into_iter().filter(|g| seen.insert(g.id)).collect();
    if unique.len() != before {
        tracing::warn!(
            dropped = before - unique.len(),
            "stored goals contained duplicate ids"
        );
    }
    unique
}

/// Sole owner of the goal collection.
///
/// All mutation goes through the methods below; each successful mutator
/// persists the full collection and then notifies observers.
pub struct GoalStore {
    storage: Arc<dyn KeyValueStore>,
    ids: Box<dyn IdGenerator>,
    photos: PhotoPipeline,
    goals: Vec<Goal>,
    dispatcher: EventDispatcher,
    revision: u64,
    dirty: bool,
    load_error: Option<GoalError>,
}

impl GoalStore {
    /// Open the store, loading whatever collection is already persisted.
    ///
    /// Unreadable prior state is not fatal: the store starts empty and the
    /// failure is available from [`take_load_error`](Self::take_load_error).
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let Loaded { goals, error } = load(storage.as_ref());
        tracing::info!(goals = goals.len(), "goal store opened");
        Self {
            storage,
            ids: Box::new(RandomIds),
            photos: PhotoPipeline::default(),
            goals,
            dispatcher: EventDispatcher::new(),
            revision: 0,
            dirty: false,
            load_error: error,
        }
    }

    /// Replace the identifier generator.
    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Replace the photo pipeline (bounding box, JPEG quality).
    pub fn with_photo_pipeline(mut self, photos: PhotoPipeline) -> Self {
        self.photos = photos;
        self
    }

    /// The recoverable error from opening, if prior state was unreadable.
    pub fn take_load_error(&mut self) -> Option<GoalError> {
        self.load_error.take()
    }

    /// Register an observer for store events.
    pub fn subscribe(&mut self, observer: Box<dyn StoreObserver>) {
        self.dispatcher.subscribe(observer);
    }

    /// All goals, newest first.
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn get(&self, id: Uuid) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// How many goals are complete on `today`.
    pub fn completed_today(&self, today: NaiveDate) -> usize {
        self.goals.iter().filter(|g| g.is_completed_on(today)).count()
    }

    /// Increments on every in-memory mutation, for observers that poll.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True while the in-memory collection has changes durable storage lacks.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn photo_pipeline(&self) -> &PhotoPipeline {
        &self.photos
    }

    /// Write the full collection to durable storage.
    ///
    /// On failure the in-memory collection is kept as-is and the store stays
    /// dirty until a later write succeeds.
    pub fn persist(&mut self) -> Result<(), GoalError> {
        let result = serde_json::to_string(&self.goals)
            .map_err(GoalError::from)
            .and_then(|json| self.storage.set(GOALS_KEY, &json).map_err(GoalError::from));

        match result {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                self.dirty = true;
                tracing::warn!("goals changed but were not saved: {}", e);
                self.dispatcher.dispatch(&GoalEvent::persist_failed(&e));
                Err(e)
            }
        }
    }

    /// Create a goal and put it at the front of the collection.
    ///
    /// The title is trimmed; a blank title is rejected before anything
    /// changes.
    pub fn add(&mut self, title: &str, description: &str) -> Result<Goal, GoalError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(GoalError::EmptyTitle);
        }

        let goal = Goal::new(self.fresh_id()?, title, description.trim());
        self.goals.insert(0, goal.clone());
        tracing::info!(goal_id = %goal.id, title = %goal.title, "goal added");

        self.commit(GoalEvent::goal_added(goal.id, &goal.title))?;
        Ok(goal)
    }

    /// Delete a goal and all of its photos.
    ///
    /// Irreversible; callers confirm with the user first. Returns `None`
    /// without writing anything if no goal has that id.
    pub fn remove(&mut self, id: Uuid) -> Result<Option<Goal>, GoalError> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        let removed = self.goals.remove(index);
        tracing::info!(goal_id = %id, title = %removed.title, "goal removed");

        self.commit(GoalEvent::goal_removed(id, &removed.title))?;
        Ok(Some(removed))
    }

    /// Complete the goal for `today`, or uncheck it if already complete.
    pub fn toggle(
        &mut self,
        id: Uuid,
        today: NaiveDate,
        yesterday: NaiveDate,
    ) -> Result<Goal, GoalError> {
        let index = self.position(id).ok_or(GoalError::NotFound(id))?;
        let updated = streak::toggle(&self.goals[index], today, yesterday);
        self.goals[index] = updated.clone();

        let completed = updated.is_completed_on(today);
        tracing::info!(goal_id = %id, completed, streak = updated.streak, "goal toggled");

        self.commit(GoalEvent::goal_toggled(id, today, completed, updated.streak))?;
        Ok(updated)
    }

    /// Resize `image_bytes` and append the result to the goal's photos.
    ///
    /// If the pipeline fails the goal is left untouched.
    pub async fn attach_photo(
        &mut self,
        id: Uuid,
        image_bytes: Vec<u8>,
    ) -> Result<PhotoEntry, GoalError> {
        if self.position(id).is_none() {
            return Err(GoalError::NotFound(id));
        }
        let image = self.photos.resize(image_bytes).await?;
        self.append_photo(id, image)
    }

    /// Append an already-encoded photo to the goal as it exists right now.
    ///
    /// This is the merge step of a photo attach: it runs against the current
    /// collection, so edits made while the image was being resized survive.
    pub fn append_photo(&mut self, id: Uuid, image: EncodedImage) -> Result<PhotoEntry, GoalError> {
        let index = self.position(id).ok_or(GoalError::NotFound(id))?;
        let entry = PhotoEntry::new(self.fresh_id()?, image);
        let bytes = entry.image.len();
        self.goals[index].photos.push(entry.clone());
        tracing::info!(goal_id = %id, photo_id = %entry.id, bytes, "photo attached");

        self.commit(GoalEvent::photo_attached(id, entry.id, bytes))?;
        Ok(entry)
    }

    /// Draw an id that no goal or photo in the collection already uses.
    ///
    /// A generator that restarts (such as `SequentialIds` on a reopened
    /// store) walks past the ids in use. One that never yields an unused
    /// id is reported as `IdsExhausted` instead of looping forever.
    fn fresh_id(&self) -> Result<Uuid, GoalError> {
        let in_use: HashSet<Uuid> = self
            .goals
            .iter()
            .flat_map(|g| std::iter::once(g.id).chain(g.photos.iter().map(|p| p.id)))
            .collect();

        for _ in 0..=in_use.len() + EXTRA_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if !in_use.contains(&id) {
                return Ok(id);
            }
            tracing::debug!(%id, "generated id already in use, drawing again");
        }
        Err(GoalError::IdsExhausted)
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.goals.iter().position(|g| g.id == id)
    }

    /// Bump the revision, persist, then tell observers what happened.
    fn commit(&mut self, event: GoalEvent) -> Result<(), GoalError> {
        self.revision += 1;
        let persisted = self.persist();
        self.dispatcher.dispatch(&event);
        persisted
    }
}

// startup_flow.rs — End-to-end test of several simulated app launches.
//
// Exercises the whole core against a real file-backed store:
//
//   Day 1, launch 1: add two goals, reminder fires, complete one, attach a photo
//   Day 1, launch 2: reload from disk, no second reminder
//   Day 2, launch 1: reminder fires again, streaks continue
//   Day 2, launch 2: everything done, nothing fires, storage is stable
//
// VERIFY:
//   - Goals, streaks and photos survive every restart
//   - At most one reminder per calendar day
//   - Re-persisting a loaded collection leaves the bytes on disk unchanged

use std::fs;
use std::io::Cursor;
use std::sync::Arc;

use chrono::NaiveDate;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tempfile::tempdir;

use ds_goal::calendar::yesterday_of;
use ds_goal::{GoalStore, SharedGoalStore};
use ds_notify::{JsonlSink, NotificationScheduler, Reminder};
use ds_storage::{FileStore, KeyValueStore, GOALS_KEY, LAST_NOTIFIED_KEY};

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn photo_bytes() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2400, 1800, Rgb([220, 180, 40])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// One app launch: open storage, load goals, run the daily reminder check.
fn launch(
    data_dir: &std::path::Path,
    today: NaiveDate,
) -> (Arc<FileStore>, SharedGoalStore, Option<Reminder>) {
    let storage = Arc::new(FileStore::new(data_dir).unwrap());
    let mut store = GoalStore::open(storage.clone());
    assert!(store.take_load_error().is_none());

    let scheduler = NotificationScheduler::new(storage.clone())
        .with_sink(Box::new(JsonlSink::new(data_dir.join("reminders.jsonl"))));
    let reminder = scheduler.run(store.goals(), today);

    (storage, SharedGoalStore::new(store), reminder)
}

#[tokio::test]
async fn several_launches_across_two_days() {
    let dir = tempdir().unwrap();
    let data_dir = dir.path().join("data");

    // =========================================================
    // Day 1, first launch
    // =========================================================
    let d1 = day("2024-01-01");
    let (storage, store, reminder) = launch(&data_dir, d1);
    assert!(reminder.is_none(), "no goals yet, nothing to remind about");

    let read = store.add("Read", "20 pages").unwrap();
    let run = store.add("Run", "5k").unwrap();

    store.toggle(run.id, d1, yesterday_of(d1)).unwrap();
    let photo = store.attach_photo(read.id, photo_bytes()).await.unwrap();
    assert!(photo.image.len() < 200_000);
    drop((storage, store));

    // =========================================================
    // Day 1, second launch: reminder about Read fires once
    // =========================================================
    let (storage, store, reminder) = launch(&data_dir, d1);
    let reminder = reminder.expect("Read is still open today");
    assert_eq!(reminder.goal_title, "Read");
    assert_eq!(
        storage.get(LAST_NOTIFIED_KEY).unwrap().as_deref(),
        Some("2024-01-01")
    );

    let goals = store.snapshot();
    assert_eq!(goals.len(), 2);
    assert_eq!(goals[0].title, "Run");
    assert_eq!(goals[0].streak, 1);
    assert_eq!(goals[1].photos.len(), 1);
    assert_eq!(goals[1].photos[0].id, photo.id);
    drop((storage, store));

    let (_, _, reminder) = launch(&data_dir, d1);
    assert!(reminder.is_none(), "already reminded today");

    // =========================================================
    // Day 2: first incomplete goal in list order is Run again
    // =========================================================
    let d2 = day("2024-01-02");
    let (storage, store, reminder) = launch(&data_dir, d2);
    assert_eq!(reminder.unwrap().goal_title, "Run");

    let run = store.toggle(run.id, d2, yesterday_of(d2)).unwrap();
    assert_eq!(run.streak, 2);
    let read = store.toggle(read.id, d2, yesterday_of(d2)).unwrap();
    assert_eq!(read.streak, 1);
    drop((storage, store));

    // =========================================================
    // Day 2, later launch: everything done, storage stable
    // =========================================================
    let (storage, store, reminder) = launch(&data_dir, d2);
    assert!(reminder.is_none());

    let before = storage.get(GOALS_KEY).unwrap().unwrap();
    store.persist().unwrap();
    assert_eq!(storage.get(GOALS_KEY).unwrap().unwrap(), before);

    let history = fs::read_to_string(data_dir.join("reminders.jsonl")).unwrap();
    assert_eq!(history.lines().count(), 2);
}

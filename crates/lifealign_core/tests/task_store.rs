use chrono::{NaiveDate, NaiveDateTime, Utc};
use lifealign_core::repo::task_store::{DELETED_TASKS_KEY, TASKS_KEY};
use lifealign_core::{
    open_db, open_db_in_memory, AlertType, Category, ClockTime, KeyValueStore,
    MemoryKeyValueStore, NewTask, Recurrence, ReminderFacility, ReminderHandle, RepeatPeriod,
    SqliteKeyValueStore, SqliteReminderOutbox, StoreError, Task, TaskStore,
};
use std::sync::Arc;

fn new_task(title: &str, date: &str, start: &str, end: &str) -> Task {
    let request = NewTask {
        title: title.to_string(),
        category: Category::Car,
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        start_time: ClockTime::parse(start).unwrap(),
        end_time: ClockTime::parse(end).unwrap(),
        alert_type: AlertType::Gradual,
        repeat: Some(Recurrence {
            count: 3,
            period: RepeatPeriod::Months,
        }),
    };
    Task::from_new(&request, Utc::now())
}

#[tokio::test]
async fn tasks_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lifealign.db");

    let mut task = new_task("Tyres", "2024-06-01", "09:00", "10:00");
    task.notif_id = vec![ReminderHandle::new("reminder-1"), ReminderHandle::new("reminder-2")];
    {
        let store = TaskStore::new(Arc::new(SqliteKeyValueStore::new(open_db(&path).unwrap())));
        store.put(&task).await.unwrap();
    }

    let store = TaskStore::new(Arc::new(SqliteKeyValueStore::new(open_db(&path).unwrap())));
    let loaded = store.get(task.id).await.unwrap().unwrap();
    assert_eq!(loaded, task);
    assert_eq!(loaded.recurrence().unwrap().count, 3);
}

#[tokio::test]
async fn put_replaces_by_id_and_remove_returns_the_task() {
    let store = TaskStore::new(Arc::new(SqliteKeyValueStore::new(
        open_db_in_memory().unwrap(),
    )));
    let mut first = new_task("Wash", "2024-06-01", "09:00", "10:00");
    let second = new_task("Park", "2024-06-02", "09:00", "10:00");
    store.put(&first).await.unwrap();
    store.put(&second).await.unwrap();

    first.title = "Wash and wax".to_string();
    store.put(&first).await.unwrap();

    let titles: Vec<String> = store
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|task| task.title)
        .collect();
    assert_eq!(titles, vec!["Wash and wax", "Park"]);

    let removed = store.remove(second.id).await.unwrap().unwrap();
    assert_eq!(removed.id, second.id);
    assert!(store.remove(second.id).await.unwrap().is_none());
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn lookups_by_handle_and_date() {
    let store = TaskStore::new(Arc::new(MemoryKeyValueStore::new()));
    let mut tyres = new_task("Tyres", "2024-06-01", "09:00", "10:00");
    tyres.notif_id = vec![ReminderHandle::new("outbox-a")];
    let wash = new_task("Wash", "2024-06-03", "09:00", "10:00");
    store.save_all(&[tyres.clone(), wash.clone()]).await.unwrap();

    let owner = store
        .find_by_handle(&ReminderHandle::new("outbox-a"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(owner.id, tyres.id);
    assert!(store
        .find_by_handle(&ReminderHandle::new("outbox-b"))
        .await
        .unwrap()
        .is_none());

    let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
    let on_day = store.tasks_on(day).await.unwrap();
    assert_eq!(on_day.len(), 1);
    assert_eq!(on_day[0].id, wash.id);

    let dates: Vec<NaiveDate> = store.dates_with_tasks().await.unwrap().into_iter().collect();
    assert_eq!(dates, vec![tyres.date, wash.date]);
}

#[tokio::test]
async fn deleted_history_requires_deletion_timestamp() {
    let store = TaskStore::new(Arc::new(MemoryKeyValueStore::new()));
    let mut task = new_task("Tyres", "2024-06-01", "09:00", "10:00");

    let err = store.append_deleted(&task).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));

    task.deleted_at = Some(Utc::now());
    store.append_deleted(&task).await.unwrap();
    assert_eq!(store.deleted().await.unwrap(), vec![task]);
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_tasks_are_never_written() {
    let store = TaskStore::new(Arc::new(MemoryKeyValueStore::new()));
    let mut task = new_task("Tyres", "2024-06-01", "09:00", "10:00");
    task.title = "  ".to_string();

    let err = store.put(&task).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_persisted_state_is_reported() {
    let kv = Arc::new(MemoryKeyValueStore::new());
    let store = TaskStore::new(kv.clone());

    kv.write(TASKS_KEY, "not json").await.unwrap();
    assert!(matches!(
        store.list().await.unwrap_err(),
        StoreError::Serialization(_)
    ));

    let task = new_task("Tyres", "2024-06-01", "09:00", "10:00");
    let duplicated = serde_json::to_string(&vec![task.clone(), task]).unwrap();
    kv.write(TASKS_KEY, &duplicated).await.unwrap();
    assert!(matches!(
        store.list().await.unwrap_err(),
        StoreError::InvalidData(_)
    ));

    kv.write(DELETED_TASKS_KEY, "[]").await.unwrap();
    assert!(store.deleted().await.unwrap().is_empty());
}

#[tokio::test]
async fn persisted_json_uses_camel_case_fields_and_tolerates_unknown_alert() {
    let kv = Arc::new(MemoryKeyValueStore::new());
    let store = TaskStore::new(kv.clone());
    let task = new_task("Tyres", "2024-06-01", "09:00", "10:00");
    store.put(&task).await.unwrap();

    let raw = kv.read(TASKS_KEY).await.unwrap().unwrap();
    assert!(raw.contains("\"startTime\":\"09:00\""));
    assert!(raw.contains("\"alertType\":\"gradual\""));
    assert!(raw.contains("\"notifId\":[]"));

    let legacy = raw.replace("\"alertType\":\"gradual\"", "\"alertType\":\"hourly\"");
    kv.write(TASKS_KEY, &legacy).await.unwrap();
    let loaded = store.get(task.id).await.unwrap().unwrap();
    assert_eq!(loaded.alert_type, AlertType::None);
}

#[tokio::test]
async fn outbox_lists_due_reminders_and_voids_idempotently() {
    let outbox = SqliteReminderOutbox::new(open_db_in_memory().unwrap());
    let fire_at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();

    let early = outbox
        .arrange(fire_at("2024-06-01 08:30"), "Tyres is due in 30 minutes!")
        .await
        .unwrap();
    let due = outbox
        .arrange(fire_at("2024-06-01 09:00"), "Tyres is due now!")
        .await
        .unwrap();

    let ready = outbox.due(fire_at("2024-06-01 08:45")).unwrap();
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].0, early);

    outbox.void(&due).await.unwrap();
    outbox.void(&due).await.unwrap();
    assert_eq!(outbox.pending().unwrap().len(), 1);
}

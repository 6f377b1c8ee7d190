mod support;

use tasklist::storage::{Database, JsonFileDatabase, MemoryDatabase};
use tasklist::task::{
    NewTask, TaskDocument, TaskFilter, TaskPatch, TaskRecord, TaskRepository, TitleFilter,
};

use support::{record, TestHome};

type MemoryRepository = TaskRepository<MemoryDatabase<TaskDocument>>;

fn seeded() -> MemoryRepository {
    TaskRepository::new(MemoryDatabase::new(TaskDocument {
        tasks: vec![
            record("a", "打扫房间", false),
            record("b", "洗衣服", true),
            record("c", "买菜", false),
            record("d", "买水", true),
        ],
    }))
}

fn ids(tasks: &[&TaskRecord]) -> Vec<String> {
    tasks.iter().map(|task| task.id.clone()).collect()
}

#[test]
fn insert_one_returns_stored_record() {
    let mut repo = TaskRepository::new(MemoryDatabase::<TaskDocument>::default());
    let task = repo.insert_one(NewTask::new("打扫房间", false)).unwrap();

    assert_eq!(task.title, "打扫房间");
    assert!(!task.is_complete);
    assert!(!task.id.is_empty());
    assert_eq!(repo.get_by_id(&task.id), Some(&task));
    assert_eq!(repo.database().writes(), 1);
}

#[test]
fn insert_many_appends_in_order_with_one_write() {
    let mut repo = seeded();
    let inserted = repo
        .insert_many(vec![
            NewTask::new("洗碗", false),
            NewTask::new("遛狗", true),
        ])
        .unwrap();

    assert_eq!(repo.database().writes(), 1);
    let all = repo.get_many(None);
    assert_eq!(all.len(), 6);
    assert_eq!(all[4], &inserted[0]);
    assert_eq!(all[5], &inserted[1]);
    assert!(all[5].is_complete);
}

#[test]
fn inserted_ids_are_unique() {
    let mut repo = TaskRepository::new(MemoryDatabase::<TaskDocument>::default());
    let inserted = repo
        .insert_many((0..50).map(|n| NewTask::new(format!("task {n}"), false)).collect())
        .unwrap();

    let mut seen: Vec<&str> = inserted.iter().map(|task| task.id.as_str()).collect();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 50);
}

#[test]
fn get_by_id_unknown_is_none() {
    let repo = seeded();
    assert!(repo.get_by_id("missing").is_none());
    assert_eq!(repo.get_by_id("c").map(|task| task.title.as_str()), Some("买菜"));
}

#[test]
fn get_many_keeps_collection_order() {
    let repo = seeded();
    assert_eq!(ids(&repo.get_many(None)), vec!["a", "b", "c", "d"]);

    let filter = TaskFilter::new().with_ids(["d", "a"]);
    assert_eq!(ids(&repo.get_many(Some(&filter))), vec!["a", "d"]);
}

#[test]
fn get_many_by_literal_title() {
    let repo = seeded();
    let filter = TaskFilter::new().with_title(TitleFilter::literal("买"));
    assert_eq!(ids(&repo.get_many(Some(&filter))), vec!["c", "d"]);
}

#[test]
fn get_many_by_title_pattern() {
    let repo = seeded();
    let filter = TaskFilter::new().with_title(TitleFilter::pattern("^(打扫|洗)").unwrap());
    assert_eq!(ids(&repo.get_many(Some(&filter))), vec!["a", "b"]);
}

#[test]
fn get_many_by_completion() {
    let repo = seeded();
    assert_eq!(ids(&repo.get_many(Some(&TaskFilter::completed()))), vec!["b", "d"]);
    assert_eq!(ids(&repo.get_many(Some(&TaskFilter::incomplete()))), vec!["a", "c"]);
}

#[test]
fn get_many_combines_predicates() {
    let repo = seeded();
    let filter = TaskFilter::new()
        .with_title(TitleFilter::literal("买"))
        .with_completion(true);
    assert_eq!(ids(&repo.get_many(Some(&filter))), vec!["d"]);

    let none = TaskFilter::new().with_id("a").with_completion(true);
    assert!(repo.get_many(Some(&none)).is_empty());
}

#[test]
fn update_by_id_touches_only_that_task() {
    let mut repo = seeded();
    repo.update_by_id("a", &TaskPatch::title("打扫卧室")).unwrap();

    assert_eq!(repo.get_by_id("a"), Some(&record("a", "打扫卧室", false)));
    assert_eq!(repo.get_by_id("c"), Some(&record("c", "买菜", false)));
    assert_eq!(repo.database().writes(), 1);
}

#[test]
fn update_by_unknown_id_changes_nothing() {
    let mut repo = seeded();
    let before: Vec<TaskRecord> = repo.get_many(None).into_iter().cloned().collect();

    repo.update_by_id("missing", &TaskPatch::completion(true)).unwrap();

    let after: Vec<TaskRecord> = repo.get_many(None).into_iter().cloned().collect();
    assert_eq!(before, after);
}

#[test]
fn update_many_applies_patch_to_matches() {
    let mut repo = seeded();
    repo.update_many(
        &TaskFilter::new().with_title(TitleFilter::literal("买")),
        &TaskPatch::completion(true),
    )
    .unwrap();

    assert_eq!(ids(&repo.get_many(Some(&TaskFilter::completed()))), vec!["b", "c", "d"]);
    assert_eq!(repo.database().writes(), 1);
}

#[test]
fn update_many_patches_both_fields_of_matches_only() {
    let mut repo = seeded();
    repo.update_many(
        &TaskFilter::incomplete(),
        &TaskPatch {
            title: Some("买东西".to_string()),
            is_complete: Some(true),
        },
    )
    .unwrap();

    let all: Vec<TaskRecord> = repo.get_many(None).into_iter().cloned().collect();
    assert_eq!(
        all,
        vec![
            record("a", "买东西", true),
            record("b", "洗衣服", true),
            record("c", "买东西", true),
            record("d", "买水", true),
        ]
    );
}

#[test]
fn empty_patch_does_not_write() {
    let mut repo = seeded();
    repo.update_many(&TaskFilter::new(), &TaskPatch::default()).unwrap();
    repo.update_by_id("a", &TaskPatch::default()).unwrap();
    assert_eq!(repo.database().writes(), 0);
}

#[test]
fn remove_by_id_keeps_others_in_order() {
    let mut repo = seeded();
    repo.remove_by_id("b").unwrap();
    assert_eq!(ids(&repo.get_many(None)), vec!["a", "c", "d"]);
}

#[test]
fn remove_by_unknown_id_changes_nothing() {
    let mut repo = seeded();
    let before: Vec<TaskRecord> = repo.get_many(None).into_iter().cloned().collect();

    repo.remove_by_id("missing").unwrap();

    let after: Vec<TaskRecord> = repo.get_many(None).into_iter().cloned().collect();
    assert_eq!(before, after);
}

#[test]
fn remove_by_id_twice_equals_once() {
    let mut once = seeded();
    once.remove_by_id("c").unwrap();

    let mut twice = seeded();
    twice.remove_by_id("c").unwrap();
    twice.remove_by_id("c").unwrap();

    let once: Vec<TaskRecord> = once.get_many(None).into_iter().cloned().collect();
    let twice: Vec<TaskRecord> = twice.get_many(None).into_iter().cloned().collect();
    assert_eq!(once, twice);
    assert_eq!(
        twice,
        vec![
            record("a", "打扫房间", false),
            record("b", "洗衣服", true),
            record("d", "买水", true),
        ]
    );
}

#[test]
fn remove_many_by_completion() {
    let mut repo = seeded();
    repo.remove_many(&TaskFilter::completed()).unwrap();

    assert_eq!(ids(&repo.get_many(None)), vec!["a", "c"]);
    assert!(repo.get_many(Some(&TaskFilter::completed())).is_empty());
    assert_eq!(repo.database().writes(), 1);
}

#[test]
fn remove_many_with_no_matches_keeps_everything() {
    let mut repo = seeded();
    repo.remove_many(&TaskFilter::new().with_title(TitleFilter::literal("遛狗")))
        .unwrap();
    assert_eq!(repo.get_many(None).len(), 4);
}

#[test]
fn file_database_persists_across_reopen() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    let path = home.task_file();

    let created = {
        let db = JsonFileDatabase::open(&path, TaskDocument::default())?;
        let mut repo = TaskRepository::new(db);
        let created = repo.insert_one(NewTask::new("打扫房间", false))?;
        repo.insert_one(NewTask::new("买菜", false))?;
        repo.update_by_id(&created.id, &TaskPatch::completion(true))?;
        created
    };

    let db = JsonFileDatabase::open(&path, TaskDocument::default())?;
    let repo = TaskRepository::new(db);
    let tasks = repo.get_many(None);
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, created.id);
    assert!(tasks[0].is_complete);
    assert_eq!(tasks[1].title, "买菜");

    let on_disk = home.read_tasks()?;
    assert_eq!(on_disk.len(), 2);
    Ok(())
}

#[test]
fn file_database_uses_default_document_until_first_write(
) -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    let path = home.task_file();
    let default = TaskDocument {
        tasks: vec![record("seed", "示例任务", false)],
    };

    let mut db = JsonFileDatabase::open(&path, default.clone())?;
    assert_eq!(db.data(), &default);
    assert!(!path.exists());

    db.update(|doc| doc.tasks[0].is_complete = true)?;
    assert!(path.exists());
    assert_eq!(home.read_tasks()?, vec![record("seed", "示例任务", true)]);
    Ok(())
}

#[test]
fn file_database_rejects_corrupt_file() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    std::fs::write(home.task_file(), "{ not json")?;

    let result = JsonFileDatabase::open(home.task_file(), TaskDocument::default());
    assert!(matches!(result, Err(tasklist::Error::Json(_))));
    Ok(())
}

#[test]
fn file_database_reads_existing_file() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    home.write_tasks(&[record("x", "洗碗", true)])?;

    let db = JsonFileDatabase::open(home.task_file(), TaskDocument::default())?;
    assert_eq!(db.data().tasks, vec![record("x", "洗碗", true)]);
    Ok(())
}

#[test]
fn failed_insert_is_not_kept_in_memory() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    let blocker = home.path().join("blocker");
    std::fs::write(&blocker, "not a directory")?;

    let db = JsonFileDatabase::open(blocker.join("tasks.json"), TaskDocument::default())?;
    let mut repo = TaskRepository::new(db);

    assert!(repo.insert_one(NewTask::new("买菜", false)).is_err());
    assert!(repo.get_many(None).is_empty());

    std::fs::remove_file(&blocker)?;
    std::fs::create_dir(&blocker)?;
    let mut service = tasklist::service::TaskService::new(repo);
    service.add("洗碗")?;

    let titles: Vec<String> = service.search(None).into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["洗碗"]);

    let on_disk = JsonFileDatabase::open(blocker.join("tasks.json"), TaskDocument::default())?;
    assert_eq!(on_disk.data().tasks.len(), 1);
    assert_eq!(on_disk.data().tasks[0].title, "洗碗");
    Ok(())
}

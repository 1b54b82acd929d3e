//! Tests for the kanban task service

#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use super::super::cache::SnapshotCache;
    use super::super::config::Config;
    use super::super::error::TaskError;
    use super::super::service::TaskService;
    use super::super::store::{NewTask, SqliteStore, StoreHandle, TaskStore};
    use super::super::types::{Priority, TaskStatus};

    const OWNER: &str = "tester";

    struct TestRig {
        service: TaskService,
        store: Arc<SqliteStore>,
        cache: SnapshotCache,
        _dir: tempfile::TempDir,
    }

    /// Build a service over an in-memory store and a temp-dir cache file.
    /// The store handle starts installed; no owner is provisioned.
    fn rig_without_owner(cache_reads: bool) -> TestRig {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path().join("tasks-cache.json"));

        let store = Arc::new(SqliteStore::open(Path::new(":memory:")).unwrap());
        let handle = StoreHandle::new();
        handle.install(store.clone());

        let config = Config {
            db_path: Path::new(":memory:").to_path_buf(),
            owner_name: OWNER.to_string(),
            cache_path: cache.path().to_path_buf(),
            cache_reads,
        };

        let service = TaskService::new(handle, cache.clone(), &config);

        TestRig {
            service,
            store,
            cache,
            _dir: dir,
        }
    }

    async fn rig() -> TestRig {
        let rig = rig_without_owner(true);
        rig.store.insert_owner(OWNER).await.unwrap();
        rig
    }

    /// Service wired to an empty store handle, simulating a store that has
    /// not finished (or failed) background initialization.
    fn rig_with_unready_store() -> TestRig {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path().join("tasks-cache.json"));

        // A throwaway store the handle never sees
        let store = Arc::new(SqliteStore::open(Path::new(":memory:")).unwrap());
        let handle = StoreHandle::new();

        let config = Config {
            db_path: Path::new(":memory:").to_path_buf(),
            owner_name: OWNER.to_string(),
            cache_path: cache.path().to_path_buf(),
            cache_reads: true,
        };

        let service = TaskService::new(handle, cache.clone(), &config);

        TestRig {
            service,
            store,
            cache,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_defaults() {
        let rig = rig().await;

        rig.service
            .create_task("Write spec".to_string(), "the details".to_string())
            .await
            .unwrap();

        rig.cache.clear().await.unwrap();
        let tasks = rig.service.get_tasks().await.unwrap();

        assert_eq!(tasks.len(), 1);
        let task = &tasks[0];
        assert_eq!(task.title, "Write spec");
        assert_eq!(task.description, "the details");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.updated_at >= task.created_at);
        assert!(task.owner_id.is_some());

        // The owner's informational task list got the new id
        let owner = rig.store.find_owner(OWNER).await.unwrap().unwrap();
        assert_eq!(owner.tasks, vec![task.id.clone()]);
    }

    #[tokio::test]
    async fn test_empty_title_and_description_accepted() {
        let rig = rig().await;

        rig.service
            .create_task(String::new(), String::new())
            .await
            .unwrap();

        rig.cache.clear().await.unwrap();
        let tasks = rig.service.get_tasks().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "");
    }

    #[tokio::test]
    async fn test_move_task_sets_status_and_start_time() {
        let rig = rig().await;

        let created = rig
            .service
            .create_task("t".to_string(), String::new())
            .await
            .unwrap();

        rig.service
            .move_task(&created.id, TaskStatus::InProgress)
            .await
            .unwrap();

        rig.cache.clear().await.unwrap();
        let tasks = rig.service.get_tasks().await.unwrap();
        let task = &tasks[0];

        assert_eq!(task.status, TaskStatus::InProgress);
        let started = task.started_at.expect("moving to inProgress sets started_at");
        assert!(started >= task.created_at);
    }

    #[tokio::test]
    async fn test_move_to_in_progress_twice_is_benign() {
        let rig = rig().await;

        let created = rig
            .service
            .create_task("t".to_string(), String::new())
            .await
            .unwrap();

        let first = rig
            .service
            .move_task(&created.id, TaskStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(first.status, TaskStatus::InProgress);

        // Repeated saves while in progress re-stamp started_at; no error
        let second = rig
            .service
            .move_task(&created.id, TaskStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(second.status, TaskStatus::InProgress);
        assert!(second.started_at.unwrap() >= first.started_at.unwrap());
    }

    #[tokio::test]
    async fn test_set_priority_leaves_status_unchanged() {
        let rig = rig().await;

        let created = rig
            .service
            .create_task("t".to_string(), String::new())
            .await
            .unwrap();
        rig.service
            .move_task(&created.id, TaskStatus::InProgress)
            .await
            .unwrap();

        rig.service
            .set_task_priority(&created.id, Priority::High)
            .await
            .unwrap();

        rig.cache.clear().await.unwrap();
        let tasks = rig.service.get_tasks().await.unwrap();
        let task = &tasks[0];
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn test_unknown_task_is_not_found() {
        let rig = rig().await;

        let err = rig
            .service
            .move_task("no-such-id", TaskStatus::Done)
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::TaskNotFound(id) if id == "no-such-id"));

        let err = rig
            .service
            .set_task_priority("no-such-id", Priority::Low)
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::TaskNotFound(_)));
    }

    #[tokio::test]
    async fn test_snapshot_serves_stale_reads() {
        let rig = rig().await;

        rig.service
            .create_task("visible".to_string(), String::new())
            .await
            .unwrap();

        // Mutate the store directly, behind the service's back
        let owner = rig.store.find_owner(OWNER).await.unwrap().unwrap();
        let mut sneaky = rig
            .store
            .insert_task(NewTask {
                title: "sneaky".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        sneaky.owner_id = Some(owner.id.clone());
        rig.store.save_task(&mut sneaky).await.unwrap();

        // The snapshot from the create still answers; no freshness check
        let tasks = rig.service.get_tasks().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "visible");

        // Clearing the snapshot falls through to the store
        rig.cache.clear().await.unwrap();
        let tasks = rig.service.get_tasks().await.unwrap();
        assert_eq!(tasks.len(), 2);
    }

    #[tokio::test]
    async fn test_cache_reads_disabled_always_hits_store() {
        let rig = rig_without_owner(false);
        rig.store.insert_owner(OWNER).await.unwrap();

        rig.service
            .create_task("visible".to_string(), String::new())
            .await
            .unwrap();

        let owner = rig.store.find_owner(OWNER).await.unwrap().unwrap();
        let mut sneaky = rig
            .store
            .insert_task(NewTask {
                title: "sneaky".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        sneaky.owner_id = Some(owner.id.clone());
        rig.store.save_task(&mut sneaky).await.unwrap();

        // With snapshot serving disabled the direct mutation is visible
        let tasks = rig.service.get_tasks().await.unwrap();
        assert_eq!(tasks.len(), 2);
    }

    #[tokio::test]
    async fn test_reads_survive_unready_store() {
        let ready = rig().await;
        ready
            .service
            .create_task("cached".to_string(), String::new())
            .await
            .unwrap();
        let snapshot = ready.cache.read().await.unwrap().unwrap();

        // Same snapshot file, but the store never becomes ready
        let rig = rig_with_unready_store();
        rig.cache.write(&snapshot).await.unwrap();

        let tasks = rig.service.get_tasks().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "cached");

        // Mutations still fail individually until the store is installed
        let err = rig
            .service
            .create_task("t".to_string(), String::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::StoreUnavailable));
        assert!(!rig.service.store_ready());
    }

    #[tokio::test]
    async fn test_unready_store_without_snapshot_is_unavailable() {
        let rig = rig_with_unready_store();

        let err = rig.service.get_tasks().await.unwrap_err();
        assert!(matches!(err, TaskError::StoreUnavailable));
    }

    #[tokio::test]
    async fn test_missing_owner_fails_reads() {
        let rig = rig_without_owner(true);

        let err = rig.service.get_tasks().await.unwrap_err();
        assert!(matches!(err, TaskError::OwnerNotFound(name) if name == OWNER));
    }

    #[tokio::test]
    async fn test_create_without_owner_is_silent() {
        let rig = rig_without_owner(true);

        // Creation succeeds; the task just has no owner
        let task = rig
            .service
            .create_task("orphan".to_string(), String::new())
            .await
            .unwrap();
        assert!(task.owner_id.is_none());

        // The orphan exists in the store but is invisible through the
        // owner-scoped read path
        assert!(rig.store.find_task(&task.id).await.unwrap().is_some());
        let err = rig.service.get_tasks().await.unwrap_err();
        assert!(matches!(err, TaskError::OwnerNotFound(_)));
    }

    #[tokio::test]
    async fn test_mutations_write_through_to_snapshot() {
        let rig = rig().await;

        let created = rig
            .service
            .create_task("t".to_string(), String::new())
            .await
            .unwrap();
        assert!(rig.cache.read().await.unwrap().is_some());

        rig.service
            .move_task(&created.id, TaskStatus::Done)
            .await
            .unwrap();

        // The snapshot mirrors the owner-scoped store state after the move
        let owner = rig.store.find_owner(OWNER).await.unwrap().unwrap();
        let from_store = rig.store.tasks_for_owner(&owner.id).await.unwrap();
        let from_cache = rig.cache.read().await.unwrap().unwrap();
        assert_eq!(from_cache, from_store);
        assert_eq!(from_cache[0].status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn test_get_tasks_by_status_filters_in_order() {
        let rig = rig().await;

        let a = rig
            .service
            .create_task("a".to_string(), String::new())
            .await
            .unwrap();
        let b = rig
            .service
            .create_task("b".to_string(), String::new())
            .await
            .unwrap();
        rig.service
            .create_task("c".to_string(), String::new())
            .await
            .unwrap();

        rig.service.move_task(&a.id, TaskStatus::Done).await.unwrap();
        rig.service
            .move_task(&b.id, TaskStatus::InProgress)
            .await
            .unwrap();

        let all = rig.service.get_tasks_by_status(None).await.unwrap();
        assert_eq!(all.len(), 3);
        let titles: Vec<_> = all.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["a", "b", "c"]);

        let in_progress = rig
            .service
            .get_tasks_by_status(Some(TaskStatus::InProgress))
            .await
            .unwrap();
        assert_eq!(in_progress.len(), 1);
        assert_eq!(in_progress[0].title, "b");
    }

    #[tokio::test]
    async fn test_stats_counts_add_up() {
        let rig = rig().await;

        let a = rig
            .service
            .create_task("a".to_string(), String::new())
            .await
            .unwrap();
        let b = rig
            .service
            .create_task("b".to_string(), String::new())
            .await
            .unwrap();
        rig.service
            .create_task("c".to_string(), String::new())
            .await
            .unwrap();

        rig.service
            .move_task(&a.id, TaskStatus::InProgress)
            .await
            .unwrap();
        rig.service.move_task(&b.id, TaskStatus::Done).await.unwrap();

        let stats = rig.service.task_stats().await.unwrap();
        assert_eq!(stats.tasks_count, 3);
        assert_eq!(stats.in_progress_count, 1);
        assert_eq!(stats.done_count, 1);
        assert_eq!(stats.todo_count, 1);
        assert_eq!(
            stats.todo_count + stats.in_progress_count + stats.done_count,
            stats.tasks_count
        );
        assert_eq!(stats.all_tasks.len(), 3);
    }

    #[tokio::test]
    async fn test_end_to_end_flow() {
        let rig = rig().await;

        let created = rig
            .service
            .create_task("Write spec".to_string(), String::new())
            .await
            .unwrap();
        assert_eq!(created.status, TaskStatus::Todo);

        let moved = rig
            .service
            .move_task(&created.id, TaskStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(moved.status, TaskStatus::InProgress);
        assert!(moved.started_at.is_some());

        let reprioritized = rig
            .service
            .set_task_priority(&created.id, Priority::High)
            .await
            .unwrap();
        assert_eq!(reprioritized.priority, Priority::High);
        assert_eq!(reprioritized.status, TaskStatus::InProgress);

        let in_progress = rig
            .service
            .get_tasks_by_status(Some(TaskStatus::InProgress))
            .await
            .unwrap();
        assert_eq!(in_progress.len(), 1);
        assert_eq!(in_progress[0].id, created.id);
        assert_eq!(in_progress[0].title, "Write spec");
    }
}

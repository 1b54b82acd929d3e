//! Task service: the single authority over the owner's tasks
//!
//! All mutations write through to the snapshot cache (the cache is rewritten
//! from an owner-scoped store read after every visible change), and reads
//! are served cache-first: an existing snapshot is returned verbatim with no
//! freshness check against the store. At most one of {cache, store} is read
//! per call.

use tracing::warn;

use crate::cache::SnapshotCache;
use crate::config::Config;
use crate::error::TaskError;
use crate::store::{NewTask, StoreHandle, TaskStore};
use crate::types::{Owner, Priority, Task, TaskStats, TaskStatus};

use std::sync::Arc;

#[derive(Clone)]
pub struct TaskService {
    store: StoreHandle,
    cache: SnapshotCache,
    owner_name: String,
    cache_reads: bool,
}

impl TaskService {
    pub fn new(store: StoreHandle, cache: SnapshotCache, config: &Config) -> Self {
        Self {
            store,
            cache,
            owner_name: config.owner_name.clone(),
            cache_reads: config.cache_reads,
        }
    }

    /// Whether the persistent store has finished initializing.
    pub fn store_ready(&self) -> bool {
        self.store.ready()
    }

    /// Create a task with status todo and priority medium, attach it to the
    /// configured owner, and refresh the snapshot cache.
    ///
    /// If the owner does not resolve, the task is left ownerless (it exists
    /// in the store but is invisible through the owner-scoped read path);
    /// this is logged, not reported to the caller. A cache refresh failure
    /// after a successful create is swallowed as well; no rollback is
    /// attempted.
    pub async fn create_task(
        &self,
        title: String,
        description: String,
    ) -> Result<Task, TaskError> {
        let store = self.store.get()?;

        let mut task = store.insert_task(NewTask { title, description }).await?;

        match store.find_owner(&self.owner_name).await? {
            Some(mut owner) => {
                task.owner_id = Some(owner.id.clone());
                store.save_task(&mut task).await?;
                owner.tasks.push(task.id.clone());
                store.save_owner(&owner).await?;
            }
            None => {
                warn!(
                    owner = %self.owner_name,
                    task = %task.id,
                    "owner not found; task created without an owner"
                );
            }
        }

        if let Err(err) = self.refresh_cache(&store).await {
            warn!(error = %err, "snapshot cache refresh failed after create");
        }

        Ok(task)
    }

    /// The owner's tasks, in creation order.
    ///
    /// Served from the snapshot cache when one exists (and cache reads are
    /// enabled); otherwise read from the store, which also populates the
    /// cache for the next call.
    pub async fn get_tasks(&self) -> Result<Vec<Task>, TaskError> {
        if self.cache_reads {
            if let Some(tasks) = self.cache.read().await? {
                return Ok(tasks);
            }
        }

        let store = self.store.get()?;
        let owner = self.resolve_owner(store.as_ref()).await?;
        let tasks = store.tasks_for_owner(&owner.id).await?;

        if let Err(err) = self.cache.write(&tasks).await {
            warn!(error = %err, "failed to populate snapshot cache");
        }

        Ok(tasks)
    }

    /// `get_tasks` filtered by status; no filter returns everything.
    pub async fn get_tasks_by_status(
        &self,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, TaskError> {
        let tasks = self.get_tasks().await?;
        Ok(match status {
            None => tasks,
            Some(wanted) => tasks.into_iter().filter(|t| t.status == wanted).collect(),
        })
    }

    /// Move a task to a new status and rewrite the snapshot cache.
    pub async fn move_task(
        &self,
        task_id: &str,
        new_status: TaskStatus,
    ) -> Result<Task, TaskError> {
        let store = self.store.get()?;

        let mut task = store
            .find_task(task_id)
            .await?
            .ok_or_else(|| TaskError::TaskNotFound(task_id.to_string()))?;

        task.status = new_status;
        store.save_task(&mut task).await?;

        self.refresh_cache(&store).await?;
        Ok(task)
    }

    /// Change a task's priority and rewrite the snapshot cache.
    pub async fn set_task_priority(
        &self,
        task_id: &str,
        new_priority: Priority,
    ) -> Result<Task, TaskError> {
        let store = self.store.get()?;

        let mut task = store
            .find_task(task_id)
            .await?
            .ok_or_else(|| TaskError::TaskNotFound(task_id.to_string()))?;

        task.priority = new_priority;
        store.save_task(&mut task).await?;

        self.refresh_cache(&store).await?;
        Ok(task)
    }

    /// Derived statistics over the current task snapshot.
    pub async fn task_stats(&self) -> Result<TaskStats, TaskError> {
        let tasks = self.get_tasks().await?;
        Ok(TaskStats::from_tasks(tasks))
    }

    async fn resolve_owner(&self, store: &dyn TaskStore) -> Result<Owner, TaskError> {
        store
            .find_owner(&self.owner_name)
            .await?
            .ok_or_else(|| TaskError::OwnerNotFound(self.owner_name.clone()))
    }

    /// Rewrite the snapshot from a fresh owner-scoped store read.
    async fn refresh_cache(&self, store: &Arc<dyn TaskStore>) -> Result<(), TaskError> {
        let owner = self.resolve_owner(store.as_ref()).await?;
        let tasks = store.tasks_for_owner(&owner.id).await?;
        self.cache.write(&tasks).await?;
        Ok(())
    }
}

//! Type definitions for kanban-mcp

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error type for parsing TaskStatus from string
#[derive(Debug, Clone)]
pub struct ParseTaskStatusError(String);

impl fmt::Display for ParseTaskStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid task status: {}", self.0)
    }
}

impl std::error::Error for ParseTaskStatusError {}

/// Kanban column a task sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "inProgress",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "inProgress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            _ => Err(ParseTaskStatusError(s.to_string())),
        }
    }
}

/// Error type for parsing Priority from string
#[derive(Debug, Clone)]
pub struct ParsePriorityError(String);

impl fmt::Display for ParsePriorityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid priority: {}", self.0)
    }
}

impl std::error::Error for ParsePriorityError {}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ParsePriorityError(s.to_string())),
        }
    }
}

/// Task representation
///
/// `id` is assigned by the store on creation and never changes. `created_at`
/// is immutable; `updated_at` and `started_at` are maintained by the store's
/// save hook, not by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub owner_id: Option<String>,
}

/// The single user tasks belong to
///
/// Owners are created out-of-band; this server only resolves `username` to
/// an owner and appends to its task list. The `tasks` list is informational,
/// the authoritative relation is `Task::owner_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    pub username: String,
    pub tasks: Vec<String>,
}

/// Derived task statistics for the analytics prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStats {
    pub all_tasks: Vec<Task>,
    pub tasks_count: usize,
    #[serde(rename = "inProgress_count")]
    pub in_progress_count: usize,
    pub todo_count: usize,
    pub done_count: usize,
}

impl TaskStats {
    /// Compute statistics from a task snapshot.
    ///
    /// The todo bucket is derived by subtraction: anything that is not
    /// in-progress and not done counts as todo.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let tasks_count = tasks.len();
        let in_progress_count = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::InProgress)
            .count();
        let done_count = tasks.iter().filter(|t| t.status == TaskStatus::Done).count();

        TaskStats {
            tasks_count,
            in_progress_count,
            todo_count: tasks_count - in_progress_count - done_count,
            done_count,
            all_tasks: tasks,
        }
    }
}

/// Response for task list operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done] {
            assert_eq!(TaskStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(TaskStatus::from_str("archived").is_err());
    }

    #[test]
    fn test_status_wire_format() {
        // The wire format uses camelCase, matching the board column names
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"inProgress\""
        );
        assert_eq!(
            serde_json::from_str::<TaskStatus>("\"todo\"").unwrap(),
            TaskStatus::Todo
        );
    }

    #[test]
    fn test_priority_round_trip() {
        for priority in [Priority::Low, Priority::Medium, Priority::High] {
            assert_eq!(Priority::from_str(priority.as_str()).unwrap(), priority);
        }
        assert!(Priority::from_str("urgent").is_err());
    }

    #[test]
    fn test_stats_from_tasks() {
        let now = Utc::now();
        let task = |status| Task {
            id: uuid::Uuid::new_v4().to_string(),
            title: "t".to_string(),
            description: String::new(),
            status,
            priority: Priority::Medium,
            tags: vec![],
            due_date: None,
            created_at: now,
            updated_at: now,
            started_at: None,
            owner_id: None,
        };

        let stats = TaskStats::from_tasks(vec![
            task(TaskStatus::Todo),
            task(TaskStatus::Todo),
            task(TaskStatus::InProgress),
            task(TaskStatus::Done),
        ]);

        assert_eq!(stats.tasks_count, 4);
        assert_eq!(stats.todo_count, 2);
        assert_eq!(stats.in_progress_count, 1);
        assert_eq!(stats.done_count, 1);
        assert_eq!(
            stats.todo_count + stats.in_progress_count + stats.done_count,
            stats.tasks_count
        );
    }
}

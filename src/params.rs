//! Parameter definitions for kanban-mcp tools

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{Priority, TaskStatus};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateTaskParams {
    #[schemars(description = "Title of the new task")]
    pub title: String,

    #[schemars(description = "Free-form description; may be empty")]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MoveTaskParams {
    #[schemars(description = "Identifier of the task to move")]
    pub task_id: String,

    #[schemars(description = "Target board column: todo, inProgress, or done")]
    pub new_status: TaskStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SetTaskPriorityParams {
    #[schemars(description = "Identifier of the task to reprioritize")]
    pub task_id: String,

    #[schemars(description = "New priority: low, medium, or high")]
    pub new_priority: Priority,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListTasksParams {
    #[schemars(description = "Only return tasks in this status; omit for all tasks")]
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

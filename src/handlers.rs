//! Handler implementations for kanban-mcp tools
//!
//! Each handler converts MCP params into task service calls and collapses
//! the service's error taxonomy into one coarse MCP failure per operation.
//! Only short text messages cross the tool boundary.

use rmcp::{
    model::{CallToolResult, Content},
    ErrorData as McpError,
};
use serde::Serialize;

use crate::error::TaskError;
use crate::params::*;
use crate::service::TaskService;
use crate::types::TaskListResponse;

// ============================================================================
// Helper Functions
// ============================================================================

pub fn internal_error(message: impl Into<String>) -> McpError {
    McpError::internal_error(message.into(), None)
}

pub fn invalid_params(message: impl Into<String>) -> McpError {
    McpError::invalid_params(message.into(), None)
}

pub fn text_success(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

pub fn json_success<T: Serialize>(data: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(data).map_err(|e| internal_error(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Collapse a service error into the single failure outcome for `operation`.
///
/// NotFound variants become invalid-params errors naming the target;
/// everything else (store, cache, readiness) is folded into one internal
/// error per operation.
pub fn task_error_to_mcp(operation: &str, err: TaskError) -> McpError {
    match &err {
        TaskError::TaskNotFound(_) | TaskError::OwnerNotFound(_) => {
            invalid_params(format!("Failed to {operation}: {err}"))
        }
        _ => internal_error(format!("Failed to {operation}: {err}")),
    }
}

// ============================================================================
// Handler Functions
// ============================================================================

pub async fn create_task(
    service: &TaskService,
    params: CreateTaskParams,
) -> Result<CallToolResult, McpError> {
    let title = params.title.clone();
    service
        .create_task(params.title, params.description)
        .await
        .map_err(|e| task_error_to_mcp("create the task", e))?;

    Ok(text_success(format!(
        "Task \"{title}\" created successfully!"
    )))
}

pub async fn move_task(
    service: &TaskService,
    params: MoveTaskParams,
) -> Result<CallToolResult, McpError> {
    let task = service
        .move_task(&params.task_id, params.new_status)
        .await
        .map_err(|e| {
            task_error_to_mcp(
                &format!("move task \"{}\" to \"{}\"", params.task_id, params.new_status),
                e,
            )
        })?;

    Ok(text_success(format!(
        "Task \"{}\" moved to \"{}\" successfully!",
        task.id, task.status
    )))
}

pub async fn set_task_priority(
    service: &TaskService,
    params: SetTaskPriorityParams,
) -> Result<CallToolResult, McpError> {
    let task = service
        .set_task_priority(&params.task_id, params.new_priority)
        .await
        .map_err(|e| {
            task_error_to_mcp(
                &format!(
                    "set task \"{}\" priority to \"{}\"",
                    params.task_id, params.new_priority
                ),
                e,
            )
        })?;

    Ok(text_success(format!(
        "Set task \"{}\" priority to \"{}\" successfully!",
        task.id, task.priority
    )))
}

pub async fn list_tasks(
    service: &TaskService,
    params: ListTasksParams,
) -> Result<CallToolResult, McpError> {
    let tasks = service
        .get_tasks_by_status(params.status)
        .await
        .map_err(|e| task_error_to_mcp("list tasks", e))?;

    let response = TaskListResponse {
        total: tasks.len(),
        tasks,
    };

    json_success(&response)
}

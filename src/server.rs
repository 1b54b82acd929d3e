//! MCP Server implementation for the kanban board
//!
//! This module defines the server surface: tools for mutations and queries,
//! the `tasks://all` resource for raw JSON reads, and the `tasks-analytics`
//! prompt. Tool bodies delegate to the handlers module; the task service
//! does all of the actual work.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        AnnotateAble, CallToolResult, GetPromptRequestParam, GetPromptResult,
        ListPromptsResult, ListResourcesResult, PaginatedRequestParam, Prompt, PromptMessage,
        PromptMessageRole, RawResource, ReadResourceRequestParam, ReadResourceResult,
        ResourceContents, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_handler, tool_router, ErrorData as McpError,
};

use crate::handlers;
use crate::params::*;
use crate::service::TaskService;

/// URI of the whole-board task resource
pub const TASKS_RESOURCE_URI: &str = "tasks://all";

/// Name of the analytics prompt
pub const ANALYTICS_PROMPT: &str = "tasks-analytics";

/// The main Kanban MCP Server
#[derive(Clone)]
pub struct KanbanMcpServer {
    service: TaskService,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Tool Router - Each tool delegates to its handler
// ============================================================================

#[tool_router]
impl KanbanMcpServer {
    pub fn new(service: TaskService) -> Self {
        Self {
            service,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Create a new todo task on the kanban board")]
    async fn create_task(
        &self,
        Parameters(params): Parameters<CreateTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::create_task(&self.service, params).await
    }

    #[tool(description = "Move a task to a different status column")]
    async fn move_task(
        &self,
        Parameters(params): Parameters<MoveTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::move_task(&self.service, params).await
    }

    #[tool(description = "Set a task to a different priority")]
    async fn set_task_priority(
        &self,
        Parameters(params): Parameters<SetTaskPriorityParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::set_task_priority(&self.service, params).await
    }

    #[tool(description = "List tasks, optionally filtered by status")]
    async fn list_tasks(
        &self,
        Parameters(params): Parameters<ListTasksParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::list_tasks(&self.service, params).await
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for KanbanMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Kanban task board MCP server for a single user. Tasks move between \
                 todo, inProgress, and done; reads are served from a local snapshot \
                 cache so the board stays available while the database connects. \
                 Read tasks://all for the raw task list and use the tasks-analytics \
                 prompt for a status summary."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let mut tasks = RawResource::new(TASKS_RESOURCE_URI, "Tasks");
        tasks.description = Some("All tasks on the kanban board".into());
        tasks.mime_type = Some("application/json".into());

        Ok(ListResourcesResult {
            resources: vec![tasks.no_annotation()],
            next_cursor: None,
            meta: Default::default(),
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        if request.uri != TASKS_RESOURCE_URI {
            return Err(McpError::resource_not_found(
                format!("unknown resource: {}", request.uri),
                None,
            ));
        }

        let tasks = self
            .service
            .get_tasks()
            .await
            .map_err(|e| handlers::task_error_to_mcp("read tasks", e))?;

        let json = serde_json::to_string(&tasks)
            .map_err(|e| handlers::internal_error(e.to_string()))?;

        let mut contents = ResourceContents::text(json, request.uri);
        if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
            *mime_type = Some("application/json".into());
        }

        Ok(ReadResourceResult {
            contents: vec![contents],
        })
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult {
            meta: Default::default(),
            next_cursor: None,
            prompts: vec![Prompt::new(
                ANALYTICS_PROMPT,
                Some("Get analytics for the user's tasks"),
                None,
            )],
        })
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        if request.name != ANALYTICS_PROMPT {
            return Err(handlers::invalid_params(format!(
                "unknown prompt: {}",
                request.name
            )));
        }

        let stats = self
            .service
            .task_stats()
            .await
            .map_err(|e| handlers::task_error_to_mcp("compute task analytics", e))?;

        let stats_json = serde_json::to_string_pretty(&stats)
            .map_err(|e| handlers::internal_error(e.to_string()))?;

        let text = format!(
            "Analyze the lead time and current task status distribution from the \
             given task stats and present them in a table:\n{stats_json}"
        );

        Ok(GetPromptResult {
            description: None,
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }
}

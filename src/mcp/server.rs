use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    service::RequestContext,
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::config::NotesConfig;
use crate::core::error::NotesError;
use crate::toolkit::note_toolbox::entry::{
    Category, EntryFilter, EntryOrdering, InMemoryNoteStore, ListQuery,
};
use crate::toolkit::note_toolbox::ingest::NoteService;
use crate::utils::preview;

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
const CONFIG_RESOURCE_URI: &str = "config://smartnotes";


#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct AddNoteParams {
    #[schemars(description = "Note text in English, Hindi, Marathi or Hinglish")]
    pub text: String,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct ImportNotesParams {
    #[schemars(description = "Raw multi-note text (lists, paragraphs, pasted chats)")]
    pub text: String,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct SearchNotesParams {
    #[schemars(description = "Search query; queries under 3 characters match literally")]
    pub query: String,
}

#[derive(Debug, Default, Deserialize, rmcp::schemars::JsonSchema)]
pub struct ListNotesParams {
    #[schemars(description = "Category: code_snippet, learning_note, idea, bug_fix, general, task")]
    pub category: Option<String>,
    #[schemars(description = "Only completed (true) or open (false) notes")]
    pub completed: Option<bool>,
    #[schemars(description = "Max results")]
    pub limit: Option<usize>,
    #[schemars(description = "Oldest first instead of newest first")]
    pub oldest_first: Option<bool>,
}

impl ListNotesParams {
    fn into_query(self) -> Result<ListQuery, McpError> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(Category::from_str(raw).map_err(|_| {
                McpError::invalid_params(format!("Unknown category: {}", raw), None)
            })?),
        };
        Ok(ListQuery {
            filter: EntryFilter {
                category,
                completed: self.completed,
            },
            ordering: if self.oldest_first.unwrap_or(false) {
                EntryOrdering::OldestFirst
            } else {
                EntryOrdering::NewestFirst
            },
            limit: self.limit,
        })
    }
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct NoteIdParams {
    #[schemars(description = "Note ID")]
    pub id: String,
}


#[derive(Clone)]
pub struct SmartNotesMcpServer {
    service: Arc<NoteService>,
    config: Arc<NotesConfig>,
    tool_router: ToolRouter<Self>,
}

impl SmartNotesMcpServer {

    pub fn new(service: NoteService, config: NotesConfig) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }


    fn convert_error(err: NotesError) -> McpError {
        match err {
            NotesError::Validation(msg) | NotesError::Config(msg) => {
                McpError::invalid_params(msg, None)
            }
            NotesError::NotFound(id) => {
                McpError::invalid_params(format!("Note not found: {}", id), None)
            }
            other => McpError::internal_error(other.to_string(), None),
        }
    }


    fn result_to_json<T: Serialize>(result: T) -> Result<String, McpError> {
        serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }

    fn config_resource(&self) -> serde_json::Value {
        let config = &self.config;
        json!({
            "version": SERVER_VERSION,
            "llm": {
                "provider": config.llm_provider,
                "model": config.llm_model,
                "temperature": config.llm_temperature,
                "timeout_secs": config.timeout,
            },
            "retry": {
                "max_attempts": config.max_attempts,
                "base_delay_ms": config.retry_base_delay_ms,
                "max_delay_ms": config.retry_max_delay_ms,
            },
            "search": {
                "expansion_enabled": config.expansion_enabled,
                "min_expansion_query_chars": config.min_expansion_query_chars,
            },
            "bulk": {
                "segmentation_min_chars": config.segmentation_min_chars,
            },
            "tools": [
                "add_note",
                "import_notes",
                "search_notes",
                "filter_notes",
                "list_notes",
                "toggle_note",
                "delete_note",
            ],
        })
    }
}

#[tool_router]
impl SmartNotesMcpServer {

    #[tool(description = "Classify and save one note (language, category, tags, due date, priority, slang). Falls back to rule-based classification when the LLM is unavailable. Returns the saved entry.")]
    async fn add_note(
        &self,
        Parameters(params): Parameters<AddNoteParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("📝 Adding note: '{}'", preview(&params.text, 50));

        let entry = self
            .service
            .add_entry(&params.text)
            .await
            .map_err(Self::convert_error)?;

        info!("✅ Saved {} as {}", entry.id, entry.category);
        let json = Self::result_to_json(&entry)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }


    #[tool(description = "Split raw text into individual notes, classify and save each. Returns: {total, persisted, failed, used_fallback, entries, errors}")]
    async fn import_notes(
        &self,
        Parameters(params): Parameters<ImportNotesParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("📦 Importing {} chars of notes", params.text.chars().count());

        let report = self
            .service
            .import_bulk(&params.text)
            .await
            .map_err(Self::convert_error)?;

        if report.failed > 0 {
            warn!("⚠️ {} of {} notes failed to save", report.failed, report.total);
        } else {
            info!("✅ Imported {} notes", report.persisted);
        }
        let json = Self::result_to_json(&report)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }


    #[tool(description = "AI-assisted search: expands the query with synonyms and translations, then ranks notes by relevance and recency. Returns: {results, expanded_query, intent, path}")]
    async fn search_notes(
        &self,
        Parameters(params): Parameters<SearchNotesParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("🔍 Searching: '{}'", preview(&params.query, 50));

        let outcome = self
            .service
            .search(&params.query)
            .await
            .map_err(Self::convert_error)?;

        info!("✅ Found {} notes via {:?}", outcome.results.len(), outcome.path);
        let json = Self::result_to_json(&outcome)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }


    #[tool(description = "Offline filter: every query word must appear in the note's text, translation, category, tags or reasoning. Never calls the LLM.")]
    async fn filter_notes(
        &self,
        Parameters(params): Parameters<SearchNotesParams>,
    ) -> Result<CallToolResult, McpError> {
        let results = self
            .service
            .local_search(&params.query)
            .await
            .map_err(Self::convert_error)?;

        let json = Self::result_to_json(&results)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }


    #[tool(description = "List notes, optionally filtered by category and completion. Newest first unless oldest_first is set.")]
    async fn list_notes(
        &self,
        Parameters(params): Parameters<ListNotesParams>,
    ) -> Result<CallToolResult, McpError> {
        let query = params.into_query()?;
        let entries = self
            .service
            .list(&query)
            .await
            .map_err(Self::convert_error)?;

        let json = Self::result_to_json(&entries)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }


    #[tool(description = "Flip a note between open and completed. Returns the updated entry.")]
    async fn toggle_note(
        &self,
        Parameters(params): Parameters<NoteIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let entry = self
            .service
            .toggle_complete(&params.id)
            .await
            .map_err(Self::convert_error)?;

        info!("✅ Note {} completed={}", entry.id, entry.is_completed);
        let json = Self::result_to_json(&entry)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }


    #[tool(description = "Delete a note by ID. Returns: {deleted: true, id}")]
    async fn delete_note(
        &self,
        Parameters(params): Parameters<NoteIdParams>,
    ) -> Result<CallToolResult, McpError> {
        self.service
            .delete_entry(&params.id)
            .await
            .map_err(Self::convert_error)?;

        info!("🗑️ Deleted note {}", params.id);
        let json = Self::result_to_json(json!({ "deleted": true, "id": params.id }))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}


#[tool_handler]
impl ServerHandler for SmartNotesMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "smartnotes".into(),
                version: SERVER_VERSION.into(),
                ..Default::default()
            },
            instructions: Some(
                "SmartNotes - multilingual note capture with LLM classification. Use add_note or \
                 import_notes to save, search_notes for AI-assisted search, filter_notes for a \
                 fast offline filter, and toggle_note to mark tasks done."
                    .to_string(),
            ),
        }
    }


    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult {
            resources: vec![
                RawResource::new(CONFIG_RESOURCE_URI, "smartnotes-config".to_string())
                    .no_annotation(),
            ],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        match uri.as_str() {
            CONFIG_RESOURCE_URI => {
                let content = Self::result_to_json(self.config_resource())?;
                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(content, uri)],
                })
            }
            _ => Err(McpError::resource_not_found(
                format!("Unknown resource: {}", uri),
                Some(json!({ "uri": uri })),
            )),
        }
    }
}


pub async fn run_server() -> anyhow::Result<()> {
    info!("🚀 Initializing SmartNotes MCP Server...");

    let config = match std::env::var("NOTES_CONFIG") {
        Ok(path) => NotesConfig::load(Some(Path::new(&path)))?,
        Err(_) => {
            let config = NotesConfig::from_env();
            config.validate()?;
            config
        }
    };

    let store = Arc::new(InMemoryNoteStore::new());
    let service = NoteService::from_config(&config, store)?;

    info!("✅ SmartNotes MCP Server ready");
    info!("   🤖 LLM: {}/{}", config.llm_provider, config.llm_model);
    info!(
        "   🔎 Query expansion: {}",
        if config.expansion_enabled { "on" } else { "off" }
    );

    let server = SmartNotesMcpServer::new(service, config);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}

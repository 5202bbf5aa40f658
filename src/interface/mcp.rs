//! MCP Server for book-catalog-mcp
//!
//! MCP Protocol (stdio) <-> application::LibraryService
//!
//! 5 tools: book_add, book_delete, book_find, book_list, book_status

use std::path::PathBuf;

use rmcp::{
    handler::server::{tool::ToolCallContext, tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
    transport::stdio,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::application::error::AppError;
use crate::application::listing::{render_books, EMPTY_LIBRARY, NO_MATCHES};
use crate::application::service::LibraryService;
use crate::domain::error::DomainError;
use crate::domain::model::book::Status;
use crate::domain::model::id::BookId;
use crate::domain::model::library::SearchField;
use crate::infra::json_store::JsonLibraryRepository;

// =============================================================================
// Public entry point
// =============================================================================

/// MCP Serverを起動する。library_pathはバックファイル。
pub async fn run(library_path: PathBuf) -> anyhow::Result<()> {
    let server = CatalogMcpServer::new(library_path);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

// =============================================================================
// MCP Server
// =============================================================================

#[derive(Clone)]
struct CatalogMcpServer {
    library_path: PathBuf,
    tool_router: ToolRouter<Self>,
}

impl CatalogMcpServer {
    fn new(library_path: PathBuf) -> Self {
        Self {
            library_path,
            tool_router: Self::tool_router(),
        }
    }

    /// 呼び出しごとに新しいServiceを作る（長寿命のファイルハンドルは持たない）。
    fn service(&self) -> LibraryService<JsonLibraryRepository> {
        LibraryService::new(JsonLibraryRepository::new(&self.library_path))
    }

    fn to_mcp_error(e: AppError) -> McpError {
        match e {
            AppError::Domain(DomainError::InvalidField(_))
            | AppError::Domain(DomainError::InvalidStatus(_))
            | AppError::Domain(DomainError::NotFound(_)) => {
                McpError::invalid_params(format!("{e}"), None)
            }
            other => McpError::internal_error(format!("{other}"), None),
        }
    }
}

// =============================================================================
// ServerHandler impl
// =============================================================================

impl ServerHandler for CatalogMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "book-catalog-mcp".to_string(),
                title: Some("Book Catalog MCP — Personal Library".to_string()),
                description: Some(
                    "Personal book catalog stored in a single JSON file. \
                     Add, delete, search, list and lend books."
                        .to_string(),
                ),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Manage a personal library catalog.\n\
                 \n\
                 Tools: `book_list` to see every book with its id, `book_find` to search by \
                 title, author or year, `book_add` to register a book, `book_status` to mark a \
                 book as lent ('выдана') or available ('в наличии'), `book_delete` to remove one."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool_ctx = ToolCallContext::new(self, request, context);
        self.tool_router.call(tool_ctx).await
    }
}

// =============================================================================
// Request types
// =============================================================================

fn parse_book_id(n: u64) -> Result<BookId, McpError> {
    BookId::new(n).ok_or_else(|| {
        McpError::invalid_params(format!("Invalid id: {n}. Ids are positive integers."), None)
    })
}

fn parse_search_field(s: Option<&str>) -> Result<SearchField, McpError> {
    match s {
        None => Ok(SearchField::default()),
        Some(token) => token.trim().parse().map_err(|_| {
            McpError::invalid_params(
                format!("Unknown search field: '{token}'. Use: title, author, year"),
                None,
            )
        }),
    }
}

fn parse_status(s: &str) -> Result<Status, McpError> {
    s.trim().parse().map_err(|_| {
        McpError::invalid_params(
            format!("Unknown status: '{s}'. Use: 'в наличии' (available) or 'выдана' (lent)"),
            None,
        )
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpBookAddRequest {
    #[schemars(description = "Book title")]
    pub title: String,
    #[schemars(description = "Author name")]
    pub author: String,
    #[schemars(description = "Publication year (integer)")]
    pub year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpBookDeleteRequest {
    #[schemars(description = "Book id from `book_list` output")]
    pub id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpBookFindRequest {
    #[schemars(description = "Text to search for (case-insensitive substring)")]
    pub query: String,
    #[schemars(description = "Field to search: title (default), author or year")]
    pub by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpBookListRequest {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpBookStatusRequest {
    #[schemars(description = "Book id from `book_list` output")]
    pub id: u64,
    #[schemars(
        description = "New status: 'в наличии' / 'available' or 'выдана' / 'lent'"
    )]
    pub status: String,
}

// =============================================================================
// Tool implementations
// =============================================================================

#[tool_router]
impl CatalogMcpServer {
    #[tool(
        name = "book_add",
        description = "Add a book to the library. The new book is available and gets the next free id.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_add(
        &self,
        Parameters(req): Parameters<McpBookAddRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = self
            .service()
            .add_book(&req.title, &req.author, req.year)
            .map_err(Self::to_mcp_error)?;

        Ok(CallToolResult::success(vec![Content::text(format!(
            "Book '{}' added. Its id: {}",
            req.title, id
        ))]))
    }

    #[tool(
        name = "book_delete",
        description = "Delete a book by id. Deleting an id that does not exist is not an error.",
        annotations(
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn book_delete(
        &self,
        Parameters(req): Parameters<McpBookDeleteRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = parse_book_id(req.id)?;
        self.service()
            .delete_book(id)
            .map_err(Self::to_mcp_error)?;

        Ok(CallToolResult::success(vec![Content::text(format!(
            "Book with id {id} deleted"
        ))]))
    }

    #[tool(
        name = "book_find",
        description = "Search books by title, author or year (case-insensitive substring match).",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_find(
        &self,
        Parameters(req): Parameters<McpBookFindRequest>,
    ) -> Result<CallToolResult, McpError> {
        let field = parse_search_field(req.by.as_deref())?;
        let books = self
            .service()
            .find_books_by(&req.query, field)
            .map_err(Self::to_mcp_error)?;

        Ok(CallToolResult::success(vec![Content::text(render_books(
            &books, NO_MATCHES,
        ))]))
    }

    #[tool(
        name = "book_list",
        description = "List every book in the library in insertion order.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_list(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpBookListRequest>,
    ) -> Result<CallToolResult, McpError> {
        let books = self.service().list_books().map_err(Self::to_mcp_error)?;

        Ok(CallToolResult::success(vec![Content::text(render_books(
            &books,
            EMPTY_LIBRARY,
        ))]))
    }

    #[tool(
        name = "book_status",
        description = "Change a book's loan status ('в наличии' = available, 'выдана' = lent).",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn book_status(
        &self,
        Parameters(req): Parameters<McpBookStatusRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = parse_book_id(req.id)?;
        let status = parse_status(&req.status)?;

        match self.service().update_status(id, status) {
            Ok(()) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Status of book {id} changed to '{status}'"
            ))])),
            Err(e) if e.is_not_found() => Ok(CallToolResult::error(vec![Content::text(
                format!("Book with id {id} not found"),
            )])),
            Err(e) => Err(Self::to_mcp_error(e)),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;

    #[test]
    fn server_info() {
        let server = CatalogMcpServer::new(PathBuf::from("/tmp/test-library.json"));
        let info = server.get_info();
        assert_eq!(info.server_info.name, "book-catalog-mcp");
        assert!(!info.server_info.version.is_empty());
    }

    #[test]
    fn all_tools_registered() {
        let server = CatalogMcpServer::new(PathBuf::from("/tmp/test-library.json"));
        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            ["book_add", "book_delete", "book_find", "book_list", "book_status"]
        );
    }

    #[test]
    fn add_request_parse() {
        let req: McpBookAddRequest =
            serde_json::from_str(r#"{"title": "Dune", "author": "Herbert", "year": 1965}"#)
                .unwrap();
        assert_eq!(req.title, "Dune");
        assert_eq!(req.year, 1965);
    }

    #[test]
    fn find_request_without_field() {
        let req: McpBookFindRequest = serde_json::from_str(r#"{"query": "dune"}"#).unwrap();
        assert!(req.by.is_none());
        assert_eq!(
            parse_search_field(req.by.as_deref()).unwrap(),
            SearchField::Title
        );
    }

    #[test]
    fn search_field_validation() {
        assert_eq!(parse_search_field(Some("year")).unwrap(), SearchField::Year);
        assert!(parse_search_field(Some("isbn")).is_err());
    }

    #[test]
    fn status_validation() {
        assert_eq!(parse_status("выдана").unwrap(), Status::Lent);
        assert_eq!(parse_status("available").unwrap(), Status::Available);
        assert_eq!(parse_status(" выдана ").unwrap(), Status::Lent);
        assert!(parse_status("lost").is_err());
    }

    #[test]
    fn zero_id_rejected() {
        assert!(parse_book_id(0).is_err());
        assert_eq!(parse_book_id(3).unwrap().get(), 3);
    }

    #[test]
    fn domain_errors_map_to_invalid_params() {
        let err = CatalogMcpServer::to_mcp_error(AppError::Domain(DomainError::InvalidField(
            "isbn".into(),
        )));
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("isbn"));

        let missing = BookId::new(9).unwrap();
        let err = CatalogMcpServer::to_mcp_error(AppError::Domain(DomainError::NotFound(missing)));
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("book not found: 9"));

        let err = CatalogMcpServer::to_mcp_error(AppError::Domain(DomainError::IdExhausted(
            BookId::new(u64::MAX).unwrap(),
        )));
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    }

    // =========================================================================
    // Tool handlers over a temp-dir backing file
    // =========================================================================

    fn temp_server() -> (tempfile::TempDir, CatalogMcpServer) {
        let dir = tempfile::tempdir().unwrap();
        let server = CatalogMcpServer::new(dir.path().join("library.json"));
        (dir, server)
    }

    fn text_of(result: &CallToolResult) -> String {
        serde_json::to_string(result).unwrap()
    }

    async fn add_dune(server: &CatalogMcpServer) {
        let req = McpBookAddRequest {
            title: "Dune".into(),
            author: "Herbert".into(),
            year: 1965,
        };
        let result = server.book_add(Parameters(req)).await.unwrap();
        assert!(text_of(&result).contains("Its id: 1"));
    }

    #[tokio::test]
    async fn status_of_missing_book_is_tool_error() {
        let (dir, server) = temp_server();
        add_dune(&server).await;
        let path = dir.path().join("library.json");
        let before = std::fs::read(&path).unwrap();

        let req = McpBookStatusRequest {
            id: 42,
            status: "выдана".into(),
        };
        let result = server.book_status(Parameters(req)).await.unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).contains("Book with id 42 not found"));
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn status_change_is_saved() {
        let (dir, server) = temp_server();
        add_dune(&server).await;

        let req = McpBookStatusRequest {
            id: 1,
            status: " lent ".into(),
        };
        let result = server.book_status(Parameters(req)).await.unwrap();
        assert_ne!(result.is_error, Some(true));
        let content = std::fs::read_to_string(dir.path().join("library.json")).unwrap();
        assert!(content.contains("\"status\": \"выдана\""));
    }

    #[tokio::test]
    async fn find_with_unknown_field_is_invalid_params() {
        let (_dir, server) = temp_server();
        add_dune(&server).await;

        let req = McpBookFindRequest {
            query: "dune".into(),
            by: Some("isbn".into()),
        };
        let err = server.book_find(Parameters(req)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("isbn"));
    }

    #[tokio::test]
    async fn delete_with_zero_id_is_rejected() {
        let (dir, server) = temp_server();
        add_dune(&server).await;
        let path = dir.path().join("library.json");
        let before = std::fs::read(&path).unwrap();

        let err = server
            .book_delete(Parameters(McpBookDeleteRequest { id: 0 }))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn list_on_missing_file_reports_empty() {
        let (dir, server) = temp_server();
        let result = server
            .book_list(Parameters(McpBookListRequest {}))
            .await
            .unwrap();
        assert!(text_of(&result).contains("Library is empty."));
        assert!(!dir.path().join("library.json").exists());
    }
}

use std::sync::Arc;

use rmcp::{
    handler::server::{wrapper::Parameters, ServerHandler},
    model::{ErrorData, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, Json,
};
use uuid::Uuid;

use crate::{
    lib::{errors::SqlToolError, telemetry::ToolSpan},
    server::config::{ServerConfig, SqliteSection, TOOLSET_SQLITE, TOOLSET_WEATHER},
    tools::{
        self,
        sqlite::{self, ExportTableRequest, ExportTableResponse, SqlQueryRequest, SqlQueryResponse},
        weather::{self, QueryWeatherRequest, QueryWeatherResponse},
        ServerToolRouter,
    },
};

#[derive(Clone)]
pub struct ToolboxServer {
    config: Arc<ServerConfig>,
    instructions: Arc<String>,
    tool_router: ServerToolRouter<Self>,
    http: reqwest::Client,
}

impl ToolboxServer {
    pub fn new(config: ServerConfig, instructions: String) -> Self {
        let router = tools::build_router(Self::tool_router);
        Self {
            config: Arc::new(config),
            instructions: Arc::new(instructions),
            tool_router: router,
            http: reqwest::Client::new(),
        }
    }

    fn sqlite_section(&self) -> Result<&SqliteSection, ErrorData> {
        if !self.config.tools.is_enabled(TOOLSET_SQLITE) {
            return Err(tools::toolset_disabled_error(TOOLSET_SQLITE));
        }
        self.config
            .sqlite
            .as_ref()
            .ok_or_else(|| tools::toolset_disabled_error(TOOLSET_SQLITE))
    }
}

#[tool_router(router = tool_router)]
impl ToolboxServer {
    #[tool(
        name = "query_weather",
        description = "Look up the current weather for a city (English name) and return a formatted report"
    )]
    async fn query_weather(
        &self,
        Parameters(request): Parameters<QueryWeatherRequest>,
    ) -> Result<Json<QueryWeatherResponse>, ErrorData> {
        if !self.config.tools.is_enabled(TOOLSET_WEATHER) {
            return Err(tools::toolset_disabled_error(TOOLSET_WEATHER));
        }
        if let Err(err) = request.validate() {
            return Err(weather::validation_error_to_error_data(err));
        }

        let job_id = Uuid::new_v4();
        let span = ToolSpan::start(job_id, weather::WEATHER_TOOL_ID);
        match weather::fetch_weather(&self.http, &self.config.weather, request.city()).await {
            Ok(payload) => {
                span.finish("succeeded");
                Ok(Json(weather::build_response(payload)))
            }
            Err(err) => {
                span.finish("failed");
                Err(weather::runtime_error_to_error_data(err, job_id))
            }
        }
    }

    #[tool(
        name = "sql_query",
        description = "Run a SQL statement against the configured SQLite database and return rows as JSON"
    )]
    async fn sql_query(
        &self,
        Parameters(request): Parameters<SqlQueryRequest>,
    ) -> Result<Json<SqlQueryResponse>, ErrorData> {
        let section = self.sqlite_section()?.clone();
        if let Err(err) = request.validate() {
            return Err(sqlite::query_validation_error_to_error_data(err));
        }

        let job_id = Uuid::new_v4();
        let span = ToolSpan::start(job_id, sqlite::SQL_QUERY_TOOL_ID);
        let query = request.query.clone();
        let result = tokio::task::spawn_blocking(move || sqlite::run_query(&section, &query))
            .await
            .map_err(|err| {
                sqlite::runtime_error_to_error_data(
                    SqlToolError::Internal {
                        message: err.to_string(),
                    },
                    job_id,
                )
            })?;

        match result {
            Ok(response) => {
                span.finish("succeeded");
                Ok(Json(response))
            }
            Err(err) => {
                span.finish("failed");
                Err(sqlite::runtime_error_to_error_data(err, job_id))
            }
        }
    }

    #[tool(
        name = "export_table_to_csv",
        description = "Export a whole table from the configured SQLite database to a CSV file"
    )]
    async fn export_table_to_csv(
        &self,
        Parameters(request): Parameters<ExportTableRequest>,
    ) -> Result<Json<ExportTableResponse>, ErrorData> {
        let section = self.sqlite_section()?.clone();
        if let Err(err) = request.validate(&section) {
            return Err(sqlite::export_validation_error_to_error_data(err));
        }

        let job_id = Uuid::new_v4();
        let span = ToolSpan::start(job_id, sqlite::EXPORT_TOOL_ID);
        let table = request.table.clone();
        let output_file = request.output_file.clone();
        let result = tokio::task::spawn_blocking(move || {
            sqlite::run_export(&section, &table, &output_file)
        })
        .await
        .map_err(|err| {
            sqlite::runtime_error_to_error_data(
                SqlToolError::Internal {
                    message: err.to_string(),
                },
                job_id,
            )
        })?;

        match result {
            Ok(response) => {
                span.finish("succeeded");
                Ok(Json(response))
            }
            Err(err) => {
                span.finish("failed");
                Err(sqlite::runtime_error_to_error_data(err, job_id))
            }
        }
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for ToolboxServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some((*self.instructions).clone()),
            ..ServerInfo::default()
        }
    }
}

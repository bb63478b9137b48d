//! MCP tool surface.
//!
//! Three tools are exposed: `get_figma_data` (the simplified design),
//! `analyze_figma_depth` (depth profiling report), and
//! `download_figma_images`. Every failure is returned as an error-flagged
//! tool result carrying a single text line; nothing is thrown across the
//! transport boundary.

use std::future::Future;
use std::path::PathBuf;

use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::*,
    schemars,
    transport::stdio,
    tool, tool_handler, tool_router, Error as McpError, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use tracing::{error, info};

use crate::depth;
use crate::error::{FcxError, Result as FcxResult};
use crate::figma::{FigmaClient, SvgOptions};
use crate::images::{self, DownloadOptions, ImageRequest};
use crate::simplify::{remove_empty_keys, DesignPayload};

/// Responses above this size are truncated at a line boundary so one huge
/// file cannot exhaust the caller's context window.
const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

#[derive(Clone)]
pub struct FigmaMcpServer {
    client: FigmaClient,
    output_format: OutputFormat,
    skip_image_downloads: bool,
    tool_router: ToolRouter<FigmaMcpServer>,
}

#[tool_router]
impl FigmaMcpServer {
    pub fn new(client: FigmaClient, output_format: OutputFormat, skip_image_downloads: bool) -> Self {
        Self {
            client,
            output_format,
            skip_image_downloads,
            tool_router: Self::tool_router(),
        }
    }

    /// Serve over stdio until the peer disconnects.
    pub async fn run_stdio(self) -> FcxResult<()> {
        info!("starting MCP server on stdio");
        let service = self.serve(stdio()).await.map_err(|e| {
            error!("failed to start MCP service: {e:?}");
            FcxError::Config(format!("MCP stdio startup failed: {e}"))
        })?;
        service
            .waiting()
            .await
            .map_err(|e| FcxError::Config(format!("MCP service error: {e}")))?;
        Ok(())
    }

    /// Serve the streamable-HTTP transport on the given port.
    pub async fn run_http(self, port: u16) -> FcxResult<()> {
        use rmcp::transport::streamable_http_server::{
            session::local::LocalSessionManager, StreamableHttpService,
        };

        info!(port, "starting MCP server on HTTP");
        let server = self;
        let service = StreamableHttpService::new(
            move || Ok(server.clone()),
            LocalSessionManager::default().into(),
            Default::default(),
        );
        let router = axum::Router::new().nest_service("/mcp", service);
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
        axum::serve(listener, router)
            .await
            .map_err(FcxError::Io)?;
        Ok(())
    }

    #[tool(
        description = "Fetch a Figma file or node as a simplified, LLM-friendly design tree. Styles are deduplicated into globalVars; repetitive rows are collapsed with an explicit summary."
    )]
    async fn get_figma_data(
        &self,
        Parameters(GetFigmaDataRequest {
            file_key,
            node_id,
            depth,
        }): Parameters<GetFigmaDataRequest>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let design = match &node_id {
            Some(node_id) => self.client.get_node(&file_key, node_id, depth).await,
            None => self.client.get_file(&file_key, depth).await,
        };

        let design = match design {
            Ok(design) => design,
            Err(err) => return tool_error(err.user_message()),
        };

        match self.render_payload(design.into_payload()) {
            Ok(text) => tool_success(truncate_response(text)),
            Err(err) => tool_error(err.user_message()),
        }
    }

    #[tool(
        description = "Profile a Figma file's depth before fetching it: node counts, estimated size per depth, and a recommended depth parameter for get_figma_data."
    )]
    async fn analyze_figma_depth(
        &self,
        Parameters(AnalyzeDepthRequest { file_key, node_id }): Parameters<AnalyzeDepthRequest>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let raw = match self.client.get_raw_file(&file_key, node_id.as_deref()).await {
            Ok(raw) => raw,
            Err(err) => return tool_error(err.user_message()),
        };

        let analysis = depth::analyze(&raw);
        tool_success(depth::render_report(&analysis))
    }

    #[tool(
        description = "Download images for the given nodes: image fills by imageRef, renders as PNG or SVG by file extension. Writes into localPath and returns the written paths."
    )]
    async fn download_figma_images(
        &self,
        Parameters(DownloadImagesRequest {
            file_key,
            nodes,
            local_path,
            png_scale,
            svg_options,
        }): Parameters<DownloadImagesRequest>,
    ) -> std::result::Result<CallToolResult, McpError> {
        if self.skip_image_downloads {
            return tool_error(
                "image downloads are disabled on this server (--skip-image-downloads)".to_string(),
            );
        }

        let requests: Vec<ImageRequest> = nodes
            .into_iter()
            .map(|node| ImageRequest {
                node_id: node.node_id,
                image_ref: node.image_ref,
                file_name: node.file_name,
            })
            .collect();

        let mut options = DownloadOptions::default();
        if let Some(scale) = png_scale {
            options.png_scale = scale;
        }
        if let Some(svg) = svg_options {
            options.svg = SvgOptions {
                outline_text: svg.outline_text.unwrap_or(options.svg.outline_text),
                include_id: svg.include_id.unwrap_or(options.svg.include_id),
                simplify_stroke: svg.simplify_stroke.unwrap_or(options.svg.simplify_stroke),
            };
        }

        let written = match images::download_images(
            &self.client,
            &file_key,
            &requests,
            &PathBuf::from(&local_path),
            &options,
        )
        .await
        {
            Ok(written) => written,
            Err(err) => return tool_error(err.user_message()),
        };

        let listing: Vec<String> = written
            .iter()
            .map(|path| path.display().to_string())
            .collect();
        tool_success(format!(
            "Downloaded {} file(s):\n{}",
            listing.len(),
            listing.join("\n")
        ))
    }

    fn render_payload(&self, payload: DesignPayload) -> FcxResult<String> {
        let mut value = serde_json::to_value(&payload)?;
        remove_empty_keys(&mut value);
        match self.output_format {
            OutputFormat::Yaml => Ok(serde_yaml::to_string(&value)?),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&value)?),
        }
    }
}

#[tool_handler]
impl ServerHandler for FigmaMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            server_info: Implementation::from_build_env(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Figma Context MCP server: fetch simplified Figma design data with \
                 get_figma_data, gauge how deep to fetch with analyze_figma_depth, and \
                 pull assets with download_figma_images."
                    .into(),
            ),
        }
    }
}

// Parameter structs for the MCP tools.

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
struct GetFigmaDataRequest {
    #[schemars(description = "The Figma file key from the file URL")]
    pub file_key: String,
    #[schemars(description = "Optional node id (1:23 or 1-23 form) to fetch a single subtree")]
    pub node_id: Option<String>,
    #[schemars(
        description = "Maximum output tree depth; deeper content is replaced by DEPTH_LIMIT placeholders"
    )]
    pub depth: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
struct AnalyzeDepthRequest {
    #[schemars(description = "The Figma file key from the file URL")]
    pub file_key: String,
    #[schemars(description = "Optional node id to profile a single subtree")]
    pub node_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ImageNodeRequest {
    #[schemars(description = "Node id the image belongs to")]
    pub node_id: String,
    #[schemars(description = "imageRef of an image fill; omit for render exports")]
    pub image_ref: Option<String>,
    #[schemars(description = "Target file name; .svg renders as SVG, anything else as PNG")]
    pub file_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
struct SvgOptionsRequest {
    pub outline_text: Option<bool>,
    pub include_id: Option<bool>,
    pub simplify_stroke: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
struct DownloadImagesRequest {
    #[schemars(description = "The Figma file key from the file URL")]
    pub file_key: String,
    #[schemars(description = "Images to download")]
    pub nodes: Vec<ImageNodeRequest>,
    #[schemars(description = "Directory the files are written into")]
    pub local_path: String,
    #[schemars(description = "Export scale for PNG renders (default 2)")]
    pub png_scale: Option<f64>,
    pub svg_options: Option<SvgOptionsRequest>,
}

fn tool_success(text: String) -> std::result::Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn tool_error(message: String) -> std::result::Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(message)]))
}

/// Cut an oversized payload at a line boundary and append a notice.
fn truncate_response(mut text: String) -> String {
    if text.len() <= MAX_RESPONSE_BYTES {
        return text;
    }
    let original = text.len();
    let mut cut = MAX_RESPONSE_BYTES;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let boundary = text[..cut].rfind('\n').unwrap_or(cut);
    text.truncate(boundary);
    text.push_str(&format!(
        "\n... [truncated: response was {original} bytes; refine with depth or nodeId]"
    ));
    text
}

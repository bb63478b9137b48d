//! Figma Context MCP (fcx) Library
//!
//! A Model-Context-Protocol server exposing the Figma REST API to coding
//! agents. The core is the design-graph simplification engine: it ingests
//! raw Figma document trees and emits a compact, CSS-flavored representation
//! with deduplicated styles and collapsed repetition, sized for an LLM
//! context window.
//!
//! # Module Overview
//!
//! - [`figma`] - Figma REST client and raw response types
//! - [`fetch`] - HTTP JSON fetch with a curl fallback
//! - [`simplify`] - the simplification engine (traversal, interner,
//!   signatures, transformers)
//! - [`depth`] - depth profiling and the analysis report
//! - [`images`] - image download partitioning and writes
//! - [`server`] - the MCP tool surface
//! - [`error`] - crate error taxonomy
//!
//! # Example
//!
//! ```no_run
//! use fcx_lib::{FigmaAuth, FigmaClient};
//!
//! # async fn example() -> fcx_lib::Result<()> {
//! let client = FigmaClient::new(FigmaAuth::PersonalAccessToken("token".into()))?;
//! let design = client.get_file("FILE_KEY", Some(3)).await?;
//! println!("{} top-level nodes", design.nodes.len());
//! # Ok(())
//! # }
//! ```

pub mod depth;
pub mod error;
pub mod fetch;
pub mod figma;
pub mod images;
pub mod server;
pub mod simplify;

pub use depth::{analyze, render_report, DepthAnalysis};
pub use error::{FcxError, Result};
pub use fetch::RetryingFetcher;
pub use figma::{
    normalize_node_id, FigmaAuth, FigmaClient, RawNode, RawResponse, RenderFormat, SvgOptions,
};
pub use images::{download_images, DownloadOptions, ImageRequest};
pub use server::{FigmaMcpServer, OutputFormat};
pub use simplify::{
    parse_response, remove_empty_keys, DesignPayload, GlobalVars, SimplifiedDesign,
    SimplifiedNode, StyleSlot, StyleValue,
};

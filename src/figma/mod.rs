//! Figma REST API integration.
//!
//! - [`client::FigmaClient`] - authenticated HTTP access to the two document
//!   endpoints plus the image URL tables
//! - [`api_types`] - raw response types, schema-flexible by design

pub mod api_types;
pub mod client;

pub use api_types::{RawNode, RawResponse};
pub use client::{normalize_node_id, FigmaAuth, FigmaClient, RenderFormat, SvgOptions};

//! Figma REST API client.

use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::info;
use url::Url;

use crate::error::{FcxError, Result};
use crate::fetch::RetryingFetcher;
use crate::simplify::{self, SimplifiedDesign};

use super::api_types::{
    ImageFillsResponse, ImageRenderResponse, RawNode, RawResponse,
};

const DEFAULT_BASE_URL: &str = "https://api.figma.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How many wire levels past the requested depth to fetch, so wrapper
/// elision can still inspect one extra layer before the simplifier clamps.
const DEPTH_BUFFER: u32 = 2;
/// Upstream cap on the depth query parameter.
const MAX_WIRE_DEPTH: u32 = 10;

#[derive(Debug, Clone)]
pub enum FigmaAuth {
    PersonalAccessToken(String),
    OAuthToken(String),
}

impl FigmaAuth {
    pub fn from_env() -> Option<Self> {
        if let Ok(token) = std::env::var("FIGMA_API_KEY") {
            if !token.is_empty() {
                return Some(Self::PersonalAccessToken(token));
            }
        }

        if let Ok(token) = std::env::var("FIGMA_OAUTH_TOKEN") {
            if !token.is_empty() {
                return Some(Self::OAuthToken(token));
            }
        }

        None
    }

    fn headers(&self) -> Vec<(String, String)> {
        match self {
            FigmaAuth::PersonalAccessToken(token) => {
                vec![("X-Figma-Token".to_string(), token.clone())]
            }
            FigmaAuth::OAuthToken(token) => {
                vec![("Authorization".to_string(), format!("Bearer {token}"))]
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FigmaClient {
    fetcher: RetryingFetcher,
    http: reqwest::Client,
    auth: FigmaAuth,
    base_url: Url,
}

impl FigmaClient {
    pub fn new(auth: FigmaAuth) -> Result<Self> {
        Self::with_base_url(auth, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(auth: FigmaAuth, base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(FcxError::Network)?;

        Ok(Self {
            fetcher: RetryingFetcher::new()?,
            http,
            auth,
            base_url,
        })
    }

    /// Fetch and simplify a whole file.
    pub async fn get_file(&self, file_key: &str, depth: Option<u32>) -> Result<SimplifiedDesign> {
        let url = self.file_url(file_key, depth)?;
        info!(file_key, ?depth, "fetching Figma file");
        let raw: RawResponse = self.fetch(url).await?;
        validate_response(&raw)?;
        Ok(simplify::parse_response(&raw, depth))
    }

    /// Fetch and simplify a single node subtree.
    pub async fn get_node(
        &self,
        file_key: &str,
        node_id: &str,
        depth: Option<u32>,
    ) -> Result<SimplifiedDesign> {
        let url = self.nodes_url(file_key, node_id, depth)?;
        info!(file_key, node_id, ?depth, "fetching Figma node");
        let raw: RawResponse = self.fetch(url).await?;
        validate_response(&raw)?;
        Ok(simplify::parse_response(&raw, depth))
    }

    /// Fetch the raw (unsimplified) response, as consumed by the depth
    /// analyzer.
    pub async fn get_raw_file(&self, file_key: &str, node_id: Option<&str>) -> Result<RawResponse> {
        let url = match node_id {
            Some(node_id) => self.nodes_url(file_key, node_id, None)?,
            None => self.file_url(file_key, None)?,
        };
        let raw: RawResponse = self.fetch(url).await?;
        validate_response(&raw)?;
        Ok(raw)
    }

    /// Image-fill URL table for a file: `imageRef` to a downloadable URL.
    pub async fn get_image_fill_urls(&self, file_key: &str) -> Result<HashMap<String, String>> {
        let url = self.endpoint(&format!("/v1/files/{file_key}/images"))?;
        let response: ImageFillsResponse = self.fetch(url).await?;
        Ok(response.meta.images)
    }

    /// Request renders for the given nodes, returning node id to URL.
    /// Nodes the upstream could not render come back with a null URL and are
    /// filtered out here.
    pub async fn get_render_urls(
        &self,
        file_key: &str,
        node_ids: &[String],
        format: RenderFormat,
    ) -> Result<HashMap<String, String>> {
        if node_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<String> = node_ids.iter().map(|id| normalize_node_id(id)).collect();
        let mut url = self.endpoint(&format!("/v1/images/{file_key}"))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("ids", &ids.join(","));
            match &format {
                RenderFormat::Png { scale } => {
                    query.append_pair("format", "png");
                    query.append_pair("scale", &scale.to_string());
                }
                RenderFormat::Svg { options } => {
                    query.append_pair("format", "svg");
                    query.append_pair("svg_outline_text", bool_str(options.outline_text));
                    query.append_pair("svg_include_id", bool_str(options.include_id));
                    query.append_pair("svg_simplify_stroke", bool_str(options.simplify_stroke));
                }
            }
        }

        let response: ImageRenderResponse = self.fetch(url).await?;
        if let Some(message) = response.err {
            return Err(FcxError::api(None, message));
        }

        Ok(response
            .images
            .into_iter()
            .filter_map(|(id, url)| url.map(|url| (id, url)))
            .collect())
    }

    /// Download raw bytes from a (pre-signed) image URL.
    pub async fn download_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(url).send().await.map_err(FcxError::Network)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FcxError::api(Some(status), body));
        }
        Ok(response.bytes().await.map_err(FcxError::Network)?.to_vec())
    }

    fn file_url(&self, file_key: &str, depth: Option<u32>) -> Result<Url> {
        let mut url = self.endpoint(&format!("/v1/files/{file_key}"))?;
        if let Some(depth) = depth {
            url.query_pairs_mut()
                .append_pair("depth", &wire_depth(depth).to_string());
        }
        Ok(url)
    }

    fn nodes_url(&self, file_key: &str, node_id: &str, depth: Option<u32>) -> Result<Url> {
        let mut url = self.endpoint(&format!("/v1/files/{file_key}/nodes"))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("ids", &normalize_node_id(node_id));
            if let Some(depth) = depth {
                query.append_pair("depth", &wire_depth(depth).to_string());
            }
        }
        Ok(url)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(FcxError::InvalidUrl)
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let value = self
            .fetcher
            .fetch_json(url.as_str(), &self.auth.headers())
            .await?;
        serde_json::from_value(value)
            .map_err(|e| FcxError::malformed(format!("unexpected response shape: {e}")))
    }
}

/// Wire depth carries a buffer past the caller's budget so wrapper elision
/// still sees one layer beyond the clamp; the simplifier truncates at the
/// exact budget.
fn wire_depth(depth: u32) -> u32 {
    (depth + DEPTH_BUFFER).min(MAX_WIRE_DEPTH)
}

/// Accept the `1-23` form Figma URLs carry and convert to the `1:23` wire
/// form.
pub fn normalize_node_id(node_id: &str) -> String {
    node_id.replace('-', ":")
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn validate_response(raw: &RawResponse) -> Result<()> {
    match raw {
        RawResponse::File(file) => validate_root(&file.document),
        RawResponse::Nodes(response) => {
            for entry in response.nodes.values() {
                validate_root(&entry.document)?;
            }
            Ok(())
        }
    }
}

fn validate_root(node: &RawNode) -> Result<()> {
    if node.id.is_empty() || node.node_type.is_empty() {
        return Err(FcxError::malformed(
            "root node lacks the minimal id/name/type shape".to_string(),
        ));
    }
    Ok(())
}

/// Render export format for the images endpoint.
#[derive(Debug, Clone, Copy)]
pub enum RenderFormat {
    Png { scale: f64 },
    Svg { options: SvgOptions },
}

#[derive(Debug, Clone, Copy)]
pub struct SvgOptions {
    pub outline_text: bool,
    pub include_id: bool,
    pub simplify_stroke: bool,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            outline_text: true,
            include_id: false,
            simplify_stroke: true,
        }
    }
}

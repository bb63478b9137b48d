//! Image download orchestration for the `download_figma_images` tool.
//!
//! Requests split into two upstream lookups: nodes carrying an `imageRef`
//! resolve through the file's image-fill table, everything else is rendered
//! through the export endpoint, with the requested file extension picking
//! PNG or SVG. Downloads run concurrently; a failed download drops that one
//! file from the returned list.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use futures::future::join_all;
use tracing::warn;

use crate::error::Result;
use crate::figma::{FigmaClient, RenderFormat, SvgOptions};

/// One requested image, as supplied by the tool caller.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub node_id: String,
    /// Set for image fills; render requests leave it empty.
    pub image_ref: Option<String>,
    pub file_name: String,
}

#[derive(Debug, Clone, Copy)]
pub struct DownloadOptions {
    pub png_scale: f64,
    pub svg: SvgOptions,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            png_scale: 2.0,
            svg: SvgOptions::default(),
        }
    }
}

/// Resolve URLs for every request, download them, and write the bytes under
/// `local_path`. Returns the paths actually written.
pub async fn download_images(
    client: &FigmaClient,
    file_key: &str,
    requests: &[ImageRequest],
    local_path: &Path,
    options: &DownloadOptions,
) -> Result<Vec<PathBuf>> {
    if requests.is_empty() {
        return Ok(Vec::new());
    }

    tokio::fs::create_dir_all(local_path).await?;

    let partitioned = partition(requests);
    let mut downloads: Vec<(String, PathBuf)> = Vec::new();

    if !partitioned.fills.is_empty() {
        let fill_urls = client.get_image_fill_urls(file_key).await?;
        for request in &partitioned.fills {
            let image_ref = request.image_ref.as_deref().unwrap_or_default();
            match fill_urls.get(image_ref) {
                Some(url) => {
                    downloads.push((url.clone(), local_path.join(&request.file_name)));
                }
                None => warn!(image_ref, "no fill URL for requested imageRef"),
            }
        }
    }

    for (requests, format) in [
        (
            &partitioned.png,
            RenderFormat::Png {
                scale: options.png_scale,
            },
        ),
        (
            &partitioned.svg,
            RenderFormat::Svg {
                options: options.svg,
            },
        ),
    ] {
        if requests.is_empty() {
            continue;
        }
        let ids: Vec<String> = requests.iter().map(|r| r.node_id.clone()).collect();
        let render_urls = client.get_render_urls(file_key, &ids, format).await?;
        for request in requests {
            match lookup_render_url(&render_urls, &request.node_id) {
                Some(url) => {
                    downloads.push((url.clone(), local_path.join(&request.file_name)));
                }
                None => warn!(node_id = %request.node_id, "upstream returned no render URL"),
            }
        }
    }

    let results = join_all(
        downloads
            .into_iter()
            .map(|(url, path)| fetch_one(client, url, path)),
    )
    .await;

    Ok(results.into_iter().flatten().collect())
}

async fn fetch_one(client: &FigmaClient, url: String, path: PathBuf) -> Option<PathBuf> {
    let bytes = match client.download_bytes(&url).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "image download failed");
            return None;
        }
    };
    if let Err(err) = tokio::fs::write(&path, &bytes).await {
        warn!(path = %path.display(), error = %err, "image write failed");
        return None;
    }
    Some(path)
}

/// The render table keys by canonical (`:`-separated) node ids; tolerate
/// callers passing the dashed URL form.
fn lookup_render_url<'a>(urls: &'a HashMap<String, String>, node_id: &str) -> Option<&'a String> {
    urls.get(node_id)
        .or_else(|| urls.get(&crate::figma::normalize_node_id(node_id)))
}

struct Partitioned<'a> {
    fills: Vec<&'a ImageRequest>,
    png: Vec<&'a ImageRequest>,
    svg: Vec<&'a ImageRequest>,
}

fn partition(requests: &[ImageRequest]) -> Partitioned<'_> {
    let mut out = Partitioned {
        fills: Vec::new(),
        png: Vec::new(),
        svg: Vec::new(),
    };
    for request in requests {
        if request.image_ref.as_deref().is_some_and(|r| !r.is_empty()) {
            out.fills.push(request);
        } else if extension(&request.file_name) == Some("svg".to_string()) {
            out.svg.push(request);
        } else {
            out.png.push(request);
        }
    }
    out
}

fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

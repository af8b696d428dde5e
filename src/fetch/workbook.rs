// src/fetch/workbook.rs
use anyhow::{Context, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;
use url::Url;

use super::with_default_retry;

/// Download the workbook at `url` into `dest_dir` under its published
/// filename. Returns the saved path.
pub async fn download_workbook(
    client: &Client,
    url: &Url,
    dest_dir: impl AsRef<Path>,
) -> Result<PathBuf> {
    let dest_path = dest_dir.as_ref().join(workbook_filename(url));

    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let bytes = with_default_retry(url, || get_bytes_core(client, url)).await?;

    // same directory, so the rename cannot cross filesystems
    let tmp = dest_path.with_extension("part");
    fs::write(&tmp, &bytes).await?;
    fs::rename(&tmp, &dest_path).await?;

    info!(%url, path = %dest_path.display(), bytes = bytes.len(), "downloaded workbook");
    Ok(dest_path)
}

async fn get_bytes_core(client: &Client, url: &Url) -> Result<Vec<u8>> {
    let body = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .bytes()
        .await
        .with_context(|| format!("Reading body from {}", url))?;
    Ok(body.to_vec())
}

/// ONS serves files as `/file?uri=/.../name.xlsx`; take the name from the
/// `uri` parameter when present, otherwise from the last path segment.
pub fn workbook_filename(url: &Url) -> String {
    let from_query = url
        .query_pairs()
        .find(|(k, _)| k == "uri")
        .and_then(|(_, v)| v.rsplit('/').next().map(str::to_string));
    let from_path = || {
        url.path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string)
    };
    from_query
        .or_else(from_path)
        .filter(|name| !name.is_empty() && name != "file")
        .unwrap_or_else(|| "workbook.xlsx".to_string())
}

// src/fetch/mod.rs
pub mod landing;
pub mod workbook;

pub use landing::{fetch_dataset_page, parse_dataset_page, DatasetPage};
pub use workbook::download_workbook;

use anyhow::Result;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, warn};
use url::Url;

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 500;

/// HTTP client shared by the landing-page scrape and the download.
pub fn build_client() -> Result<Client> {
    Ok(Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .cookie_store(true)
        .gzip(true)
        .timeout(Duration::from_secs(120))
        .build()?)
}

/// Run `request` until it succeeds, doubling the delay after each failure.
pub async fn with_retry<T, F, Fut>(
    url: &Url,
    max_retries: u32,
    initial_backoff_ms: u64,
    mut request: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempts = 0;
    loop {
        match request().await {
            Ok(t) => return Ok(t),
            Err(e) if attempts < max_retries => {
                attempts += 1;
                let backoff = initial_backoff_ms * 2u64.pow(attempts - 1);
                warn!(%url, attempt = attempts, delay_ms = backoff, error = %e, "Retrying");
                sleep(Duration::from_millis(backoff)).await;
            }
            Err(e) => {
                error!(%url, error = %e, "Exhausted retries");
                return Err(e);
            }
        }
    }
}

/// `with_retry` with the default attempt budget.
pub async fn with_default_retry<T, F, Fut>(url: &Url, request: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    with_retry(url, MAX_RETRIES, INITIAL_BACKOFF_MS, request).await
}

use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::{stream, StreamExt};
use thiserror::Error;
use unfurl_discussions::page_title::resolve_preview_title;
use unfurl_discussions::unfurl_footer::LinkPreview;

#[derive(Debug, Error)]
/// Failure to turn one URL into a preview. Never fatal for a run.
///
/// An error status is not a failure: error pages still carry a title.
pub enum PageFetchError {
    #[error("request failed: {0}")]
    Http(#[source] reqwest::Error),
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

#[derive(Clone)]
pub(super) struct PageFetcher {
    http: reqwest::Client,
    max_page_bytes: usize,
}

impl PageFetcher {
    pub(super) fn new(user_agent: &str, timeout_ms: u64, max_page_bytes: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_millis(timeout_ms.max(1)))
            .build()
            .context("failed to create page fetch client")?;
        Ok(Self {
            http: client,
            max_page_bytes: max_page_bytes.max(1),
        })
    }

    pub(super) async fn fetch_html(&self, url: &str) -> Result<String, PageFetchError> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(PageFetchError::Http)?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url, status = status.as_u16(), "unfurling error page body");
        }

        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(PageFetchError::Body)?;
            let remaining = self.max_page_bytes.saturating_sub(body.len());
            if chunk.len() >= remaining {
                body.extend_from_slice(&chunk[..remaining]);
                break;
            }
            body.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    pub(super) async fn fetch_preview(&self, url: &str) -> Result<LinkPreview, PageFetchError> {
        let html = self.fetch_html(url).await?;
        let title = resolve_preview_title(&html, url);
        Ok(LinkPreview::new(title, url))
    }

    /// Resolve previews in appearance order; failed URLs are logged and dropped.
    pub(super) async fn fetch_previews(
        &self,
        urls: &[String],
        concurrency: usize,
    ) -> Vec<LinkPreview> {
        stream::iter(urls)
            .map(|url| async move { (url, self.fetch_preview(url).await) })
            .buffered(concurrency.max(1))
            .filter_map(|(url, result)| async move {
                match result {
                    Ok(preview) => {
                        tracing::debug!(url = %url, title = %preview.title, "resolved preview");
                        Some(preview)
                    }
                    Err(error) => {
                        tracing::warn!(url = %url, error = %error, "failed to unfurl url");
                        None
                    }
                }
            })
            .collect()
            .await
    }
}

// ABOUTME: HTTP client for downloading remote images before display
// ABOUTME: Implements timeouts, redirect and size limits, and a progress bar on stderr

use crate::config::DEFAULT_MAX_DOWNLOAD_BYTES;
use anyhow::{anyhow, Result};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::io::IsTerminal;
use std::time::Duration;
use url::Url;

const TIMEOUT: Duration = Duration::from_secs(30);
const MAX_REDIRECTS: usize = 3;

/// Parse `url` and allow only http and https
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| anyhow!("Invalid URL '{}': {}", url, e))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(anyhow!("Unsupported URL scheme '{}': {}", scheme, url)),
    }

    if parsed.host_str().is_none() {
        return Err(anyhow!("URL missing host: {}", url));
    }

    Ok(parsed)
}

pub struct ImageDownloader {
    client: Client,
    max_bytes: u64,
    show_progress: bool,
}

impl ImageDownloader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!("imgcat/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            max_bytes: DEFAULT_MAX_DOWNLOAD_BYTES,
            show_progress: std::io::stderr().is_terminal(),
        })
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Progress is only ever drawn when stderr is a terminal
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress && std::io::stderr().is_terminal();
        self
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Fetch the body of `url`. The content is not checked for being an image.
    pub async fn download(&self, url: &Url) -> Result<Vec<u8>> {
        log::debug!("Downloading {}", url);

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| anyhow!("HTTP request failed for {}: {}", url, e))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP request failed with status {}: {}",
                response.status(),
                url
            ));
        }

        self.validate_content_length(&response, url)?;
        self.download_body_with_limit(response, url).await
    }

    fn validate_content_length(&self, response: &reqwest::Response, url: &Url) -> Result<()> {
        if let Some(content_length) = response.content_length() {
            if content_length > self.max_bytes {
                return Err(anyhow!(
                    "Image too large: {} bytes (max: {} bytes): {}",
                    content_length,
                    self.max_bytes,
                    url
                ));
            }
        }
        Ok(())
    }

    async fn download_body_with_limit(
        &self,
        response: reqwest::Response,
        url: &Url,
    ) -> Result<Vec<u8>> {
        let progress_bar = self.progress_bar(response.content_length(), url);

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| anyhow!("Failed to read response body: {}", e))?;

            bytes.extend_from_slice(&chunk);

            if let Some(ref pb) = progress_bar {
                pb.set_position(bytes.len() as u64);
            }

            if bytes.len() as u64 > self.max_bytes {
                if let Some(pb) = progress_bar {
                    pb.abandon_with_message("Download failed: size limit exceeded");
                }
                return Err(anyhow!(
                    "Image exceeded size limit during download: {} bytes (max: {}): {}",
                    bytes.len(),
                    self.max_bytes,
                    url
                ));
            }
        }

        if let Some(pb) = progress_bar {
            pb.finish_and_clear();
        }

        log::debug!("Downloaded {} ({})", url, format_bytes(bytes.len()));
        Ok(bytes)
    }

    fn progress_bar(&self, content_length: Option<u64>, url: &Url) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = match content_length {
            Some(total) => {
                let pb = ProgressBar::new(total);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template(
                            "{msg} [{bar:25.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})",
                        )
                        .map(|style| style.progress_chars("=>-"))
                        .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} {msg} {bytes}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb
            }
        };

        let filename = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .unwrap_or("image");
        pb.set_message(format!("Downloading {}", filename));
        Some(pb)
    }
}

/// Format bytes in a human-readable way
fn format_bytes(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

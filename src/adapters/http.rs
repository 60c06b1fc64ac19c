use crate::core::Transport;
use crate::utils::error::{Result, RmaError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// reqwest-backed transport. No retries; a non-2xx status is an error.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
    timeout: Option<Duration>,
    headers: HashMap<String, String>,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    fn request(&self, url: &str) -> RequestBuilder {
        let mut request = self.client.get(url);

        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        request
    }

    async fn send(&self, url: &str) -> Result<Response> {
        let response = self.request(url).send().await?;
        tracing::debug!("HTTP GET {} -> {}", url, response.status());

        if !response.status().is_success() {
            tracing::error!("❌ Request failed with status {}: {}", response.status(), url);
            return Err(RmaError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.send(url).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn get_to_file(&self, url: &str, local_path: &Path) -> Result<()> {
        let mut response = self.send(url).await?;

        if let Some(parent) = local_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut file = tokio::fs::File::create(local_path).await?;
        let mut written = 0usize;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;

        tracing::debug!("Wrote {} bytes to {}", written, local_path.display());
        Ok(())
    }
}

use crate::domain::model::ResponseFormat;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Destination for exported payloads.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn rma_endpoint(&self) -> &str;
    fn informatics_archive_endpoint(&self) -> &str;
    fn response_format(&self) -> Result<ResponseFormat>;
}

/// HTTP side of the fetch pipeline. Failures surface as errors, never as empty bodies.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>>;

    async fn get_to_file(&self, url: &str, local_path: &Path) -> Result<()>;
}

pub trait BodyParser: Send + Sync {
    fn parse(&self, body: &[u8], format: ResponseFormat) -> Result<serde_json::Value>;
}

use crate::core::Storage;
use crate::utils::error::Result;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_nested_directories() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());

        storage.write_file("exports/experiments.json", b"[]").await.unwrap();
        let data = std::fs::read(dir.path().join("exports/experiments.json")).unwrap();
        assert_eq!(data, b"[]");
    }

    #[tokio::test]
    async fn test_write_into_file_path_is_io_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("blocker"), b"x").unwrap();
        let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());

        let err = storage.write_file("blocker/out.csv", b"id\n").await.unwrap_err();
        assert!(matches!(err, crate::utils::error::RmaError::Io(_)));
    }
}

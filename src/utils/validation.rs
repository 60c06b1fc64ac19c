use crate::utils::error::{Result, RmaError};
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl Into<String>, reason: impl Into<String>) -> RmaError {
    RmaError::InvalidConfigValue {
        field: field_name.to_string(),
        value: value.into(),
        reason: reason.into(),
    }
}

/// Service endpoints are plain `http`/`https` bases; queries are appended as `/query.{fmt}`.
pub fn validate_endpoint(field_name: &str, endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint)
        .map_err(|e| invalid(field_name, endpoint, format!("not a URL: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field_name,
            endpoint,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(
            field_name,
            endpoint,
            "endpoint must not carry a query string or fragment",
        ));
    }
    Ok(())
}

/// Target of a download. Must name a file, not an existing directory.
pub fn validate_save_path(field_name: &str, path: &Path) -> Result<()> {
    let shown = path.to_string_lossy();
    if shown.is_empty() {
        return Err(invalid(field_name, shown, "path is empty"));
    }
    if shown.contains('\0') {
        return Err(invalid(field_name, shown, "path contains a null byte"));
    }
    if path.is_dir() {
        return Err(invalid(field_name, shown, "path is an existing directory"));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field_name, value, "value is empty"));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            value.to_string(),
            format!("expected {}..={}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_endpoint() {
        assert!(validate_endpoint("endpoints.rma", "https://api.brain-map.org/api/v2/data").is_ok());
        assert!(validate_endpoint("endpoints.rma", "http://example.com").is_ok());
        assert!(validate_endpoint("endpoints.rma", "").is_err());
        assert!(validate_endpoint("endpoints.rma", "invalid-url").is_err());
        assert!(validate_endpoint("endpoints.rma", "ftp://example.com").is_err());
        assert!(validate_endpoint("endpoints.rma", "http://example.com/data?q=model::M").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("http.timeout_seconds", 30u64, 1, 600).is_ok());
        assert!(validate_range("http.timeout_seconds", 0u64, 1, 600).is_err());
        assert!(validate_range("http.timeout_seconds", 601u64, 1, 600).is_err());
    }

    #[test]
    fn test_validate_save_path() {
        assert!(validate_save_path("save_file_path", Path::new("annotation_25.nrrd")).is_ok());
        assert!(validate_save_path("save_file_path", Path::new("")).is_err());
        assert!(validate_save_path("save_file_path", Path::new("bad\0path")).is_err());

        let dir = TempDir::new().unwrap();
        assert!(validate_save_path("save_file_path", dir.path()).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("http.user_agent", "rma-query").is_ok());
        assert!(validate_non_empty_string("http.user_agent", "   ").is_err());
    }
}

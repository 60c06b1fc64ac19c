use crate::adapters::http::HttpTransport;
use crate::core::{ConfigProvider, ResponseFormat};
use crate::utils::error::{Result, RmaError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_RMA_ENDPOINT: &str = "http://api.brain-map.org/api/v2/data";
pub const DEFAULT_INFORMATICS_ARCHIVE_ENDPOINT: &str =
    "http://download.alleninstitute.org/informatics-archive";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_rma_endpoint")]
    pub rma: String,
    #[serde(default = "default_informatics_archive_endpoint")]
    pub informatics_archive: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            rma: default_rma_endpoint(),
            informatics_archive: default_informatics_archive_endpoint(),
        }
    }
}

fn default_rma_endpoint() -> String {
    DEFAULT_RMA_ENDPOINT.to_string()
}

fn default_informatics_archive_endpoint() -> String {
    DEFAULT_INFORMATICS_ARCHIVE_ENDPOINT.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryConfig {
    /// `json` (default) or `xml`
    pub format: Option<String>,
}

impl ClientConfig {
    /// Load the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RmaError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Parse the configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RmaError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` references with environment values. Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RmaError::Config {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_endpoint("endpoints.rma", &self.endpoints.rma)?;
        validation::validate_endpoint(
            "endpoints.informatics_archive",
            &self.endpoints.informatics_archive,
        )?;

        if let Some(timeout) = self.http.timeout_seconds {
            validation::validate_range("http.timeout_seconds", timeout, 1, 600)?;
        }

        if let Some(user_agent) = &self.http.user_agent {
            validation::validate_non_empty_string("http.user_agent", user_agent)?;
        }

        self.response_format()?;
        Ok(())
    }

    pub fn response_format(&self) -> Result<ResponseFormat> {
        match &self.query.format {
            Some(format) => format.parse(),
            None => Ok(ResponseFormat::default()),
        }
    }

    pub fn build_transport(&self) -> HttpTransport {
        let mut transport = HttpTransport::new();

        if let Some(timeout) = self.http.timeout_seconds {
            transport = transport.with_timeout(Duration::from_secs(timeout));
        }
        if let Some(user_agent) = &self.http.user_agent {
            transport = transport.with_header("User-Agent", user_agent.as_str());
        }
        if let Some(headers) = &self.http.headers {
            for (key, value) in headers {
                transport = transport.with_header(key.as_str(), value.as_str());
            }
        }

        transport
    }
}

impl ConfigProvider for ClientConfig {
    fn rma_endpoint(&self) -> &str {
        &self.endpoints.rma
    }

    fn informatics_archive_endpoint(&self) -> &str {
        &self.endpoints.informatics_archive
    }

    fn response_format(&self) -> Result<ResponseFormat> {
        ClientConfig::response_format(self)
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ClientConfig::from_toml_str("").unwrap();

        assert_eq!(config.rma_endpoint(), DEFAULT_RMA_ENDPOINT);
        assert_eq!(
            config.informatics_archive_endpoint(),
            DEFAULT_INFORMATICS_ARCHIVE_ENDPOINT
        );
        assert_eq!(config.response_format().unwrap(), ResponseFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[endpoints]
rma = "https://api.example.org/api/v2/data"

[http]
timeout_seconds = 30
user_agent = "rma-query-test"

[http.headers]
Accept = "application/json"

[query]
format = "xml"
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.rma_endpoint(), "https://api.example.org/api/v2/data");
        assert_eq!(
            config.informatics_archive_endpoint(),
            DEFAULT_INFORMATICS_ARCHIVE_ENDPOINT
        );
        assert_eq!(config.http.timeout_seconds, Some(30));
        assert_eq!(config.response_format().unwrap(), ResponseFormat::Xml);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("RMA_QUERY_TEST_ENDPOINT", "https://test.api.com/data");

        let toml_content = r#"
[endpoints]
rma = "${RMA_QUERY_TEST_ENDPOINT}"
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.endpoints.rma, "https://test.api.com/data");

        std::env::remove_var("RMA_QUERY_TEST_ENDPOINT");
    }

    #[test]
    fn test_config_validation() {
        let config = ClientConfig::from_toml_str(
            r#"
[endpoints]
rma = "invalid-url"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = ClientConfig::from_toml_str(
            r#"
[http]
timeout_seconds = 0
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unsupported_format() {
        let config = ClientConfig::from_toml_str(
            r#"
[query]
format = "csv"
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate().unwrap_err(),
            RmaError::UnsupportedFormat { .. }
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let err = ClientConfig::from_toml_str("[endpoints\nrma = 1").unwrap_err();
        assert!(matches!(err, RmaError::Config { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[endpoints]
informatics_archive = "https://archive.example.org"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = ClientConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.endpoints.informatics_archive, "https://archive.example.org");
    }
}

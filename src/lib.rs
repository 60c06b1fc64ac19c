pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{HttpTransport, LocalStorage, ResponseParser};
pub use crate::app::connectivity::{GridSearchParams, Hemisphere, MouseConnectivityApi, VolumetricDownload};
pub use crate::config::ClientConfig;
pub use crate::core::compose::{compose, QueryExpression, QueryOptions};
pub use crate::core::filter::{quote_string, serialize_filter};
pub use crate::core::query::{payload_records, read_response, RmaClient};
pub use crate::core::service::{build_service_stage, ServiceStage};
pub use crate::core::url::assemble;
pub use crate::domain::model::{CriterionNode, Filter, Operator, Record, ResponseFormat, ServiceParam, Value};
pub use crate::utils::error::{Result, RmaError};

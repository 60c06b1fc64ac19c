use crate::adapters::http::HttpTransport;
use crate::adapters::parser::ResponseParser;
use crate::core::{BodyParser, Transport};
use crate::domain::model::{Record, ResponseFormat};
use crate::utils::error::{Result, RmaError};
use std::path::Path;

/// Envelope key that holds the payload in service responses.
pub const ENVELOPE_FIELD: &str = "msg";

/// Default extractor: project the `msg` field of the decoded envelope.
pub fn read_response(parsed: serde_json::Value) -> Result<serde_json::Value> {
    match parsed {
        serde_json::Value::Object(mut envelope) => {
            envelope
                .remove(ENVELOPE_FIELD)
                .ok_or_else(|| RmaError::MissingEnvelopeField {
                    field: ENVELOPE_FIELD.to_string(),
                })
        }
        _ => Err(RmaError::MissingEnvelopeField {
            field: ENVELOPE_FIELD.to_string(),
        }),
    }
}

/// Split an extracted payload into records. A single object counts as one row.
pub fn payload_records(payload: &serde_json::Value) -> Result<Vec<Record>> {
    let rows = match payload {
        serde_json::Value::Array(rows) => rows.as_slice(),
        // single-row XML responses collapse to one object
        serde_json::Value::Object(_) => std::slice::from_ref(payload),
        other => {
            return Err(RmaError::Processing {
                message: format!("expected a list of records, got {}", other),
            });
        }
    };

    rows.iter()
        .map(|row| match row {
            serde_json::Value::Object(obj) => Ok(Record {
                data: obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            }),
            other => Err(RmaError::Processing {
                message: format!("expected a record object, got {}", other),
            }),
        })
        .collect()
}

/// Fetch pipeline: build a URL, GET it, parse the body, extract the payload.
pub struct RmaClient<T: Transport = HttpTransport, P: BodyParser = ResponseParser> {
    transport: T,
    parser: P,
    format: ResponseFormat,
}

impl RmaClient {
    pub fn with_defaults() -> Self {
        Self::new(HttpTransport::new(), ResponseParser, ResponseFormat::Json)
    }
}

impl<T: Transport, P: BodyParser> RmaClient<T, P> {
    pub fn new(transport: T, parser: P, format: ResponseFormat) -> Self {
        Self {
            transport,
            parser,
            format,
        }
    }

    pub fn format(&self) -> ResponseFormat {
        self.format
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn do_query<A, R, B, E>(&self, url_builder: B, extractor: E, args: A) -> Result<R>
    where
        B: FnOnce(A) -> Result<String>,
        E: FnOnce(serde_json::Value) -> Result<R>,
    {
        let url = url_builder(args)?;
        tracing::debug!("RMA query: {}", url);

        let body = self.transport.get(&url).await?;
        tracing::debug!("Received {} bytes from {}", body.len(), url);

        let parsed = self.parser.parse(&body, self.format)?;
        extractor(parsed)
    }

    /// Fetch an already assembled URL with the default extractor.
    pub async fn query(&self, url: &str) -> Result<serde_json::Value> {
        self.do_query(|url: &str| Ok(url.to_string()), read_response, url)
            .await
    }

    pub async fn retrieve_file_over_http(&self, url: &str, local_path: &Path) -> Result<()> {
        tracing::info!("⬇️ Downloading {} to {}", url, local_path.display());
        self.transport.get_to_file(url, local_path).await
    }
}

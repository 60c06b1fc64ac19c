use crate::core::query::payload_records;
use crate::core::{Record, Storage};
use crate::utils::error::{Result, RmaError};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// Pick the format from the output file extension.
    pub fn from_path(path: &str) -> Result<Self> {
        match std::path::Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some("json") => Ok(ExportFormat::Json),
            Some("csv") => Ok(ExportFormat::Csv),
            _ => Err(RmaError::InvalidConfigValue {
                field: "output".to_string(),
                value: path.to_string(),
                reason: "output file must end in .json or .csv".to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonExport<'a> {
    source_url: &'a str,
    fetched_at: chrono::DateTime<chrono::Utc>,
    num_rows: usize,
    msg: &'a serde_json::Value,
}

/// Write an extracted payload through `storage`.
pub async fn export_payload<S: Storage>(
    storage: &S,
    payload: &serde_json::Value,
    path: &str,
    format: ExportFormat,
    source_url: &str,
) -> Result<()> {
    let data = match format {
        ExportFormat::Json => {
            let export = JsonExport {
                source_url,
                fetched_at: chrono::Utc::now(),
                num_rows: payload.as_array().map(Vec::len).unwrap_or(1),
                msg: payload,
            };
            serde_json::to_vec_pretty(&export)?
        }
        ExportFormat::Csv => payload_to_csv(payload)?,
    };

    tracing::info!("💾 Writing {} export to {}", format_name(format), path);
    storage.write_file(path, &data).await
}

fn format_name(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::Json => "JSON",
        ExportFormat::Csv => "CSV",
    }
}

/// Header is the sorted union of record keys; nested values are written as compact JSON.
pub fn payload_to_csv(payload: &serde_json::Value) -> Result<Vec<u8>> {
    records_to_csv(&payload_records(payload)?)
}

pub fn records_to_csv(records: &[Record]) -> Result<Vec<u8>> {
    let columns: BTreeSet<&str> = records
        .iter()
        .flat_map(|record| record.data.keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;

    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|column| match record.data.get(*column) {
                None | Some(serde_json::Value::Null) => String::new(),
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(value) => value.to_string(),
            })
            .collect();
        writer.write_record(&row)?;
    }

    writer.into_inner().map_err(|e| RmaError::Processing {
        message: format!("failed to flush CSV: {}", e),
    })
}

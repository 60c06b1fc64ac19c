use crate::domain::model::ResponseFormat;

/// `{base_endpoint}/query.{format}?q={stage1,stage2,...}`.
///
/// Stages are query expressions or service stages, already URL-safe. Nothing is escaped here.
pub fn assemble<S: AsRef<str>>(base_endpoint: &str, format: ResponseFormat, stages: &[S]) -> String {
    let stages = stages.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",");
    format!("{}/query.{}?q={}", base_endpoint, format, stages)
}

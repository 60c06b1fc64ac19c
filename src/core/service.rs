//! Service stage builder for named server-side search services.

use crate::core::filter::check_token;
use crate::domain::model::{ServiceParam, Value};
use crate::utils::error::{Result, RmaError};

/// A named service call. Built once per query and consumed by the URL assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceStage {
    service_name: String,
    params: Vec<ServiceParam>,
}

impl ServiceStage {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: Option<Value>) -> Self {
        self.params.push(ServiceParam::new(name, value));
        self
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn params(&self) -> &[ServiceParam] {
        &self.params
    }

    pub fn build(&self) -> Result<String> {
        build_service_stage(&self.service_name, &self.params)
    }
}

/// Render `service::name[p1$eqv1][p2$eqv2]...`, skipping params whose value is `None`.
///
/// Strings are emitted as given; quote them with [`quote_string`](crate::core::filter::quote_string)
/// first when the service expects a quoted literal.
pub fn build_service_stage(service_name: &str, params: &[ServiceParam]) -> Result<String> {
    check_token("service", service_name, "service name")?;

    let mut out = format!("service::{}", service_name);

    for param in params {
        let Some(value) = &param.value else {
            continue;
        };
        check_token(&param.name, &param.name, "parameter name")?;
        out.push_str(&format!("[{}$eq{}]", param.name, encode_value(&param.name, value)?));
    }

    Ok(out)
}

fn encode_value(name: &str, value: &Value) -> Result<String> {
    match value {
        Value::List(items) => {
            if items.is_empty() {
                return Err(RmaError::malformed(name, "list value is empty"));
            }
            let items = items
                .iter()
                .map(|item| match item {
                    Value::List(_) => Err(RmaError::malformed(name, "nested lists are not allowed")),
                    scalar => encode_scalar(name, scalar),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(items.join(","))
        }
        scalar => encode_scalar(name, scalar),
    }
}

fn encode_scalar(name: &str, value: &Value) -> Result<String> {
    let text = match value {
        Value::Integer(v) => v.to_string(),
        Value::Float(v) if v.is_finite() => v.to_string(),
        Value::Float(v) => {
            return Err(RmaError::malformed(name, format!("non-finite number {}", v)));
        }
        Value::Boolean(v) => v.to_string(),
        Value::String(v) | Value::Identifier(v) => v.clone(),
        Value::List(_) => return Err(RmaError::malformed(name, "nested lists are not allowed")),
    };
    check_token(name, &text, "value")?;
    Ok(text)
}

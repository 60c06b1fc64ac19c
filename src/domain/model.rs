use crate::utils::error::{Result, RmaError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// One payload row returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

/// Value kinds accepted by filters and service parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    /// Free text. Quoted inside filters, passed through inside service stages.
    String(String),
    Boolean(bool),
    /// Bare token such as a field path or structure acronym. Never quoted.
    Identifier(String),
    List(Vec<Value>),
}

impl Value {
    pub fn ident(s: impl Into<String>) -> Self {
        Value::Identifier(s.into())
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Identifier(_) => "identifier",
            Value::List(_) => "list",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    Nin,
    Asc,
    Desc,
}

impl Operator {
    pub fn token(&self) -> &'static str {
        match self {
            Operator::Eq => "$eq",
            Operator::Ne => "$ne",
            Operator::Lt => "$lt",
            Operator::Le => "$le",
            Operator::Gt => "$gt",
            Operator::Ge => "$ge",
            Operator::In => "$in",
            Operator::Nin => "$nin",
            Operator::Asc => "$asc",
            Operator::Desc => "$desc",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::Ne | Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge
        )
    }

    pub fn is_membership(&self) -> bool {
        matches!(self, Operator::In | Operator::Nin)
    }

    pub fn is_ordering(&self) -> bool {
        matches!(self, Operator::Asc | Operator::Desc)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub operator: Operator,
    pub value: Option<Value>,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: Some(value.into()),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Eq, value)
    }

    /// Presence-only bracket, rendered as `[field]`.
    pub fn present(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: Operator::Eq,
            value: None,
        }
    }
}

/// A model or relation name with its filters and nested relations.
///
/// An empty `name` is allowed and renders only the filter brackets, which is
/// how model-level criteria such as `[id$eq385]` are written.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CriterionNode {
    pub name: String,
    pub filters: Vec<Filter>,
    pub children: Vec<CriterionNode>,
}

impl CriterionNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filters: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Node without a relation name, for filters on the queried model itself.
    pub fn filters_only(filters: Vec<Filter>) -> Self {
        Self {
            name: String::new(),
            filters,
            children: Vec::new(),
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn child(mut self, child: CriterionNode) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceParam {
    pub name: String,
    pub value: Option<Value>,
}

impl ServiceParam {
    pub fn new(name: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Xml,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseFormat {
    type Err = RmaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(ResponseFormat::Json),
            "xml" => Ok(ResponseFormat::Xml),
            other => Err(RmaError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_format_parsing() {
        assert_eq!("json".parse::<ResponseFormat>().unwrap(), ResponseFormat::Json);
        assert_eq!("xml".parse::<ResponseFormat>().unwrap(), ResponseFormat::Xml);

        let err = "csv".parse::<ResponseFormat>().unwrap_err();
        assert!(matches!(err, RmaError::UnsupportedFormat { ref format } if format == "csv"));
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(385), Value::Integer(385));
        assert_eq!(Value::from("MOp"), Value::String("MOp".to_string()));
        assert_eq!(
            Value::from(vec!["Isocortex", "MOp"]),
            Value::List(vec![
                Value::String("Isocortex".to_string()),
                Value::String("MOp".to_string())
            ])
        );
        assert!(!Value::from(vec![1, 2]).is_scalar());
    }
}

//! Clause serializer: one filter predicate to its bracketed form.

use crate::domain::model::{Filter, Operator, Value};
use crate::utils::error::{Result, RmaError};

/// Wrap a string in single quotes.
pub fn quote_string(s: &str) -> String {
    format!("'{}'", s)
}

/// Render `[field$opvalue]`.
///
/// Every (operator, value kind) pair outside the table below is rejected:
///
/// - comparison operators take integers, floats, booleans, identifiers (bare)
///   or strings (single-quoted)
/// - `in`/`nin` take a non-empty list of scalars
/// - `asc`/`desc` take an identifier and render an ordering expression,
///   e.g. `[order$eq'sub_images.section_number$asc']`
/// - no value at all renders the presence-only form `[field]`
pub fn serialize_filter(field: &str, operator: Operator, value: Option<&Value>) -> Result<String> {
    check_token(field, field, "field name")?;

    let value = match value {
        Some(value) => value,
        None => return Ok(format!("[{}]", field)),
    };

    let rendered = if operator.is_comparison() {
        if !value.is_scalar() {
            return Err(RmaError::malformed(
                field,
                format!("{} does not accept a list", &operator.token()[1..]),
            ));
        }
        format!("{}{}", operator.token(), render_scalar(field, value)?)
    } else if operator.is_membership() {
        match value {
            Value::List(items) if !items.is_empty() => {
                let items = items
                    .iter()
                    .map(|item| render_scalar(field, item))
                    .collect::<Result<Vec<_>>>()?;
                format!("{}{}", operator.token(), items.join(","))
            }
            Value::List(_) => {
                return Err(RmaError::malformed(field, "membership list is empty"));
            }
            other => {
                return Err(RmaError::malformed(
                    field,
                    format!("{} expects a list, got {}", &operator.token()[1..], other.kind()),
                ));
            }
        }
    } else {
        match value {
            Value::Identifier(target) => {
                check_token(field, target, "ordering target")?;
                format!(
                    "{}{}",
                    Operator::Eq.token(),
                    quote_string(&format!("{}{}", target, operator.token()))
                )
            }
            other => {
                return Err(RmaError::malformed(
                    field,
                    format!(
                        "{} expects a field identifier, got {}",
                        &operator.token()[1..],
                        other.kind()
                    ),
                ));
            }
        }
    };

    Ok(format!("[{}{}]", field, rendered))
}

impl Filter {
    pub fn render(&self) -> Result<String> {
        serialize_filter(&self.field, self.operator, self.value.as_ref())
    }
}

fn render_scalar(field: &str, value: &Value) -> Result<String> {
    match value {
        Value::Integer(v) => Ok(v.to_string()),
        Value::Float(v) if v.is_finite() => Ok(v.to_string()),
        Value::Float(v) => Err(RmaError::malformed(field, format!("non-finite number {}", v))),
        Value::Boolean(v) => Ok(v.to_string()),
        Value::Identifier(v) => {
            check_token(field, v, "identifier")?;
            Ok(v.clone())
        }
        Value::String(v) => {
            check_token(field, v, "string")?;
            if v.contains('\'') {
                return Err(RmaError::malformed(field, "string contains a single quote"));
            }
            Ok(quote_string(v))
        }
        Value::List(_) => Err(RmaError::malformed(field, "nested lists are not allowed")),
    }
}

/// Rendered fragments end up verbatim in a URL query parameter.
pub(crate) fn check_token(name: &str, token: &str, what: &str) -> Result<()> {
    if token.is_empty() {
        return Err(RmaError::malformed(name, format!("{} is empty", what)));
    }
    if token.chars().any(char::is_whitespace) {
        return Err(RmaError::malformed(
            name,
            format!("{} '{}' contains whitespace", what, token),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_on_integer() {
        let out = serialize_filter("id", Operator::Eq, Some(&Value::Integer(385))).unwrap();
        assert_eq!(out, "[id$eq385]");
    }

    #[test]
    fn test_booleans_render_as_literals() {
        assert_eq!(
            serialize_filter("is_injection", Operator::Eq, Some(&Value::Boolean(true))).unwrap(),
            "[is_injection$eqtrue]"
        );
        assert_eq!(
            serialize_filter("is_injection", Operator::Eq, Some(&Value::Boolean(false))).unwrap(),
            "[is_injection$eqfalse]"
        );
    }

    #[test]
    fn test_strings_are_quoted_identifiers_are_not() {
        assert_eq!(
            serialize_filter("acronym", Operator::Eq, Some(&Value::from("MOp"))).unwrap(),
            "[acronym$eq'MOp']"
        );
        assert_eq!(
            serialize_filter("acronym", Operator::Eq, Some(&Value::ident("MOp"))).unwrap(),
            "[acronym$eqMOp]"
        );
    }

    #[test]
    fn test_ordering_expression() {
        let out = serialize_filter(
            "order",
            Operator::Asc,
            Some(&Value::ident("sub_images.section_number")),
        )
        .unwrap();
        assert_eq!(out, "[order$eq'sub_images.section_number$asc']");

        let out = serialize_filter("order", Operator::Desc, Some(&Value::ident("name"))).unwrap();
        assert_eq!(out, "[order$eq'name$desc']");
    }

    #[test]
    fn test_membership_lists() {
        let out = serialize_filter("id", Operator::In, Some(&Value::from(vec![1, 2, 3]))).unwrap();
        assert_eq!(out, "[id$in1,2,3]");

        let out = serialize_filter("acronym", Operator::Nin, Some(&Value::from(vec!["MOp", "SSp"])))
            .unwrap();
        assert_eq!(out, "[acronym$nin'MOp','SSp']");
    }

    #[test]
    fn test_presence_only_bracket() {
        assert_eq!(serialize_filter("structures", Operator::Eq, None).unwrap(), "[structures]");
    }

    #[test]
    fn test_list_with_equality_is_malformed() {
        let err = serialize_filter("id", Operator::Eq, Some(&Value::from(vec![1, 2]))).unwrap_err();
        assert!(matches!(err, RmaError::MalformedParameter { ref name, .. } if name == "id"));
    }

    #[test]
    fn test_rejected_combinations() {
        assert!(serialize_filter("order", Operator::Asc, Some(&Value::Integer(1))).is_err());
        assert!(serialize_filter("id", Operator::In, Some(&Value::Integer(1))).is_err());
        assert!(serialize_filter("id", Operator::In, Some(&Value::List(vec![]))).is_err());
        assert!(serialize_filter(
            "id",
            Operator::In,
            Some(&Value::List(vec![Value::from(vec![1])]))
        )
        .is_err());
        assert!(serialize_filter("", Operator::Eq, Some(&Value::Integer(1))).is_err());
        assert!(serialize_filter("name", Operator::Eq, Some(&Value::from("a b"))).is_err());
        assert!(serialize_filter("name", Operator::Eq, Some(&Value::from("it's"))).is_err());
        assert!(serialize_filter("x", Operator::Gt, Some(&Value::Float(f64::NAN))).is_err());
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let value = Value::from(vec!["Isocortex", "MOp"]);
        let first = serialize_filter("acronym", Operator::In, Some(&value)).unwrap();
        let second = serialize_filter("acronym", Operator::In, Some(&value)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_filter_render_uses_serializer() {
        assert_eq!(Filter::eq("section_number", 74).render().unwrap(), "[section_number$eq74]");
        assert_eq!(
            Filter::new("density", Operator::Ge, 0.5).render().unwrap(),
            "[density$ge0.5]"
        );
    }
}

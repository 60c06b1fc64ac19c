//! Clause composer: model, criteria, include and options into one query expression.

use crate::core::filter::{check_token, quote_string};
use crate::domain::model::{CriterionNode, Filter, Operator};
use crate::utils::error::{Result, RmaError};

/// Render `model::M[,rma::criteria,...][,rma::include,...][,rma::options,...]`.
///
/// Empty slices mean the clause is absent. Several top-level nodes in one
/// clause are comma-joined in the order given.
pub fn compose(
    model: &str,
    criteria: &[CriterionNode],
    include: &[CriterionNode],
    options: &[String],
) -> Result<String> {
    check_token("model", model, "model name")?;

    let mut out = format!("model::{}", model);

    if !criteria.is_empty() {
        out.push_str(",rma::criteria,");
        out.push_str(&render_nodes(criteria)?);
    }

    if !include.is_empty() {
        out.push_str(",rma::include,");
        out.push_str(&render_nodes(include)?);
    }

    if !options.is_empty() {
        for option in options {
            check_token("options", option, "option")?;
        }
        out.push_str(",rma::options,");
        out.push_str(&options.join(","));
    }

    Ok(out)
}

fn render_nodes(nodes: &[CriterionNode]) -> Result<String> {
    let rendered = nodes
        .iter()
        .map(CriterionNode::render)
        .collect::<Result<Vec<_>>>()?;
    Ok(rendered.join(","))
}

impl CriterionNode {
    /// `name[f1][f2](child1,child2)`; the parenthesised part only when children exist.
    pub fn render(&self) -> Result<String> {
        if self.name.is_empty() && self.filters.is_empty() {
            return Err(RmaError::malformed(
                "criterion",
                "node has neither a name nor filters",
            ));
        }
        if !self.name.is_empty() {
            check_token(&self.name, &self.name, "relation name")?;
        }
        if self.name.is_empty() && !self.children.is_empty() {
            return Err(RmaError::malformed(
                "criterion",
                "unnamed node cannot have nested relations",
            ));
        }

        let mut out = self.name.clone();
        for filter in &self.filters {
            out.push_str(&filter.render()?);
        }

        if !self.children.is_empty() {
            out.push('(');
            out.push_str(&render_nodes(&self.children)?);
            out.push(')');
        }

        Ok(out)
    }
}

/// Paging and ordering options. Each field that is set renders one bracket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub start_row: Option<u32>,
    pub num_rows: Option<u32>,
    /// Sort keys in priority order, each a field path with `Operator::Asc` or `Operator::Desc`.
    pub order: Vec<(String, Operator)>,
    pub count: Option<bool>,
}

impl QueryOptions {
    pub fn render(&self) -> Result<Vec<String>> {
        let mut options = Vec::new();

        if let Some(start_row) = self.start_row {
            options.push(Filter::eq("start_row", start_row).render()?);
        }
        if let Some(num_rows) = self.num_rows {
            options.push(Filter::eq("num_rows", num_rows).render()?);
        }
        if !self.order.is_empty() {
            options.push(render_order(&self.order)?);
        }
        if let Some(count) = self.count {
            options.push(Filter::eq("count", count).render()?);
        }

        Ok(options)
    }
}

/// `[order$eq'a$asc,b$desc']`: one bracket, sort keys joined inside the quotes.
fn render_order(keys: &[(String, Operator)]) -> Result<String> {
    let keys = keys
        .iter()
        .map(|(field, direction)| {
            if !direction.is_ordering() {
                return Err(RmaError::malformed(
                    "order",
                    format!("{} is not an ordering direction", direction.token()),
                ));
            }
            check_token("order", field, "ordering target")?;
            Ok(format!("{}{}", field, direction.token()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(format!("[order{}{}]", Operator::Eq.token(), quote_string(&keys.join(","))))
}

/// Builder for one query expression.
///
/// Clauses may be set in any order; `build` always renders them in grammar order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryExpression {
    model: String,
    criteria: Vec<CriterionNode>,
    include: Vec<CriterionNode>,
    options: Vec<String>,
}

impl QueryExpression {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn criteria(mut self, node: CriterionNode) -> Self {
        self.criteria.push(node);
        self
    }

    pub fn include(mut self, node: CriterionNode) -> Self {
        self.include.push(node);
        self
    }

    /// Pre-formatted option fragment, passed through untouched.
    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    pub fn options(mut self, options: &QueryOptions) -> Result<Self> {
        self.options.extend(options.render()?);
        Ok(self)
    }

    pub fn build(&self) -> Result<String> {
        compose(&self.model, &self.criteria, &self.include, &self.options)
    }
}

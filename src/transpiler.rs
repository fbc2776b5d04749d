//! SQL Transpiler for the canonical AST.
//!
//! Renders node sequences into a `WHERE`-clause fragment. Every value becomes a
//! single-quoted literal produced by the injected [`Escaper`].

use crate::ast::*;
use crate::error::{ConvertError, ConvertResult};
use crate::escape::{Escaper, FieldQuoting};

/// What the renderer needs besides the nodes themselves.
#[derive(Clone, Copy)]
pub struct RenderContext<'e> {
    escaper: &'e dyn Escaper,
    field_quoting: FieldQuoting,
}

impl<'e> RenderContext<'e> {
    pub fn new(escaper: &'e dyn Escaper) -> Self {
        Self {
            escaper,
            field_quoting: FieldQuoting::None,
        }
    }

    pub fn with_field_quoting(mut self, quoting: FieldQuoting) -> Self {
        self.field_quoting = quoting;
        self
    }

    fn literal(&self, value: &str) -> String {
        format!("'{}'", self.escaper.escape(value))
    }
}

/// Trait for converting AST nodes to SQL.
pub trait ToSql {
    /// Convert this node to a SQL string.
    fn to_sql(&self, ctx: &RenderContext<'_>) -> ConvertResult<String>;
}

/// Render a node sequence with default field handling.
pub fn render(nodes: &[Node], escaper: &dyn Escaper) -> ConvertResult<String> {
    nodes.to_sql(&RenderContext::new(escaper))
}

impl ToSql for [Node] {
    fn to_sql(&self, ctx: &RenderContext<'_>) -> ConvertResult<String> {
        let parts = self
            .iter()
            .map(|node| node.to_sql(ctx))
            .collect::<ConvertResult<Vec<_>>>()?;
        Ok(parts.join(" "))
    }
}

impl ToSql for Node {
    fn to_sql(&self, ctx: &RenderContext<'_>) -> ConvertResult<String> {
        match self {
            Node::Atom(atom) => atom.to_sql(ctx),
            Node::Operator(op) => op.to_sql(ctx),
            Node::Group(children) => Ok(format!("({})", children.to_sql(ctx)?)),
        }
    }
}

impl ToSql for BoolOp {
    fn to_sql(&self, _ctx: &RenderContext<'_>) -> ConvertResult<String> {
        Ok(self.to_string())
    }
}

impl ToSql for Atom {
    fn to_sql(&self, ctx: &RenderContext<'_>) -> ConvertResult<String> {
        let field = ctx.field_quoting.apply(&self.field);
        match (self.operator, self.values.as_slice()) {
            (AtomOp::Eq | AtomOp::Gt | AtomOp::Lt, [value]) => Ok(format!(
                "{} {} {}",
                field,
                self.operator,
                ctx.literal(value)
            )),
            (AtomOp::Between, [lower, upper]) => Ok(format!(
                "{} BETWEEN {} AND {}",
                field,
                ctx.literal(lower),
                ctx.literal(upper)
            )),
            _ => {
                tracing::error!(
                    "Cannot render atom on field '{}': operator {} expects {} value(s), got {}",
                    self.field,
                    self.operator,
                    self.operator.arity(),
                    self.values.len()
                );
                Err(ConvertError::InternalInvariant {
                    field: self.field.clone(),
                    operator: self.operator,
                    values: self.values.len(),
                })
            }
        }
    }
}

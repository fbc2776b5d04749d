//! Raw parse tree to canonical AST.
//!
//! Maps operator lexemes to their SQL form, strips quotes, resolves `\` escapes and
//! rewrites `[left;right]` ranges into comparisons.

use std::borrow::Cow;

use crate::ast::{Atom, AtomOp, BoolOp, Node};
use crate::error::{ConvertResult, SemanticError};
use crate::parser::{RawAtom, RawBoolOp, RawExpr, RawQuery, RawValue};

/// Range side meaning "unbounded".
pub const WILDCARD: &str = "*";

/// Normalize a parsed query into a flat node sequence.
pub fn normalize(tree: &RawQuery<'_>) -> ConvertResult<Vec<Node>> {
    let mut nodes = Vec::with_capacity(1 + tree.tail.len() * 2);
    nodes.push(normalize_expr(&tree.head)?);
    for (op, expr) in &tree.tail {
        nodes.push(Node::Operator(normalize_bool_op(op)?));
        nodes.push(normalize_expr(expr)?);
    }
    Ok(nodes)
}

fn normalize_expr(expr: &RawExpr<'_>) -> ConvertResult<Node> {
    match expr {
        RawExpr::Atom(atom) => Ok(Node::Atom(normalize_atom(atom)?)),
        RawExpr::Group(query) => Ok(Node::Group(normalize(query)?)),
    }
}

fn normalize_bool_op(op: &RawBoolOp<'_>) -> ConvertResult<BoolOp> {
    BoolOp::from_keyword(op.keyword).ok_or_else(|| {
        SemanticError::UnknownOperator {
            keyword: op.keyword.to_string(),
            position: op.position,
        }
        .into()
    })
}

fn normalize_atom(atom: &RawAtom<'_>) -> ConvertResult<Atom> {
    let operator = match atom.operator {
        ":" => AtomOp::Eq,
        ":>" => AtomOp::Gt,
        ":<" => AtomOp::Lt,
        other => {
            return Err(SemanticError::UnknownAtomOperator {
                operator: other.to_string(),
                position: atom.position,
            }
            .into());
        }
    };

    let field = atom.field.to_string();
    let normalized = match atom.value {
        RawValue::Quoted(text) => Atom {
            field,
            operator,
            values: vec![unescape(strip_quotes(text)).into_owned()],
        },
        RawValue::Unquoted(text) => Atom {
            field,
            operator,
            values: vec![unescape(text).into_owned()],
        },
        RawValue::Number(text) => Atom {
            field,
            operator,
            values: vec![text.to_string()],
        },
        // A range replaces whatever operator was written before it.
        RawValue::Range { left, right } => {
            let (left, right) = (unescape(left), unescape(right));
            match (&*left, &*right) {
                (WILDCARD, WILDCARD) => {
                    return Err(SemanticError::WildcardRange {
                        field,
                        position: atom.position,
                    }
                    .into());
                }
                (WILDCARD, upper) => Atom::less_than(field, upper),
                (lower, WILDCARD) => Atom::greater_than(field, lower),
                (lower, upper) => Atom::between(field, lower, upper),
            }
        }
    };
    Ok(normalized)
}

fn strip_quotes(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}

/// Collapse every `\X` into `X`. A trailing lone backslash is kept.
pub fn unescape(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(chars.next().unwrap_or(c));
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

//! Error types for lucene-sql.

use thiserror::Error;

use crate::ast::AtomOp;

/// The main error type for query conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The query string does not match the grammar.
    #[error("Syntax error at position {position}: {reason}")]
    Syntax {
        position: usize,
        reason: SyntaxReason,
    },

    /// The query parsed but breaks a normalization rule.
    #[error("Semantic error: {0}")]
    Semantic(#[from] SemanticError),

    /// An atom reached the renderer with an operator/value shape the normalizer
    /// never produces. This is a bug, not bad input.
    #[error(
        "Internal invariant violated: atom on field '{field}' has operator {operator} with {values} value(s)"
    )]
    InternalInvariant {
        field: String,
        operator: AtomOp,
        values: usize,
    },

    /// Invalid converter configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Why the grammar rejected the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxReason {
    #[error("unterminated quoted string")]
    UnterminatedQuote,

    #[error("unbalanced parenthesis")]
    UnbalancedParenthesis,

    #[error("malformed range, expected [left;right]")]
    MalformedRange,

    #[error("missing boolean operator between expressions")]
    MissingOperator,

    #[error("missing field name")]
    MissingField,

    #[error("missing ':', ':>' or ':<' after field name")]
    MissingAtomOperator,

    #[error("missing value")]
    MissingValue,

    #[error("expected an expression, found '{found}'")]
    ExpectedExpression { found: String },

    #[error("unexpected input '{found}'")]
    UnexpectedInput { found: String },

    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("parentheses nested deeper than {max} levels")]
    NestingTooDeep { max: usize },
}

/// Rule violations found while normalizing a parse tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("unknown operator '{keyword}' at position {position}")]
    UnknownOperator { keyword: String, position: usize },

    #[error("unknown atom operator '{operator}' at position {position}")]
    UnknownAtomOperator { operator: String, position: usize },

    #[error("both sides of the range on field '{field}' cannot be wildcard (position {position})")]
    WildcardRange { field: String, position: usize },
}

/// Coarse classification of a [`ConvertError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    Semantic,
    InternalInvariant,
    Config,
}

impl ConvertError {
    /// Create a syntax error at the given position.
    pub fn syntax(position: usize, reason: SyntaxReason) -> Self {
        Self::Syntax { position, reason }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax { .. } => ErrorKind::Syntax,
            Self::Semantic(_) => ErrorKind::Semantic,
            Self::InternalInvariant { .. } => ErrorKind::InternalInvariant,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// True for errors caused by the query text itself, which callers should report
    /// as an invalid query rather than a defect.
    pub fn is_user_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Syntax | ErrorKind::Semantic)
    }

    /// Byte offset into the query, when the error points at one.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Syntax { position, .. } => Some(*position),
            Self::Semantic(
                SemanticError::UnknownOperator { position, .. }
                | SemanticError::UnknownAtomOperator { position, .. }
                | SemanticError::WildcardRange { position, .. },
            ) => Some(*position),
            Self::InternalInvariant { .. } | Self::Config(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConvertError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

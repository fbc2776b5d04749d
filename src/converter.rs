//! Query string to SQL, end to end.
//!
//! [`Converter`] bundles an [`Escaper`] with a [`ConverterConfig`] and runs the
//! parse → normalize → render pipeline. It holds no per-query state, so one value can
//! serve any number of conversions, from any number of threads when its escaper
//! allows it.

use crate::ast::Node;
use crate::config::ConverterConfig;
use crate::error::ConvertResult;
use crate::escape::Escaper;
use crate::normalizer::normalize;
use crate::parser::QueryParser;
use crate::transpiler::{RenderContext, ToSql};

/// Convert a query with the default configuration.
///
/// # Example
///
/// ```
/// use lucene_sql::escape::MysqlEscaper;
///
/// let sql = lucene_sql::to_sql("price:[*;100] AND name:bob", &MysqlEscaper).unwrap();
/// assert_eq!(sql, "price < '100' AND name = 'bob'");
/// ```
pub fn to_sql(query: &str, escaper: &dyn Escaper) -> ConvertResult<String> {
    run(query, escaper, &ConverterConfig::default())
}

/// Reusable, immutable conversion settings.
#[derive(Debug, Clone)]
pub struct Converter<E> {
    escaper: E,
    config: ConverterConfig,
}

impl<E: Escaper> Converter<E> {
    pub fn new(escaper: E) -> Self {
        Self {
            escaper,
            config: ConverterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ConverterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Parse and normalize `query` into the canonical AST.
    ///
    /// An empty query yields an empty sequence without running the parser.
    pub fn ast(&self, query: &str) -> ConvertResult<Vec<Node>> {
        canonical_ast(query, &self.config)
    }

    /// Convert `query` into an SQL `WHERE` fragment. An empty query gives an
    /// empty fragment.
    pub fn convert(&self, query: &str) -> ConvertResult<String> {
        run(query, &self.escaper, &self.config)
    }
}

fn canonical_ast(query: &str, config: &ConverterConfig) -> ConvertResult<Vec<Node>> {
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let tree = QueryParser::new(config.max_depth)
        .parse(query)
        .inspect_err(|e| tracing::debug!("Rejected query: {}", e))?;
    normalize(&tree).inspect_err(|e| tracing::debug!("Rejected query: {}", e))
}

fn run(query: &str, escaper: &dyn Escaper, config: &ConverterConfig) -> ConvertResult<String> {
    if query.is_empty() {
        return Ok(String::new());
    }

    tracing::debug!("Converting query ({} bytes)", query.len());
    let nodes = canonical_ast(query, config)?;
    let ctx = RenderContext::new(escaper).with_field_quoting(config.field_quoting);
    let sql = nodes.to_sql(&ctx)?;
    tracing::debug!("Converted to SQL: {}", sql);
    Ok(sql)
}

//! # lucene-sql
//!
//! Translates Lucene-style boolean/range query strings into SQL `WHERE` fragments.
//!
//! ## Quick Example
//!
//! ```rust
//! use lucene_sql::prelude::*;
//!
//! let sql = lucene_sql::to_sql(
//!     r#"(field1:"value one" AND field2:"value two") OR (field3:[4;10])"#,
//!     &MysqlEscaper,
//! )?;
//! assert_eq!(
//!     sql,
//!     "(field1 = 'value one' AND field2 = 'value two') OR (field3 BETWEEN '4' AND '10')"
//! );
//! # Ok::<(), ConvertError>(())
//! ```
//!
//! ## Syntax
//!
//! | Input            | SQL                          |
//! |------------------|------------------------------|
//! | `name:bob`       | `name = 'bob'`               |
//! | `count:>5`       | `count > '5'`                |
//! | `count:<5`       | `count < '5'`                |
//! | `price:[4;10]`   | `price BETWEEN '4' AND '10'` |
//! | `price:[*;100]`  | `price < '100'`              |
//! | `price:[100;*]`  | `price > '100'`              |
//! | `a AND b`, `a OR b`, `a ANDNOT b` | `AND`, `OR`, `AND NOT` |
//!
//! Boolean keywords are case-insensitive and there is no operator precedence:
//! only parentheses group.

pub mod ast;
pub mod config;
pub mod converter;
pub mod error;
pub mod escape;
pub mod normalizer;
pub mod parser;
pub mod transpiler;

pub use converter::{to_sql, Converter};

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::ConverterConfig;
    pub use crate::converter::{to_sql, Converter};
    pub use crate::error::*;
    pub use crate::escape::{AnsiEscaper, Escaper, FieldQuoting, MysqlEscaper};
    pub use crate::normalizer::normalize;
    pub use crate::parser::parse;
    pub use crate::transpiler::{render, ToSql};
}

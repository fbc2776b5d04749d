//! Literal escaping and identifier quoting.
//!
//! The renderer never escapes values itself: it hands each raw literal to an
//! [`Escaper`] and places the result between single quotes.

use std::borrow::Cow;

use serde::Deserialize;

/// Makes a raw value safe to place between single quotes in SQL.
pub trait Escaper {
    fn escape(&self, raw: &str) -> String;
}

impl<F> Escaper for F
where
    F: Fn(&str) -> String,
{
    fn escape(&self, raw: &str) -> String {
        self(raw)
    }
}

/// MySQL `escape_string` rules: backslash-escapes quotes, backslashes and control
/// characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlEscaper;

impl Escaper for MysqlEscaper {
    fn escape(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        for c in raw.chars() {
            match c {
                '\0' => out.push_str("\\0"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\\' => out.push_str("\\\\"),
                '\'' => out.push_str("\\'"),
                '"' => out.push_str("\\\""),
                '\x1a' => out.push_str("\\Z"),
                c => out.push(c),
            }
        }
        out
    }
}

/// Standard SQL: single quotes are doubled, everything else is literal.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiEscaper;

impl Escaper for AnsiEscaper {
    fn escape(&self, raw: &str) -> String {
        raw.replace('\'', "''")
    }
}

/// How field names that are SQL reserved words get quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldQuoting {
    /// Emit field names exactly as written.
    #[default]
    None,
    /// `"order"`
    Ansi,
    /// `` `order` ``
    Backtick,
}

/// SQL reserved words that must be quoted when used as identifiers.
pub const RESERVED_WORDS: &[&str] = &[
    "all", "alter", "and", "as", "asc", "between", "by", "case", "check", "column",
    "constraint", "create", "default", "delete", "desc", "distinct", "drop", "else",
    "end", "exists", "false", "foreign", "from", "group", "having", "in", "index",
    "inner", "insert", "is", "join", "key", "left", "like", "limit", "not", "null",
    "offset", "on", "or", "order", "outer", "primary", "references", "right", "select",
    "table", "then", "to", "true", "union", "update", "user", "values", "when", "where",
];

/// Case-insensitive lookup in [`RESERVED_WORDS`].
pub fn is_reserved_word(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    RESERVED_WORDS.contains(&lower.as_str())
}

impl FieldQuoting {
    /// Quote `name` if it is a reserved word and quoting is enabled.
    pub fn apply<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if !is_reserved_word(name) {
            return Cow::Borrowed(name);
        }
        match self {
            FieldQuoting::None => Cow::Borrowed(name),
            FieldQuoting::Ansi => Cow::Owned(format!("\"{}\"", name.replace('"', "\"\""))),
            FieldQuoting::Backtick => Cow::Owned(format!("`{}`", name.replace('`', "``"))),
        }
    }
}

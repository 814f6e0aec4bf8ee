//! Framing a caller's statement for a specific engine.
//!
//! Callers write parameters as `@name`, whatever the engine. Binding turns
//! each reference to a payload field into the engine's positional
//! placeholder and collects the values in the matching order. The rest of
//! the SQL text is passed through untouched.

use crate::types::{Parameters, SqlValue};

/// How the statement text is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommandType {
    /// Literal SQL text.
    #[default]
    Text,
    /// The name of a stored routine, called with the payload as arguments.
    StoredProcedure,
}

impl From<bool> for CommandType {
    fn from(is_stored_procedure: bool) -> Self {
        if is_stored_procedure {
            CommandType::StoredProcedure
        } else {
            CommandType::Text
        }
    }
}

/// Placeholder and quoting conventions of a database engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `@P1, @P2, ...`
    SqlServer,
    /// `?`
    MySql,
    /// `$1, $2, ...`
    Postgres,
}

impl Dialect {
    /// The placeholder for the `n`th (1-based) bound value.
    fn placeholder(self, n: usize) -> String {
        match self {
            Dialect::SqlServer => format!("@P{}", n),
            Dialect::MySql => "?".to_string(),
            Dialect::Postgres => format!("${}", n),
        }
    }

    fn numbered(self) -> bool {
        !matches!(self, Dialect::MySql)
    }

    fn backslash_escapes(self) -> bool {
        matches!(self, Dialect::MySql)
    }
}

/// Whether the statement is expected to return rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Query,
    Execute,
}

/// A statement ready to hand to a driver.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    pub sql: String,
    pub params: Vec<SqlValue>,
    pub command_type: CommandType,
    pub kind: StatementKind,
}

impl BoundStatement {
    /// Frame `sql` for `dialect` with the given parameters.
    pub fn bind(
        dialect: Dialect,
        sql: &str,
        parameters: &Parameters,
        command_type: CommandType,
        kind: StatementKind,
    ) -> Self {
        let (sql, params) = match command_type {
            CommandType::Text => rewrite_placeholders(dialect, sql, parameters),
            CommandType::StoredProcedure => frame_procedure(dialect, sql.trim(), parameters, kind),
        };

        Self {
            sql,
            params,
            command_type,
            kind,
        }
    }
}

fn frame_procedure(
    dialect: Dialect,
    name: &str,
    parameters: &Parameters,
    kind: StatementKind,
) -> (String, Vec<SqlValue>) {
    let params: Vec<SqlValue> = parameters.iter().map(|(_, v)| v.clone()).collect();
    let names = parameters.iter().map(|(n, _)| n.trim_start_matches('@'));

    let sql = match dialect {
        Dialect::SqlServer => {
            let args: Vec<String> = names
                .enumerate()
                .map(|(i, n)| format!("@{} = {}", n, dialect.placeholder(i + 1)))
                .collect();
            if args.is_empty() {
                format!("EXEC {}", name)
            } else {
                format!("EXEC {} {}", name, args.join(", "))
            }
        }
        // MySQL has no named arguments; payload order is argument order
        Dialect::MySql => {
            let args = vec!["?"; params.len()];
            format!("CALL {}({})", name, args.join(", "))
        }
        Dialect::Postgres => {
            let args: Vec<String> = names
                .enumerate()
                .map(|(i, n)| format!("{} => {}", n, dialect.placeholder(i + 1)))
                .collect();
            match kind {
                StatementKind::Query => format!("SELECT * FROM {}({})", name, args.join(", ")),
                StatementKind::Execute => format!("CALL {}({})", name, args.join(", ")),
            }
        }
    };

    (sql, params)
}

fn rewrite_placeholders(
    dialect: Dialect,
    sql: &str,
    parameters: &Parameters,
) -> (String, Vec<SqlValue>) {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len() + 8);
    let mut params = Vec::new();
    // Placeholder number already assigned to each payload entry
    let mut assigned: Vec<Option<usize>> = vec![None; parameters.len()];
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        let next = bytes.get(i + 1).copied();
        i = match (bytes[i], next) {
            (b'E' | b'e', Some(b'\''))
                if dialect == Dialect::Postgres && !follows_ident(bytes, i) =>
            {
                skip_quoted(bytes, i + 1, b'\'', true)
            }
            (b'\'', _) => skip_quoted(bytes, i, b'\'', dialect.backslash_escapes()),
            (b'"', _) => skip_quoted(bytes, i, b'"', dialect.backslash_escapes()),
            (b'`', _) if dialect == Dialect::MySql => skip_quoted(bytes, i, b'`', false),
            (b'[', _) if dialect == Dialect::SqlServer => skip_past(bytes, i + 1, b"]"),
            (b'-', Some(b'-')) => skip_past(bytes, i + 2, b"\n"),
            (b'/', Some(b'*')) => skip_past(bytes, i + 2, b"*/"),
            (b'$', _) if dialect == Dialect::Postgres => skip_dollar_quoted(bytes, i),
            (b'@', Some(b'@')) => ident_end(bytes, i + 2),
            (b'@', Some(c)) if is_ident_start(c) => {
                let end = ident_end(bytes, i + 1);
                let name = &sql[i + 1..end];
                if let Some(index) = parameters.position(name) {
                    let number = match assigned[index] {
                        Some(n) if dialect.numbered() => n,
                        _ => {
                            params.extend(parameters.iter().nth(index).map(|(_, v)| v.clone()));
                            assigned[index] = Some(params.len());
                            params.len()
                        }
                    };
                    out.push_str(&sql[copied..i]);
                    out.push_str(&dialect.placeholder(number));
                    copied = end;
                }
                end
            }
            _ => i + 1,
        };
    }

    out.push_str(&sql[copied..]);
    (out, params)
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn follows_ident(bytes: &[u8], at: usize) -> bool {
    at > 0 && (bytes[at - 1].is_ascii_alphanumeric() || bytes[at - 1] == b'_')
}

fn ident_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|c| !(c.is_ascii_alphanumeric() || *c == b'_'))
        .map_or(bytes.len(), |n| from + n)
}

/// Index just past the closing `quote`. A doubled quote re-enters on the next
/// scan step, which has the same effect as treating it as an escape.
fn skip_quoted(bytes: &[u8], start: usize, quote: u8, backslash_escapes: bool) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if backslash_escapes => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn skip_past(bytes: &[u8], from: usize, terminator: &[u8]) -> usize {
    find(bytes, from, terminator).map_or(bytes.len(), |at| at + terminator.len())
}

/// Skips a `$tag$ ... $tag$` body. Anything else starting with `$` (such as a
/// literal `$1` the caller wrote) is stepped over one byte at a time.
fn skip_dollar_quoted(bytes: &[u8], start: usize) -> usize {
    let tag_end = ident_end(bytes, start + 1);
    let opens = bytes.get(tag_end) == Some(&b'$')
        && bytes.get(start + 1).map_or(false, |c| *c == b'$' || is_ident_start(*c));
    if !opens {
        return start + 1;
    }
    let tag = &bytes[start..=tag_end];
    skip_past(bytes, tag_end + 1, tag)
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|n| from + n)
}

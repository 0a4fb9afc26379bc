//! Token Query Builder
//!
//! Composes WHERE clauses for the `tokens` table from typed predicate
//! fragments. Column names come from [`Column`] only; every caller-supplied
//! value is emitted as a `?` placeholder and returned as a bind value.

use chrono::{DateTime, Utc};

/// SQLite `datetime()` text format of the `now` bind
const SQLITE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Columns of the `tokens` table that can appear in predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Network,
    Testnet,
    Address,
    Ticker,
    Categories,
    Enabled,
    Expiration,
    Upcoming,
}

impl Column {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Testnet => "testnet",
            Self::Address => "address",
            Self::Ticker => "ticker",
            Self::Categories => "categories",
            Self::Enabled => "enabled",
            Self::Expiration => "expiration",
            Self::Upcoming => "upcoming",
        }
    }
}

/// Left-hand side of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expr {
    Col(Column),
    Upper(Column),
}

impl Expr {
    fn render(self) -> String {
        match self {
            Self::Col(column) => column.as_sql().to_string(),
            Self::Upper(column) => format!("UPPER({})", column.as_sql()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Gt,
    Le,
}

impl Comparison {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Le => "<=",
        }
    }
}

/// A bound parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Integer(i64::from(value))
    }
}

/// One conjunct of a WHERE clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `expr op ?`
    Compare { expr: Expr, op: Comparison, value: SqlValue },
    /// `(column IS NULL OR datetime(column) op datetime(?))`; both sides are
    /// normalized so ISO-8601 text with `T` or `Z` compares correctly
    NullOrDatetime { column: Column, op: Comparison, value: SqlValue },
    /// `column LIKE ? ESCAPE '\'` with the prefix escaped and `%` appended
    StartsWith { column: Column, prefix: String },
    /// `expr IN (?, ...)`
    InList { expr: Expr, values: Vec<SqlValue> },
    /// The JSON array in `column` contains any of the values
    JsonArrayContainsAny { column: Column, values: Vec<SqlValue> },
}

impl Predicate {
    #[must_use]
    pub fn eq(column: Column, value: impl Into<SqlValue>) -> Self {
        Self::Compare {
            expr: Expr::Col(column),
            op: Comparison::Eq,
            value: value.into(),
        }
    }

    fn render(&self, sql: &mut String, binds: &mut Vec<SqlValue>) {
        match self {
            Self::Compare { expr, op, value } => {
                sql.push_str(&format!("{} {} ?", expr.render(), op.as_sql()));
                binds.push(value.clone());
            }
            Self::NullOrDatetime { column, op, value } => {
                let name = column.as_sql();
                sql.push_str(&format!("({name} IS NULL OR datetime({name}) {} datetime(?))", op.as_sql()));
                binds.push(value.clone());
            }
            Self::StartsWith { column, prefix } => {
                sql.push_str(&format!("{} LIKE ? ESCAPE '\\'", column.as_sql()));
                binds.push(SqlValue::Text(format!("{}%", escape_like(prefix))));
            }
            Self::InList { expr, values } => {
                if values.is_empty() {
                    sql.push_str("1 = 0");
                    return;
                }
                sql.push_str(&format!("{} IN ({})", expr.render(), placeholders(values.len())));
                binds.extend(values.iter().cloned());
            }
            Self::JsonArrayContainsAny { column, values } => {
                if values.is_empty() {
                    sql.push_str("1 = 0");
                    return;
                }
                // Malformed JSON reads as an empty array
                let name = column.as_sql();
                sql.push_str(&format!(
                    "EXISTS (SELECT 1 FROM json_each(CASE WHEN json_valid({name}) THEN {name} ELSE '[]' END) \
                     WHERE json_each.value IN ({}))",
                    placeholders(values.len())
                ));
                binds.extend(values.iter().cloned());
            }
        }
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Rendered WHERE clause and its bind values, in placeholder order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereClause {
    pub sql: String,
    pub binds: Vec<SqlValue>,
}

/// Conjunctive predicate list for the `tokens` table
#[derive(Debug, Clone, Default)]
pub struct TokenQueryBuilder {
    predicates: Vec<Predicate>,
}

impl TokenQueryBuilder {
    /// Start from the visibility predicate: enabled, not expired, already live
    #[must_use]
    pub fn visible_at(now: DateTime<Utc>) -> Self {
        let now = now.format(SQLITE_DATETIME_FORMAT).to_string();
        Self::default()
            .filter(Predicate::eq(Column::Enabled, true))
            .filter(Predicate::NullOrDatetime {
                column: Column::Expiration,
                op: Comparison::Gt,
                value: SqlValue::Text(now.clone()),
            })
            .filter(Predicate::NullOrDatetime {
                column: Column::Upcoming,
                op: Comparison::Le,
                value: SqlValue::Text(now),
            })
    }

    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    #[must_use]
    pub fn build(&self) -> WhereClause {
        let mut sql = String::new();
        let mut binds = Vec::new();

        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                sql.push_str(" AND ");
            }
            predicate.render(&mut sql, &mut binds);
        }
        if sql.is_empty() {
            sql.push_str("1 = 1");
        }

        WhereClause { sql, binds }
    }
}

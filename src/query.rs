//! Query filters rendered into URL fragments
//!
//! A request descriptor treats its query as opaque text: it asks the query
//! to render itself and appends the result to the URL. `UsergridQuery` is
//! the builder for Usergrid's `ql` query language plus the `limit` and
//! `cursor` paging parameters.

use crate::types::JsonValue;
use std::fmt;
use std::sync::Arc;
use url::form_urlencoded;

/// A filter that renders itself as a URL fragment
pub trait Query: Send + Sync + fmt::Debug {
    /// Render the fragment, beginning with `?` when `leading_connector` is
    /// true and `&` otherwise. An empty query renders as the empty string.
    fn render(&self, leading_connector: bool) -> String;

    /// Copy of this query positioned at `cursor`, for queries that carry
    /// their own paging cursor. `None` leaves paging to a URL parameter.
    fn with_cursor(&self, _cursor: &str) -> Option<Arc<dyn Query>> {
        None
    }
}

/// Sort direction for `order by`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Builder for Usergrid `ql` queries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsergridQuery {
    raw_ql: Option<String>,
    clauses: Vec<String>,
    next_connector: Option<&'static str>,
    order: Vec<(String, SortOrder)>,
    limit: Option<u32>,
    cursor: Option<String>,
}

impl UsergridQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a hand-written `ql` string instead of the clause builder
    #[must_use]
    pub fn ql(mut self, ql: impl Into<String>) -> Self {
        self.raw_ql = Some(ql.into());
        self
    }

    #[must_use]
    pub fn eq(self, field: &str, value: impl Into<JsonValue>) -> Self {
        self.clause(field, "=", value.into())
    }

    #[must_use]
    pub fn gt(self, field: &str, value: impl Into<JsonValue>) -> Self {
        self.clause(field, ">", value.into())
    }

    #[must_use]
    pub fn gte(self, field: &str, value: impl Into<JsonValue>) -> Self {
        self.clause(field, ">=", value.into())
    }

    #[must_use]
    pub fn lt(self, field: &str, value: impl Into<JsonValue>) -> Self {
        self.clause(field, "<", value.into())
    }

    #[must_use]
    pub fn lte(self, field: &str, value: impl Into<JsonValue>) -> Self {
        self.clause(field, "<=", value.into())
    }

    /// Full-text match on a field
    #[must_use]
    pub fn contains(self, field: &str, value: impl Into<String>) -> Self {
        self.clause(field, "contains", JsonValue::String(value.into()))
    }

    /// Join the next clause with `and` (the default)
    #[must_use]
    pub fn and(mut self) -> Self {
        self.next_connector = Some("and");
        self
    }

    /// Join the next clause with `or`
    #[must_use]
    pub fn or(mut self) -> Self {
        self.next_connector = Some("or");
        self
    }

    #[must_use]
    pub fn asc(mut self, field: impl Into<String>) -> Self {
        self.order.push((field.into(), SortOrder::Asc));
        self
    }

    #[must_use]
    pub fn desc(mut self, field: impl Into<String>) -> Self {
        self.order.push((field.into(), SortOrder::Desc));
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resume from a cursor returned by a previous response
    #[must_use]
    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    fn clause(mut self, field: &str, op: &str, value: JsonValue) -> Self {
        let connector = self.next_connector.take().unwrap_or("and");
        if !self.clauses.is_empty() {
            self.clauses.push(connector.to_string());
        }
        self.clauses
            .push(format!("{field} {op} {}", format_value(&value)));
        self
    }

    /// The `ql` text, if the query has any filter or ordering
    pub fn ql_string(&self) -> Option<String> {
        if let Some(raw) = &self.raw_ql {
            return Some(raw.clone());
        }
        if self.clauses.is_empty() && self.order.is_empty() {
            return None;
        }

        let mut ql = String::from("select *");
        if !self.clauses.is_empty() {
            ql.push_str(" where ");
            ql.push_str(&self.clauses.join(" "));
        }
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|(field, dir)| format!("{field} {}", dir.as_str()))
                .collect::<Vec<_>>()
                .join(", ");
            ql.push_str(" order by ");
            ql.push_str(&order);
        }
        Some(ql)
    }
}

impl Query for UsergridQuery {
    fn render(&self, leading_connector: bool) -> String {
        let mut params = form_urlencoded::Serializer::new(String::new());
        if let Some(ql) = self.ql_string() {
            params.append_pair("ql", &ql);
        }
        if let Some(limit) = self.limit {
            params.append_pair("limit", &limit.to_string());
        }
        if let Some(cursor) = &self.cursor {
            params.append_pair("cursor", cursor);
        }

        let encoded = params.finish();
        if encoded.is_empty() {
            return encoded;
        }
        let connector = if leading_connector { '?' } else { '&' };
        format!("{connector}{encoded}")
    }

    fn with_cursor(&self, cursor: &str) -> Option<Arc<dyn Query>> {
        Some(Arc::new(self.clone().cursor(cursor)))
    }
}

/// Strings are single-quoted with embedded quotes escaped; everything else
/// is written as its JSON text.
fn format_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => format!("'{}'", s.replace('\'', "\\'")),
        other => other.to_string(),
    }
}

//! Admin repository implementation
//!
//! Generic, JSON-returning queries behind the admin list and detail views.
//! Table and column names always come from the static admin registry, never
//! from a request; request values are only ever bound as parameters.

use std::time::Instant;

use sqlx::{PgPool, Postgres, QueryBuilder};
use crate::utils::errors::SchoolDeskError;
use crate::utils::logging::log_database_operation;

/// A list view query over one table
#[derive(Debug, Clone)]
pub struct TableQuery<'a> {
    pub table: &'static str,
    pub columns: Vec<&'static str>,
    pub search_fields: &'static [&'static str],
    /// Column names prefixed with `-` sort descending
    pub ordering: &'static [&'static str],
    pub search: Option<&'a str>,
    /// Exact matches, compared as text
    pub filters: Vec<(&'static str, &'a str)>,
    pub limit: i64,
    pub offset: i64,
}

fn push_where<'a>(builder: &mut QueryBuilder<'a, Postgres>, query: &TableQuery<'a>) {
    let mut has_clause = false;
    let mut keyword = |builder: &mut QueryBuilder<'a, Postgres>| {
        builder.push(if has_clause { " AND " } else { " WHERE " });
        has_clause = true;
    };

    for (column, value) in &query.filters {
        keyword(builder);
        builder.push(format!("{}::text = ", column));
        builder.push_bind(*value);
    }

    if let Some(search) = query.search.filter(|s| !s.trim().is_empty()) {
        if !query.search_fields.is_empty() {
            keyword(builder);
            let pattern = format!("%{}%", escape_like(search.trim()));
            builder.push("(");
            for (index, field) in query.search_fields.iter().enumerate() {
                if index > 0 {
                    builder.push(" OR ");
                }
                builder.push(format!("{}::text ILIKE ", field));
                builder.push_bind(pattern.clone());
            }
            builder.push(")");
        }
    }
}

fn order_clause(ordering: &[&str]) -> String {
    let mut terms: Vec<String> = ordering
        .iter()
        .map(|term| match term.strip_prefix('-') {
            Some(column) => format!("{} DESC", column),
            None => format!("{} ASC", term),
        })
        .collect();
    terms.push("id ASC".to_string());
    format!(" ORDER BY {}", terms.join(", "))
}

/// Escape `%`, `_` and `\` so user text matches literally inside ILIKE
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Clone)]
#[derive(Debug)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Rows of a list view as JSON objects holding `query.columns`
    pub async fn list_rows(&self, query: &TableQuery<'_>) -> Result<Vec<serde_json::Value>, SchoolDeskError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT row_to_json(t) FROM (SELECT ");
        builder.push(query.columns.join(", "));
        builder.push(" FROM ");
        builder.push(query.table);
        push_where(&mut builder, query);
        builder.push(order_clause(query.ordering));
        builder.push(" LIMIT ");
        builder.push_bind(query.limit);
        builder.push(" OFFSET ");
        builder.push_bind(query.offset);
        builder.push(") t");

        let started = Instant::now();
        let rows: Result<Vec<(serde_json::Value,)>, sqlx::Error> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await;
        log_database_operation("list", query.table, started.elapsed().as_millis() as u64, rows.is_ok());

        Ok(rows?.into_iter().map(|(row,)| row).collect())
    }

    /// Number of rows matching a list view's search and filters
    pub async fn count_rows(&self, query: &TableQuery<'_>) -> Result<i64, SchoolDeskError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM ");
        builder.push(query.table);
        push_where(&mut builder, query);

        let count: (i64,) = builder
            .build_query_as()
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// One row as a JSON object holding `columns`
    pub async fn find_row(
        &self,
        table: &'static str,
        columns: &'static [&'static str],
        id: i64,
    ) -> Result<Option<serde_json::Value>, SchoolDeskError> {
        let sql = format!(
            "SELECT row_to_json(t) FROM (SELECT {} FROM {} WHERE id = $1) t",
            columns.join(", "),
            table
        );
        let row: Option<(serde_json::Value,)> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(row,)| row))
    }

    /// Row counts for every given table
    pub async fn get_stats(&self, tables: &[&'static str]) -> Result<serde_json::Value, SchoolDeskError> {
        let mut stats = serde_json::Map::new();
        for table in tables {
            let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
                .fetch_one(&self.pool)
                .await?;
            stats.insert(table.to_string(), serde_json::json!(count.0));
        }

        Ok(serde_json::Value::Object(stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_query<'a>(search: Option<&'a str>, filters: Vec<(&'static str, &'a str)>) -> TableQuery<'a> {
        TableQuery {
            table: "academic_calendars",
            columns: vec!["id", "year"],
            search_fields: &["year"],
            ordering: &["-year"],
            search,
            filters,
            limit: 10,
            offset: 0,
        }
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_order_clause_appends_id() {
        assert_eq!(order_clause(&["-year", "code"]), " ORDER BY year DESC, code ASC, id ASC");
        assert_eq!(order_clause(&[]), " ORDER BY id ASC");
    }

    #[test]
    fn test_where_clause_binds_values() {
        let query = sample_query(Some(" 2024 "), vec![("year", "2024")]);
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM academic_calendars");
        push_where(&mut builder, &query);
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM academic_calendars WHERE year::text = $1 AND (year::text ILIKE $2)"
        );
    }

    #[test]
    fn test_blank_search_adds_no_clause() {
        let query = sample_query(Some("   "), vec![]);
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM academic_calendars");
        push_where(&mut builder, &query);
        assert_eq!(builder.sql(), "SELECT 1 FROM academic_calendars");
    }
}

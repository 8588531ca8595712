//! Table/column predicate queries: the `select`/`eq`/`order`/`range`,
//! `update` and `insert` calls the handlers need, rendered as parameterized
//! SQL with typed binds.

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};

use super::manager::{DatabaseError, DatabaseManager};
use super::value::{bind_query, bind_query_as, SqlValue};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Inclusive row range, `range(0, 19)` is the first twenty rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub from: i64,
    pub to: i64,
}

impl Range {
    pub fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }

    pub fn limit(&self) -> i64 {
        self.to - self.from + 1
    }
}

#[derive(Debug, Clone)]
enum Condition {
    Eq(String, SqlValue),
    Gte(String, SqlValue),
    ILike(String, String),
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlValue>,
}

struct Params {
    values: Vec<SqlValue>,
}

impl Params {
    fn new() -> Self {
        Self { values: vec![] }
    }

    fn push(&mut self, value: SqlValue) -> String {
        self.values.push(value);
        format!("${}", self.values.len())
    }
}

fn render_conditions(conditions: &[Condition], params: &mut Params) -> Result<String, DatabaseError> {
    let mut parts = Vec::with_capacity(conditions.len());
    for condition in conditions {
        let sql = match condition {
            Condition::Eq(col, v) => format!("{} = {}", DatabaseManager::quote_identifier(col)?, params.push(v.clone())),
            Condition::Gte(col, v) => format!("{} >= {}", DatabaseManager::quote_identifier(col)?, params.push(v.clone())),
            Condition::ILike(col, pattern) => format!(
                "{} ILIKE {}",
                DatabaseManager::quote_identifier(col)?,
                params.push(SqlValue::Text(pattern.clone()))
            ),
        };
        parts.push(sql);
    }
    Ok(parts.join(" AND "))
}

/// Escape `%`, `_` and `\` so user text matches literally inside ILIKE.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

pub struct Select {
    table: String,
    conditions: Vec<Condition>,
    order: Vec<(String, SortDirection)>,
    range: Option<Range>,
}

impl Select {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            conditions: vec![],
            order: vec![],
            range: None,
        }
    }

    pub fn eq(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions.push(Condition::Eq(column.to_string(), value.into()));
        self
    }

    /// `eq` only when a value is present
    pub fn eq_opt<V: Into<SqlValue>>(self, column: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.eq(column, v),
            None => self,
        }
    }

    pub fn gte(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions.push(Condition::Gte(column.to_string(), value.into()));
        self
    }

    pub fn ilike(mut self, column: &str, pattern: impl Into<String>) -> Self {
        self.conditions.push(Condition::ILike(column.to_string(), pattern.into()));
        self
    }

    pub fn order(mut self, column: &str, direction: SortDirection) -> Self {
        self.order.push((column.to_string(), direction));
        self
    }

    pub fn range(mut self, from: i64, to: i64) -> Self {
        self.range = Some(Range::new(from, to));
        self
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    pub fn to_sql(&self) -> Result<SqlResult, DatabaseError> {
        let mut params = Params::new();
        let where_clause = render_conditions(&self.conditions, &mut params)?;

        let mut parts = vec![
            "SELECT *".to_string(),
            format!("FROM {}", DatabaseManager::quote_identifier(&self.table)?),
        ];
        if !where_clause.is_empty() {
            parts.push(format!("WHERE {}", where_clause));
        }
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|(c, d)| Ok(format!("{} {}", DatabaseManager::quote_identifier(c)?, d.to_sql())))
                .collect::<Result<Vec<String>, DatabaseError>>()?;
            parts.push(format!("ORDER BY {}", order.join(", ")));
        }
        if let Some(range) = self.range {
            if range.from < 0 || range.to < range.from {
                return Err(DatabaseError::InvalidQuery(format!("invalid range {}..={}", range.from, range.to)));
            }
            parts.push(format!("LIMIT {} OFFSET {}", range.limit(), range.from));
        }

        Ok(SqlResult { query: parts.join(" "), params: params.values })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, DatabaseError> {
        let mut params = Params::new();
        let where_clause = render_conditions(&self.conditions, &mut params)?;
        let mut query = format!(
            "SELECT COUNT(*) AS count FROM {}",
            DatabaseManager::quote_identifier(&self.table)?
        );
        if !where_clause.is_empty() {
            query.push_str(&format!(" WHERE {}", where_clause));
        }
        Ok(SqlResult { query, params: params.values })
    }

    pub async fn fetch_all<T>(&self, pool: &PgPool) -> Result<Vec<T>, DatabaseError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.to_sql()?.fetch_all(pool).await
    }

    pub async fn fetch_optional<T>(&self, pool: &PgPool) -> Result<Option<T>, DatabaseError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.to_sql()?.fetch_optional(pool).await
    }

    pub async fn count(&self, pool: &PgPool) -> Result<i64, DatabaseError> {
        let sql_result = self.to_count_sql()?;
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }
}

pub struct Update {
    table: String,
    assignments: Vec<(String, SqlValue)>,
    conditions: Vec<Condition>,
}

impl Update {
    pub fn table(table: impl Into<String>) -> Self {
        Self { table: table.into(), assignments: vec![], conditions: vec![] }
    }

    pub fn set(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.assignments.push((column.to_string(), value.into()));
        self
    }

    pub fn set_opt<V: Into<SqlValue>>(self, column: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    pub fn eq(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions.push(Condition::Eq(column.to_string(), value.into()));
        self
    }

    pub fn to_sql(&self) -> Result<SqlResult, DatabaseError> {
        if self.assignments.is_empty() {
            return Err(DatabaseError::InvalidQuery("update without columns".to_string()));
        }
        // Unfiltered updates are never issued by handlers
        if self.conditions.is_empty() {
            return Err(DatabaseError::InvalidQuery("update without conditions".to_string()));
        }

        let mut params = Params::new();
        let mut sets = Vec::with_capacity(self.assignments.len());
        for (column, value) in &self.assignments {
            sets.push(format!("{} = {}", DatabaseManager::quote_identifier(column)?, params.push(value.clone())));
        }
        let where_clause = render_conditions(&self.conditions, &mut params)?;

        Ok(SqlResult {
            query: format!(
                "UPDATE {} SET {} WHERE {} RETURNING *",
                DatabaseManager::quote_identifier(&self.table)?,
                sets.join(", "),
                where_clause
            ),
            params: params.values,
        })
    }

    /// Returns the updated row, or `NotFound` when no row matched.
    pub async fn fetch_one<T>(&self, pool: &PgPool) -> Result<T, DatabaseError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.to_sql()?
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("no matching row in {}", self.table)))
    }
}

pub struct Insert {
    table: String,
    values: Vec<(String, SqlValue)>,
    conflict_columns: Vec<String>,
}

impl Insert {
    pub fn table(table: impl Into<String>) -> Self {
        Self { table: table.into(), values: vec![], conflict_columns: vec![] }
    }

    pub fn value(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.values.push((column.to_string(), value.into()));
        self
    }

    /// Absent values are left to the column default.
    pub fn value_opt<V: Into<SqlValue>>(self, column: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.value(column, v),
            None => self,
        }
    }

    /// Turn the insert into an upsert keyed on the given columns.
    pub fn on_conflict(mut self, columns: &[&str]) -> Self {
        self.conflict_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn to_sql(&self) -> Result<SqlResult, DatabaseError> {
        if self.values.is_empty() {
            return Err(DatabaseError::InvalidQuery("insert without columns".to_string()));
        }

        let mut params = Params::new();
        let mut columns = Vec::with_capacity(self.values.len());
        let mut placeholders = Vec::with_capacity(self.values.len());
        for (column, value) in &self.values {
            columns.push(DatabaseManager::quote_identifier(column)?);
            placeholders.push(params.push(value.clone()));
        }

        let mut query = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            DatabaseManager::quote_identifier(&self.table)?,
            columns.join(", "),
            placeholders.join(", ")
        );

        if !self.conflict_columns.is_empty() {
            let keys = self
                .conflict_columns
                .iter()
                .map(|c| DatabaseManager::quote_identifier(c))
                .collect::<Result<Vec<_>, _>>()?;
            let updates: Vec<String> = self
                .values
                .iter()
                .filter(|(c, _)| !self.conflict_columns.contains(c))
                .map(|(c, _)| format!("\"{c}\" = EXCLUDED.\"{c}\""))
                .collect();
            if updates.is_empty() {
                query.push_str(&format!(" ON CONFLICT ({}) DO NOTHING", keys.join(", ")));
            } else {
                query.push_str(&format!(" ON CONFLICT ({}) DO UPDATE SET {}", keys.join(", "), updates.join(", ")));
            }
        }

        query.push_str(" RETURNING *");
        Ok(SqlResult { query, params: params.values })
    }

    pub async fn fetch_one<T>(&self, pool: &PgPool) -> Result<T, DatabaseError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.to_sql()?.fetch_one(pool).await
    }

    pub async fn execute(&self, pool: &PgPool) -> Result<u64, DatabaseError> {
        self.to_sql()?.execute(pool).await
    }
}

impl SqlResult {
    pub async fn fetch_all<T>(&self, pool: &PgPool) -> Result<Vec<T>, DatabaseError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut q = sqlx::query_as::<_, T>(&self.query);
        for p in self.params.iter() {
            q = bind_query_as(q, p);
        }
        Ok(q.fetch_all(pool).await?)
    }

    pub async fn fetch_optional<T>(&self, pool: &PgPool) -> Result<Option<T>, DatabaseError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut q = sqlx::query_as::<_, T>(&self.query);
        for p in self.params.iter() {
            q = bind_query_as(q, p);
        }
        Ok(q.fetch_optional(pool).await?)
    }

    pub async fn fetch_one<T>(&self, pool: &PgPool) -> Result<T, DatabaseError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut q = sqlx::query_as::<_, T>(&self.query);
        for p in self.params.iter() {
            q = bind_query_as(q, p);
        }
        Ok(q.fetch_one(pool).await?)
    }

    pub async fn execute(&self, pool: &PgPool) -> Result<u64, DatabaseError> {
        let mut q = sqlx::query(&self.query);
        for p in self.params.iter() {
            q = bind_query(q, p);
        }
        Ok(q.execute(pool).await?.rows_affected())
    }
}

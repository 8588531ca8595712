use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{FromRow, Postgres};
use uuid::Uuid;

/// A bind parameter with its Postgres type preserved.
///
/// Binding everything as text would make `uuid = text` comparisons fail on
/// the server, so each variant binds with its native type.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Bool(bool),
    Int(i64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Decimal(Decimal),
    Json(Value),
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v as i64)
    }
}

impl From<i16> for SqlValue {
    fn from(v: i16) -> Self {
        SqlValue::Int(v as i64)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        SqlValue::Uuid(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

impl From<Value> for SqlValue {
    fn from(v: Value) -> Self {
        SqlValue::Json(v)
    }
}

pub(crate) fn bind_query<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    v: &'q SqlValue,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match v {
        SqlValue::Bool(b) => q.bind(*b),
        SqlValue::Int(i) => q.bind(*i),
        SqlValue::Text(s) => q.bind(s.as_str()),
        SqlValue::Uuid(u) => q.bind(*u),
        SqlValue::Timestamp(t) => q.bind(*t),
        SqlValue::Decimal(d) => q.bind(*d),
        SqlValue::Json(j) => q.bind(j), // JSONB
    }
}

pub(crate) fn bind_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    v: &'q SqlValue,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        SqlValue::Bool(b) => q.bind(*b),
        SqlValue::Int(i) => q.bind(*i),
        SqlValue::Text(s) => q.bind(s.as_str()),
        SqlValue::Uuid(u) => q.bind(*u),
        SqlValue::Timestamp(t) => q.bind(*t),
        SqlValue::Decimal(d) => q.bind(*d),
        SqlValue::Json(j) => q.bind(j),
    }
}

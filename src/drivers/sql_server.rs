use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use tiberius::{Client, ColumnData, Config, FromSql, Query, Row};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::error::{DbAccessError, Result};
use crate::statement::{BoundStatement, Dialect};
use crate::traits::DatabaseDriver;
use crate::types::{RawQueryResult, SqlValue};

type SqlServerClient = Client<Compat<TcpStream>>;

/// SQL Server driver implementation using tiberius.
///
/// Expects an ADO.NET style connection string, e.g.
/// `Server=tcp:localhost,1433;User Id=sa;Password=...;TrustServerCertificate=true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDriver;

impl SqlServerDriver {
    pub fn new() -> Self {
        Self
    }
}

async fn open(connection_string: &str) -> Result<SqlServerClient> {
    let config = Config::from_ado_string(connection_string).map_err(DbAccessError::connection)?;

    tracing::debug!(engine = "mssql", addr = %config.get_addr(), "opening connection");
    let tcp = TcpStream::connect(config.get_addr())
        .await
        .map_err(DbAccessError::connection)?;
    tcp.set_nodelay(true).map_err(DbAccessError::connection)?;

    Client::connect(config, tcp.compat_write())
        .await
        .map_err(DbAccessError::connection)
}

async fn close(client: SqlServerClient) {
    if let Err(e) = client.close().await {
        tracing::debug!(engine = "mssql", error = %e, "connection closed with error");
    } else {
        tracing::debug!(engine = "mssql", "connection closed");
    }
}

fn build_query(statement: &BoundStatement) -> Query<'_> {
    let mut query = Query::new(statement.sql.as_str());
    for value in &statement.params {
        match value {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Int64(i) => query.bind(*i),
            SqlValue::Float64(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.clone()),
            SqlValue::Bytes(b) => query.bind(b.clone()),
            SqlValue::Json(v) => query.bind(v.to_string()),
        }
    }
    query
}

async fn run_query(client: &mut SqlServerClient, statement: &BoundStatement) -> Result<Vec<Row>> {
    build_query(statement)
        .query(client)
        .await
        .map_err(DbAccessError::query)?
        .into_first_result()
        .await
        .map_err(DbAccessError::query)
}

async fn run_execute(client: &mut SqlServerClient, statement: &BoundStatement) -> Result<u64> {
    let result = build_query(statement)
        .execute(client)
        .await
        .map_err(DbAccessError::query)?;
    Ok(result.total())
}

#[async_trait]
impl DatabaseDriver for SqlServerDriver {
    fn dialect(&self) -> Dialect {
        Dialect::SqlServer
    }

    async fn query(
        &self,
        connection_string: &str,
        statement: &BoundStatement,
    ) -> Result<RawQueryResult> {
        let mut client = open(connection_string).await?;
        let outcome = run_query(&mut client, statement).await;
        close(client).await;

        let rows = outcome?;
        tracing::trace!(engine = "mssql", rows = rows.len(), "query completed");

        // Extract column names
        let columns: Vec<String> = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let result_rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .enumerate()
                    .map(|(i, data)| decode_column(&columns, i, data))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RawQueryResult::new(columns, result_rows))
    }

    async fn execute(&self, connection_string: &str, statement: &BoundStatement) -> Result<u64> {
        let mut client = open(connection_string).await?;
        let outcome = run_execute(&mut client, statement).await;
        close(client).await;

        let affected = outcome?;
        tracing::trace!(engine = "mssql", affected, "statement completed");
        Ok(affected)
    }
}

/// Convert a column value to a SqlValue.
fn decode_column(columns: &[String], index: usize, data: ColumnData<'static>) -> Result<SqlValue> {
    fn convert<T>(data: &ColumnData<'static>) -> Result<Option<SqlValue>>
    where
        T: for<'a> FromSql<'a> + Into<SqlValue>,
    {
        Ok(T::from_sql(data).map_err(DbAccessError::query)?.map(Into::into))
    }

    let value = match data {
        ColumnData::U8(v) => v.map(|v| SqlValue::Int64(v.into())),
        ColumnData::I16(v) => v.map(|v| SqlValue::Int64(v.into())),
        ColumnData::I32(v) => v.map(|v| SqlValue::Int64(v.into())),
        ColumnData::I64(v) => v.map(SqlValue::Int64),
        ColumnData::F32(v) => v.map(|v| SqlValue::Float64(v.into())),
        ColumnData::F64(v) => v.map(SqlValue::Float64),
        ColumnData::Bit(v) => v.map(SqlValue::Bool),
        ColumnData::String(v) => v.map(|s| SqlValue::Text(s.into_owned())),
        ColumnData::Guid(v) => v.map(|g| SqlValue::Text(g.to_string())),
        ColumnData::Binary(v) => v.map(|b| SqlValue::Bytes(b.into_owned())),
        ColumnData::Numeric(_) => convert::<Decimal>(&data)?,
        ColumnData::Date(_) => convert::<NaiveDate>(&data)?,
        ColumnData::Time(_) => convert::<NaiveTime>(&data)?,
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            convert::<NaiveDateTime>(&data)?
        }
        ColumnData::DateTimeOffset(_) => convert::<DateTime<FixedOffset>>(&data)?,
        other => {
            return Err(DbAccessError::UnsupportedColumnType {
                column: columns.get(index).cloned().unwrap_or_default(),
                type_name: column_data_name(&other).to_string(),
            })
        }
    };

    Ok(value.unwrap_or(SqlValue::Null))
}

fn column_data_name(data: &ColumnData<'_>) -> &'static str {
    match data {
        ColumnData::Xml(_) => "xml",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use tiberius::numeric::Numeric;
    use tiberius::IntoSql;

    fn decode(data: ColumnData<'static>) -> SqlValue {
        decode_column(&["value".to_string()], 0, data).unwrap()
    }

    #[test]
    fn test_decode_scalars() {
        assert_eq!(decode(ColumnData::U8(Some(7))), SqlValue::Int64(7));
        assert_eq!(decode(ColumnData::I32(Some(-3))), SqlValue::Int64(-3));
        assert_eq!(decode(ColumnData::Bit(Some(true))), SqlValue::Bool(true));
        assert_eq!(decode(ColumnData::F32(Some(1.5))), SqlValue::Float64(1.5));
        assert_eq!(
            decode(ColumnData::String(Some(Cow::Borrowed("Ada")))),
            SqlValue::Text("Ada".to_string())
        );
        assert_eq!(
            decode(ColumnData::Binary(Some(Cow::Owned(vec![1, 2])))),
            SqlValue::Bytes(vec![1, 2])
        );
    }

    #[test]
    fn test_decode_null_of_any_type() {
        assert_eq!(decode(ColumnData::I64(None)), SqlValue::Null);
        assert_eq!(decode(ColumnData::String(None)), SqlValue::Null);
        assert_eq!(decode(ColumnData::Numeric(None)), SqlValue::Null);
        assert_eq!(decode(ColumnData::DateTime2(None)), SqlValue::Null);
    }

    #[test]
    fn test_decode_numeric_is_exact_text() {
        let numeric = Numeric::new_with_scale(12_345, 2);
        assert_eq!(
            decode(ColumnData::Numeric(Some(numeric))),
            SqlValue::Text("123.45".to_string())
        );
    }

    #[test]
    fn test_decode_temporal_as_iso_8601() {
        let date = NaiveDate::from_ymd_opt(1815, 12, 10).unwrap();
        let stamp = date.and_hms_opt(9, 30, 5).unwrap();

        assert_eq!(
            decode(date.into_sql()),
            SqlValue::Text("1815-12-10".to_string())
        );
        assert_eq!(
            decode(stamp.into_sql()),
            SqlValue::Text("1815-12-10T09:30:05".to_string())
        );
    }
}

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::blocking;
use crate::error::Result;
use crate::statement::{BoundStatement, CommandType, StatementKind};
use crate::traits::DatabaseDriver;
use crate::types::Parameters;

/// Generic load and save operations against a relational database.
///
/// Every operation takes the statement text (or stored-procedure name), a
/// parameter payload whose fields are referenced as `@name`, the connection
/// string, and the [`CommandType`]. Each call opens its own connection and
/// closes it before returning. Driver failures are returned unchanged.
///
/// The blocking variants drive the async ones on a private runtime, so both
/// give identical results for identical inputs. Called from a thread that
/// already runs a tokio runtime, they block that thread until done.
///
/// Implemented for every [`DatabaseDriver`].
#[async_trait]
pub trait DatabaseAccess: Send + Sync {
    /// Load all rows returned by the statement, in the order the database
    /// returned them.
    fn load_data<T, U>(
        &self,
        sql: &str,
        parameters: &U,
        connection_string: &str,
        command_type: CommandType,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        U: Serialize + ?Sized;

    /// Async variant of [`load_data`](DatabaseAccess::load_data).
    async fn load_data_async<T, U>(
        &self,
        sql: &str,
        parameters: &U,
        connection_string: &str,
        command_type: CommandType,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
        U: Serialize + Sync + ?Sized;

    /// Load the first row returned by the statement, or `None` if there is none.
    fn load_single_data<T, U>(
        &self,
        sql: &str,
        parameters: &U,
        connection_string: &str,
        command_type: CommandType,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        U: Serialize + ?Sized;

    /// Async variant of [`load_single_data`](DatabaseAccess::load_single_data).
    async fn load_single_data_async<T, U>(
        &self,
        sql: &str,
        parameters: &U,
        connection_string: &str,
        command_type: CommandType,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
        U: Serialize + Sync + ?Sized;

    /// Execute the statement for its effect. Returns once the database has
    /// completed it.
    fn save_data<U>(
        &self,
        sql: &str,
        parameters: &U,
        connection_string: &str,
        command_type: CommandType,
    ) -> Result<()>
    where
        U: Serialize + ?Sized;

    /// Async variant of [`save_data`](DatabaseAccess::save_data).
    async fn save_data_async<U>(
        &self,
        sql: &str,
        parameters: &U,
        connection_string: &str,
        command_type: CommandType,
    ) -> Result<()>
    where
        U: Serialize + Sync + ?Sized;
}

fn bind<D, U>(
    driver: &D,
    sql: &str,
    parameters: &U,
    command_type: CommandType,
    kind: StatementKind,
) -> Result<BoundStatement>
where
    D: DatabaseDriver + ?Sized,
    U: Serialize + ?Sized,
{
    let parameters = Parameters::from_serialize(parameters)?;
    Ok(BoundStatement::bind(
        driver.dialect(),
        sql,
        &parameters,
        command_type,
        kind,
    ))
}

#[async_trait]
impl<D: DatabaseDriver + ?Sized> DatabaseAccess for D {
    fn load_data<T, U>(
        &self,
        sql: &str,
        parameters: &U,
        connection_string: &str,
        command_type: CommandType,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        U: Serialize + ?Sized,
    {
        let statement = bind(self, sql, parameters, command_type, StatementKind::Query)?;
        blocking::block_on(self.query(connection_string, &statement))??.into_rows()
    }

    async fn load_data_async<T, U>(
        &self,
        sql: &str,
        parameters: &U,
        connection_string: &str,
        command_type: CommandType,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
        U: Serialize + Sync + ?Sized,
    {
        let statement = bind(self, sql, parameters, command_type, StatementKind::Query)?;
        self.query(connection_string, &statement).await?.into_rows()
    }

    fn load_single_data<T, U>(
        &self,
        sql: &str,
        parameters: &U,
        connection_string: &str,
        command_type: CommandType,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        U: Serialize + ?Sized,
    {
        let statement = bind(self, sql, parameters, command_type, StatementKind::Query)?;
        blocking::block_on(self.query(connection_string, &statement))??.into_first()
    }

    async fn load_single_data_async<T, U>(
        &self,
        sql: &str,
        parameters: &U,
        connection_string: &str,
        command_type: CommandType,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
        U: Serialize + Sync + ?Sized,
    {
        let statement = bind(self, sql, parameters, command_type, StatementKind::Query)?;
        self.query(connection_string, &statement).await?.into_first()
    }

    fn save_data<U>(
        &self,
        sql: &str,
        parameters: &U,
        connection_string: &str,
        command_type: CommandType,
    ) -> Result<()>
    where
        U: Serialize + ?Sized,
    {
        let statement = bind(self, sql, parameters, command_type, StatementKind::Execute)?;
        blocking::block_on(self.execute(connection_string, &statement))??;
        Ok(())
    }

    async fn save_data_async<U>(
        &self,
        sql: &str,
        parameters: &U,
        connection_string: &str,
        command_type: CommandType,
    ) -> Result<()>
    where
        U: Serialize + Sync + ?Sized,
    {
        let statement = bind(self, sql, parameters, command_type, StatementKind::Execute)?;
        self.execute(connection_string, &statement).await?;
        Ok(())
    }
}

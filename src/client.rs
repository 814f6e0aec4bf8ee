use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Engine;
use crate::drivers::{MySqlDriver, SqlServerDriver, TokioPostgresDriver};
use crate::error::Result;
use crate::statement::{BoundStatement, Dialect};
use crate::traits::DatabaseDriver;
use crate::types::RawQueryResult;

/// Main entry point for dbaccess.
/// Holds the adapter for one engine; the connection string is supplied per call.
///
/// Through [`DatabaseDriver`] it offers the full
/// [`DatabaseAccess`](crate::DatabaseAccess) facade.
#[derive(Clone)]
pub struct DbAccessClient {
    driver: Arc<dyn DatabaseDriver>,
}

impl DbAccessClient {
    /// Create a client for the given engine.
    ///
    /// # Example
    /// ```ignore
    /// let client = DbAccessClient::for_engine(Engine::Postgres);
    /// let users: Vec<User> = client
    ///     .load_data_async("SELECT id, name FROM users", &(), url, CommandType::Text)
    ///     .await?;
    /// ```
    pub fn for_engine(engine: Engine) -> Self {
        let driver: Arc<dyn DatabaseDriver> = match engine {
            Engine::SqlServer => Arc::new(SqlServerDriver::new()),
            Engine::MySql => Arc::new(MySqlDriver::new()),
            Engine::Postgres => Arc::new(TokioPostgresDriver::new()),
        };
        Self { driver }
    }

    /// Create a new client with a custom driver.
    /// Useful for testing or using alternative database drivers.
    pub fn with_driver(driver: Arc<dyn DatabaseDriver>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl DatabaseDriver for DbAccessClient {
    fn dialect(&self) -> Dialect {
        self.driver.dialect()
    }

    async fn query(
        &self,
        connection_string: &str,
        statement: &BoundStatement,
    ) -> Result<RawQueryResult> {
        self.driver.query(connection_string, statement).await
    }

    async fn execute(&self, connection_string: &str, statement: &BoundStatement) -> Result<u64> {
        self.driver.execute(connection_string, statement).await
    }
}

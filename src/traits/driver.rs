use async_trait::async_trait;

use crate::error::Result;
use crate::statement::{BoundStatement, Dialect};
use crate::types::RawQueryResult;

/// Trait for database driver implementations.
/// Drivers are responsible for:
/// - Opening one connection per call from the connection string, and closing it
///   before returning, whether or not the statement succeeded
/// - Converting SqlValue parameters to native types
/// - Executing statements and converting results to RawQueryResult
///
/// Every driver gets the full [`DatabaseAccess`](crate::DatabaseAccess) facade.
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Placeholder and quoting conventions statements are bound with.
    fn dialect(&self) -> Dialect;

    /// Execute a statement that returns rows.
    async fn query(&self, connection_string: &str, statement: &BoundStatement)
        -> Result<RawQueryResult>;

    /// Execute a statement for its effect, returning the number of affected rows.
    async fn execute(&self, connection_string: &str, statement: &BoundStatement) -> Result<u64>;
}

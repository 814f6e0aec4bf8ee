//! dbaccess - one data-access facade over SQL Server, MySQL and PostgreSQL
//!
//! # Example
//! ```ignore
//! use dbaccess::{CommandType, DatabaseAccess, DbAccessClient, Engine};
//!
//! #[derive(serde::Serialize)]
//! struct ById { id: i32 }
//!
//! #[derive(serde::Deserialize)]
//! struct User { id: i32, name: String }
//!
//! let client = DbAccessClient::for_engine(Engine::Postgres);
//!
//! // Load a single row
//! let user: Option<User> = client
//!     .load_single_data_async(
//!         "SELECT id, name FROM users WHERE id = @id",
//!         &ById { id: 7 },
//!         "postgres://localhost/mydb",
//!         CommandType::Text,
//!     )
//!     .await?;
//!
//! // Call a stored procedure for its effect
//! client
//!     .save_data_async(
//!         "archive_user",
//!         &ById { id: 7 },
//!         "postgres://localhost/mydb",
//!         CommandType::StoredProcedure,
//!     )
//!     .await?;
//! ```

pub mod config;
pub mod drivers;
pub mod error;
pub mod statement;
pub mod traits;
pub mod types;

mod blocking;
mod client;

// Re-export main types for convenient access
pub use client::DbAccessClient;
pub use config::{DataAccessConfig, Engine};
pub use error::{DbAccessError, Result};
pub use statement::{BoundStatement, CommandType, Dialect, StatementKind};
pub use traits::{DatabaseAccess, DatabaseDriver};
pub use types::{Parameters, RawQueryResult, SqlValue};

mod mysql;
mod sql_server;
mod tokio_postgres;

pub use self::in_memory_test::{
    InMemoryTestDriver, InMemoryTestResponse, InMemoryTestResponseBuilder, RecordedQuery,
};
pub use self::mysql::MySqlDriver;
pub use self::sql_server::SqlServerDriver;
pub use self::tokio_postgres::TokioPostgresDriver;

//! Opt-in validation against real database servers.
//!
//! These tests are ignored by default. Run them with
//! `cargo test --test live_backends -- --ignored` after exporting the
//! connection string for each engine:
//!
//! - `DBACCESS_TEST_MSSQL_URL` (ADO.NET string)
//! - `DBACCESS_TEST_MYSQL_URL` (`mysql://...`)
//! - `DBACCESS_TEST_POSTGRES_URL` (`postgres://...`)
//!
//! A missing variable fails the test rather than skipping it.

use dbaccess::traits::DatabaseAccess;
use dbaccess::{CommandType, DbAccessClient, DbAccessError, Engine};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct User {
    id: i32,
    name: String,
}

#[derive(Serialize)]
struct ById {
    id: i32,
}

#[derive(Serialize)]
struct NewUser<'a> {
    id: i32,
    name: &'a str,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Typed {
    amount: String,
    born: String,
}

fn target(var: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| panic!("{} must be set for live backend tests", var))
}

fn user(id: i32, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
    }
}

/// Seeds a table with Ada, then checks loads, saves, decimal and date
/// columns, variant agreement and procedure dispatch against one engine.
fn exercise(engine: Engine, target: &str) {
    let client = DbAccessClient::for_engine(engine);
    let text = CommandType::Text;

    client
        .save_data("DROP TABLE IF EXISTS dbaccess_users", &(), target, text)
        .unwrap();
    client
        .save_data(
            "CREATE TABLE dbaccess_users (id INT PRIMARY KEY, name VARCHAR(100) NOT NULL)",
            &(),
            target,
            text,
        )
        .unwrap();
    client
        .save_data(
            "INSERT INTO dbaccess_users (id, name) VALUES (@id, @name)",
            &NewUser { id: 7, name: "Ada" },
            target,
            text,
        )
        .unwrap();

    let select = "SELECT id, name FROM dbaccess_users WHERE id = @id";

    let one: Option<User> = client
        .load_single_data(select, &ById { id: 7 }, target, text)
        .unwrap();
    assert_eq!(one, Some(user(7, "Ada")));

    let many: Vec<User> = client
        .load_data(select, &ById { id: 7 }, target, text)
        .unwrap();
    assert_eq!(many, vec![user(7, "Ada")]);

    client
        .save_data(
            "INSERT INTO dbaccess_users (id, name) VALUES (@id, @name)",
            &NewUser {
                id: 8,
                name: "Grace",
            },
            target,
            text,
        )
        .unwrap();
    let grace: Option<User> = client
        .load_single_data(select, &ById { id: 8 }, target, text)
        .unwrap();
    assert_eq!(grace, Some(user(8, "Grace")));

    let missing: Option<User> = client
        .load_single_data(select, &ById { id: 404 }, target, text)
        .unwrap();
    assert!(missing.is_none());

    let ordered = "SELECT id, name FROM dbaccess_users ORDER BY id DESC";
    let blocking: Vec<User> = client.load_data(ordered, &(), target, text).unwrap();
    assert_eq!(blocking, vec![user(8, "Grace"), user(7, "Ada")]);

    let typed: Option<Typed> = client
        .load_single_data(
            "SELECT CAST(12.50 AS DECIMAL(10, 2)) AS Amount, CAST('1815-12-10' AS DATE) AS Born",
            &(),
            target,
            text,
        )
        .unwrap();
    assert_eq!(
        typed,
        Some(Typed {
            amount: "12.50".to_string(),
            born: "1815-12-10".to_string(),
        })
    );

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let suspended: Vec<User> = runtime
        .block_on(client.load_data_async(ordered, &(), target, text))
        .unwrap();
    assert_eq!(suspended, blocking);

    let unknown = runtime.block_on(client.save_data_async(
        "dbaccess_no_such_routine",
        &ById { id: 1 },
        target,
        CommandType::StoredProcedure,
    ));
    assert!(matches!(unknown, Err(DbAccessError::QueryFailed(_))));
    drop(runtime);

    client
        .save_data("DROP TABLE dbaccess_users", &(), target, text)
        .unwrap();
}

#[test]
#[ignore]
fn test_sql_server_backend() {
    exercise(Engine::SqlServer, &target("DBACCESS_TEST_MSSQL_URL"));
}

#[test]
#[ignore]
fn test_mysql_backend() {
    exercise(Engine::MySql, &target("DBACCESS_TEST_MYSQL_URL"));
}

#[test]
#[ignore]
fn test_postgres_backend() {
    exercise(Engine::Postgres, &target("DBACCESS_TEST_POSTGRES_URL"));
}

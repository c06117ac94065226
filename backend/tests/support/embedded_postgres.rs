//! Per-test PostgreSQL databases.
//!
//! `PARKING_TEST_DATABASE_URL` points the suites at an existing server; the
//! URL must allow `CREATE DATABASE`. Without it a shared embedded cluster is
//! started through `pg-embed-setup-unpriv`. Either way every test gets a fresh
//! database with the crate's migrations applied, dropped again on `Drop`.

use pg_embedded_setup_unpriv::TemporaryDatabase;
use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use postgres::{Client, NoTls};
use url::Url;
use uuid::Uuid;

use super::format_postgres_error;

/// Server used instead of the embedded cluster when set.
pub const DATABASE_URL_ENV: &str = "PARKING_TEST_DATABASE_URL";

/// A throwaway database that disappears when dropped.
pub enum TestDatabase {
    Embedded(TemporaryDatabase),
    External {
        admin_url: String,
        name: String,
        url: String,
    },
}

impl TestDatabase {
    /// Connection URL of the database.
    pub fn url(&self) -> &str {
        match self {
            Self::Embedded(database) => database.url(),
            Self::External { url, .. } => url,
        }
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        let Self::External {
            admin_url, name, ..
        } = self
        else {
            return;
        };
        let sql = format!(r#"DROP DATABASE IF EXISTS "{name}" WITH (FORCE)"#);
        let dropped = Client::connect(admin_url, NoTls)
            .and_then(|mut client| client.batch_execute(&sql));
        if let Err(err) = dropped {
            eprintln!("failed to drop test database {name}: {}", format_postgres_error(&err));
        }
    }
}

fn new_database_name() -> String {
    format!("test_{}", Uuid::new_v4().simple())
}

fn external_database(admin_url: &str) -> Result<TestDatabase, String> {
    let name = new_database_name();
    let mut url = Url::parse(admin_url).map_err(|err| format!("{DATABASE_URL_ENV}: {err}"))?;
    url.set_path(&name);

    let mut client = Client::connect(admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!(r#"CREATE DATABASE "{name}""#))
        .map_err(|err| format_postgres_error(&err))?;

    Ok(TestDatabase::External {
        admin_url: admin_url.to_owned(),
        name,
        url: url.into(),
    })
}

fn embedded_database() -> Result<TestDatabase, String> {
    let cluster = shared_cluster_handle().map_err(|err| format!("start cluster: {err:?}"))?;
    cluster
        .temporary_database(new_database_name())
        .map(TestDatabase::Embedded)
        .map_err(|err| format!("create database: {err:?}"))
}

/// Create an empty database for one test. Migrations are not applied yet.
pub fn provision_database() -> Result<TestDatabase, String> {
    match std::env::var(DATABASE_URL_ENV) {
        Ok(admin_url) if !admin_url.trim().is_empty() => external_database(admin_url.trim()),
        _ => embedded_database(),
    }
}

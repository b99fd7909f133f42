//! Database provisioning on an embedded cluster.

use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use scorekeeper::outbound::persistence::run_pending_migrations;

/// Render a driver error with the server's code, detail and hint.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!("postgres error {:?}: {}", db_error.code(), db_error.message());
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    if let Some(hint) = db_error.hint() {
        summary.push_str("; hint: ");
        summary.push_str(hint);
    }
    summary
}

/// Drop and recreate `name`, returning its connection URL.
pub fn reset_database(cluster: &TestCluster, name: &str) -> Result<String, String> {
    let admin_url = cluster.connection().database_url("postgres");
    let mut client =
        Client::connect(&admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!("DROP DATABASE IF EXISTS \"{name}\""))
        .map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!("CREATE DATABASE \"{name}\""))
        .map_err(|err| format_postgres_error(&err))?;
    Ok(cluster.connection().database_url(name))
}

/// Apply the crate's embedded migrations to `url`.
pub fn migrate_schema(url: &str) -> Result<usize, String> {
    run_pending_migrations(url).map_err(|err| format!("migration: {err}"))
}

/// Count stored reports for one match directly in SQL.
pub fn count_confirmation_rows(url: &str, match_id: i64) -> Result<i64, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let row = client
        .query_one(
            "SELECT COUNT(*) FROM score_confirmations WHERE match_id = $1",
            &[&match_id],
        )
        .map_err(|err| format_postgres_error(&err))?;
    Ok(row.get(0))
}

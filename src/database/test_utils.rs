use sea_orm::DatabaseConnection;
use tempfile::NamedTempFile;

use super::connection::{establish_connection, get_database_url, setup_database};

/// Temp-file SQLite database with migrations applied. Keep the returned file
/// alive for as long as the connection is used.
pub async fn setup_test_db() -> (DatabaseConnection, NamedTempFile) {
    let temp_file = NamedTempFile::new().expect("Failed to create temp database file");
    let path = temp_file.path().display().to_string();

    let db = establish_connection(&get_database_url(Some(&path)))
        .await
        .expect("Failed to connect to test database");
    setup_database(&db)
        .await
        .expect("Failed to run migrations");

    (db, temp_file)
}

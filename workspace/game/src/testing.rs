//! Shared fixtures for the store tests.

use migration::{Migrator, MigratorTrait};
use model::entities::user;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};

/// In-memory SQLite with migrations applied and foreign keys enforced.
pub async fn setup_db() -> DatabaseConnection {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .try_init();

    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn insert_user(db: &DatabaseConnection, username: &str, password: &str) -> user::Model {
    user::ActiveModel {
        username: Set(username.to_string()),
        password: Set(password.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create test user")
}

//! Database configuration module.
//!
//! Handles `SQLite` connection setup and table creation with `SeaORM`. Tables are
//! generated from the entity definitions via `Schema::create_table_from_entity`
//! so the schema always matches the Rust structs.

use crate::entities::AppDocument;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/calorie_quest.sqlite?mode=rwc";

/// Gets the database URL from the environment or returns the default `SQLite` path.
///
/// A `.env` file in the working directory is honoured when present.
#[must_use]
pub fn get_database_url() -> String {
    dotenvy::dotenv().ok();
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Connects to the database named by [`get_database_url`] and makes sure the
/// tables exist.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    tracing::info!("Connecting to database at {}", database_url);
    let db = Database::connect(&database_url).await?;
    create_tables(&db).await?;
    Ok(db)
}

/// Creates all tables from the entity definitions, skipping ones that exist.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut document_table = schema.create_table_from_entity(AppDocument);
    document_table.if_not_exists();

    db.execute(builder.build(&document_table)).await?;

    Ok(())
}

//! Common test utilities

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connect to the test database, apply the schema, and reset state.
/// Returns None when DATABASE_URL is not configured, in which case the
/// caller should skip.
pub async fn setup_test_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database integration test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::query(include_str!("../../migrations/0001_create_accounts.sql"))
        .execute(&pool)
        .await
        .expect("Failed to apply schema");

    // Clean up DB for fresh state
    sqlx::query("TRUNCATE TABLE accounts RESTART IDENTITY")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    Some(pool)
}

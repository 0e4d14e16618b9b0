use sqlx::{postgres::PgPoolOptions, PgPool};

/// Creates a PostgreSQL connection pool
///
/// The pool connects lazily so the service can start (and degrade to live
/// providers and the fallback list) while the database is unreachable.
pub fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_lazy(database_url)?;

    Ok(pool)
}

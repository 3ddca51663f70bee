use sqlx::PgPool;

/// Executes the SQL query objects defined in [`crate::entities`].
///
/// Each query object has its own `Processor` impl on this type, so callers
/// hold one cheap handle and dispatch on the query they build.
#[derive(Debug, Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}

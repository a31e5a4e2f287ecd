use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::migrator::Migrator;
use futures::future::BoxFuture;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbBackend,
    IsolationLevel, TransactionError, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(8);
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Opens a connection pool for the given URL with default pool sizing.
pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, ServiceError> {
    establish_connection_with_config(&AppConfig::for_database(database_url)).await
}

/// Opens a connection pool sized by the application config, running
/// migrations first when `auto_migrate` is set.
pub async fn establish_connection_with_config(
    config: &AppConfig,
) -> Result<DatabaseConnection, ServiceError> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(CONNECT_TIMEOUT)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .sqlx_logging(false);

    info!(
        max_connections = config.max_connections,
        "Connecting to database"
    );
    let db = Database::connect(options)
        .await
        .map_err(ServiceError::db_error)?;

    if config.auto_migrate {
        run_migrations(&db).await?;
    }
    Ok(db)
}

/// Brings the schema up to date.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), ServiceError> {
    info!("Running database migrations");
    Migrator::up(db, None).await.map_err(ServiceError::db_error)
}

/// Executes a closure within a database transaction.
///
/// Commits on `Ok`, rolls back on `Err`, and maps connection-level failures
/// back into `ServiceError` so callers see one error type.
pub async fn with_transaction<F, T>(db: &DatabaseConnection, f: F) -> Result<T, ServiceError>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, ServiceError>> + Send,
    T: Send,
{
    db.transaction::<_, T, ServiceError>(f)
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })
}

/// `with_transaction` at serializable isolation.
///
/// For read-then-conditionally-write sequences whose reads cannot be
/// row-locked, such as stock-sufficiency sums over an append-only history.
/// SQLite's single writer already serializes; other backends get an
/// explicit isolation level, and a serialization failure surfaces as a
/// retryable `ConcurrencyConflict`.
pub async fn with_serializable_transaction<F, T>(
    db: &DatabaseConnection,
    f: F,
) -> Result<T, ServiceError>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, ServiceError>> + Send,
    T: Send,
{
    let result = match db.get_database_backend() {
        DbBackend::Sqlite => db.transaction::<_, T, ServiceError>(f).await,
        _ => {
            db.transaction_with_config::<_, T, ServiceError>(
                f,
                Some(IsolationLevel::Serializable),
                None,
            )
            .await
        }
    };

    result.map_err(|e| match e {
        TransactionError::Connection(db_err) => ServiceError::conflict_or_db(db_err),
        TransactionError::Transaction(service_err) => service_err,
    })
}

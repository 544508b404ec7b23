use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::ports::{AuthRepository, BlobStore, EventRepository, UserRepository};
use crate::domain::services::{
    auth_service::AuthService,
    directory::Directory,
    images::ImageService,
    membership::MembershipService,
    views::ViewService,
};
use crate::infra::storage::{http_blob_store::HttpBlobStore, local_blob_store::LocalBlobStore};
use crate::infra::repositories::{
    postgres_auth_repo::PostgresAuthRepo, postgres_event_repo::PostgresEventRepo,
    postgres_user_repo::PostgresUserRepo,
    sqlite_auth_repo::SqliteAuthRepo, sqlite_event_repo::SqliteEventRepo,
    sqlite_user_repo::SqliteUserRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let (user_repo, event_repo, auth_repo): (Arc<dyn UserRepository>, Arc<dyn EventRepository>, Arc<dyn AuthRepository>) =
        if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
            info!("Initializing PostgreSQL connection...");

            let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
            opts = opts.log_statements(LevelFilter::Debug)
                .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect_with(opts)
                .await
                .expect("Failed to connect to Postgres");

            run_postgres_migrations(&pool).await;

            (
                Arc::new(PostgresUserRepo::new(pool.clone())),
                Arc::new(PostgresEventRepo::new(pool.clone())),
                Arc::new(PostgresAuthRepo::new(pool)),
            )
        } else {
            info!("Initializing SQLite connection with WAL Mode...");

            let opts = SqliteConnectOptions::from_str(database_url)
                .expect("Invalid SQLite connection string")
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .foreign_keys(true)
                .busy_timeout(Duration::from_secs(5))
                .log_statements(LevelFilter::Debug)
                .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

            let pool = SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(opts)
                .await
                .expect("Failed to connect to SQLite");

            run_sqlite_migrations(&pool).await;

            (
                Arc::new(SqliteUserRepo::new(pool.clone())),
                Arc::new(SqliteEventRepo::new(pool.clone())),
                Arc::new(SqliteAuthRepo::new(pool)),
            )
        };

    let blob_store: Arc<dyn BlobStore> = match &config.blob_store_url {
        Some(url) => {
            info!("Using HTTP blob store at {}", url);
            Arc::new(HttpBlobStore::new(url.clone(), config.blob_store_token.clone()))
        }
        None => {
            info!("Using local blob store in {}", config.storage_dir);
            Arc::new(LocalBlobStore::new(&config.storage_dir, &config.public_base_url))
        }
    };

    assemble_state(config.clone(), user_repo, event_repo, auth_repo, blob_store)
        .expect("Failed to initialize services")
}

/// Wires services on top of already-built adapters.
pub fn assemble_state(
    config: Config,
    user_repo: Arc<dyn UserRepository>,
    event_repo: Arc<dyn EventRepository>,
    auth_repo: Arc<dyn AuthRepository>,
    blob_store: Arc<dyn BlobStore>,
) -> Result<AppState, crate::error::AppError> {
    let auth_service = Arc::new(AuthService::new(auth_repo.clone(), config.clone())?);
    let images = Arc::new(ImageService::new(blob_store));
    let directory = Arc::new(Directory::new(user_repo.clone()));
    let membership = Arc::new(MembershipService::new(event_repo.clone(), user_repo.clone(), images));
    let views = Arc::new(ViewService::new(event_repo.clone(), directory.clone()));

    Ok(AppState {
        config,
        user_repo,
        event_repo,
        auth_repo,
        auth_service,
        membership,
        directory,
        views,
    })
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}

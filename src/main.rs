use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use talk_catalog::application::ports::{ImportJobRepository, StagingStore, TalkRepository};
use talk_catalog::application::services::{
    ImportOrchestrator, ImportService, ImportWorkerPool, RecoverySweep,
};
use talk_catalog::infrastructure::observability::{TracingConfig, init_tracing};
use talk_catalog::infrastructure::persistence::{
    InMemoryImportJobRepository, InMemoryTalkRepository, PgImportJobRepository, PgTalkRepository,
    create_pool,
};
use talk_catalog::infrastructure::storage::LocalStagingStore;
use talk_catalog::presentation::config::DatabaseProvider;
use talk_catalog::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(
        &TracingConfig::new(
            environment.as_str(),
            &settings.logging.level,
            settings.logging.enable_json,
        ),
        settings.server.port,
    );

    let (job_repository, talk_repository): (
        Arc<dyn ImportJobRepository>,
        Arc<dyn TalkRepository>,
    ) = match settings.database.provider {
        DatabaseProvider::Postgres => {
            let pool = create_pool(&settings.database.url, settings.database.max_connections)
                .await
                .context("Failed to connect to Postgres")?;
            (
                Arc::new(PgImportJobRepository::new(pool.clone())),
                Arc::new(PgTalkRepository::new(pool)),
            )
        }
        DatabaseProvider::Memory => {
            tracing::warn!("Using in-memory repositories; imports are lost on restart");
            (
                Arc::new(InMemoryImportJobRepository::new()),
                Arc::new(InMemoryTalkRepository::new()),
            )
        }
    };

    let local_store = LocalStagingStore::new(PathBuf::from(&settings.storage.local_path))
        .context("Failed to open staging directory")?;
    tracing::info!(path = %local_store.base_path().display(), "Staging directory ready");
    let staging_store: Arc<dyn StagingStore> = Arc::new(local_store);

    // Nothing may be admitted until leftovers of a previous process are reconciled.
    RecoverySweep::new(
        Arc::clone(&job_repository),
        Arc::clone(&staging_store),
        settings.import.stale_after(),
    )
    .run()
    .await;

    let pool = ImportWorkerPool::start(settings.import.pool_config());
    let orchestrator = Arc::new(ImportOrchestrator::new(
        Arc::clone(&job_repository),
        talk_repository,
        Arc::clone(&staging_store),
        settings.import.batch_size,
    ));
    let import_service = Arc::new(ImportService::new(
        job_repository,
        staging_store,
        orchestrator,
        pool.clone(),
    ));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;

    let router = create_router(AppState {
        import_service,
        settings,
    });

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped, waiting for running imports");
    pool.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

use std::{process, sync::Arc};

use sortera::{
    application::error::AppError,
    application::repos::{DropboxesRepo, HealthRepo, PickupsRepo, WasteItemsRepo, WasteTypesRepo},
    cache::{CacheConfig, CacheState},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiContext},
        telemetry,
    },
};
use tokio::signal;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let settings = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let repositories = init_repositories(&settings).await?;
    let context = build_api_context(&repositories);

    let cache_config = CacheConfig::from(&settings.cache);
    let cache = if cache_config.enabled {
        Some(CacheState::new(cache_config))
    } else {
        None
    };

    serve_http(&settings, context, cache).await
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(
        database_url,
        settings.database.max_connections.get(),
        settings.database.acquire_timeout,
    )
    .await
    .map_err(|err| AppError::from(InfraError::database("connect", err)))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database("migrate", err)))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_api_context(repositories: &Arc<PostgresRepositories>) -> ApiContext {
    let waste_types: Arc<dyn WasteTypesRepo> = repositories.clone();
    let waste_items: Arc<dyn WasteItemsRepo> = repositories.clone();
    let dropboxes: Arc<dyn DropboxesRepo> = repositories.clone();
    let pickups: Arc<dyn PickupsRepo> = repositories.clone();
    let health: Arc<dyn HealthRepo> = repositories.clone();

    ApiContext {
        waste_types,
        waste_items,
        dropboxes,
        pickups,
        health,
    }
}

async fn serve_http(
    settings: &config::Settings,
    context: ApiContext,
    cache: Option<CacheState>,
) -> Result<(), AppError> {
    let cors = http::build_cors_layer(&settings.http);
    let router = http::build_router(context, cache, cors);

    let listener = tokio::net::TcpListener::bind(settings.http.listen)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "sortera::server",
        addr = %settings.http.listen,
        "Listening for API requests"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!(target = "sortera::server", "Received ctrl-c, starting graceful shutdown");
        },
        _ = terminate => {
            info!(target = "sortera::server", "Received SIGTERM, starting graceful shutdown");
        },
    }
}

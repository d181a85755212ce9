use axum::Router;
use migration::MigratorTrait;
use sea_orm::Database;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::task::{SeaOrmTaskStore, TaskState};

pub mod api;

/// OpenAPI description of the JSON API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Scheduler API",
        description = "Personal task scheduler with recurring tasks."
    ),
    paths(
        crate::nextdate::api::v1::next_date_handler,
        crate::task::api::v1::create_task_handler,
        crate::task::api::v1::get_task_handler,
        crate::task::api::v1::update_task_handler,
        crate::task::api::v1::delete_task_handler,
        crate::task::api::v1::complete_task_handler,
        crate::task::api::v1::get_tasks_handler,
    ),
    tags(
        (name = "Scheduler", description = "Repeat rule calculator"),
        (name = "Tasks", description = "Task management")
    )
)]
pub struct ApiDoc;

/// Builds the application router: health check, JSON API, API docs and the
/// static front-end for every other path.
pub fn create_app(task_state: Arc<TaskState>, web_dir: &str) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .merge(api::create_api_router(task_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback_service(ServeDir::new(web_dir))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let db = Database::connect(config.db_url()).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let task_state = Arc::new(TaskState {
        store: Arc::new(SeaOrmTaskStore::new(db)),
        tasks_limit: config.tasks_limit,
    });
    let app = create_app(task_state, &config.web_dir);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

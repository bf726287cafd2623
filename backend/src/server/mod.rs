//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use showcase::Trace;
#[cfg(debug_assertions)]
use showcase::doc::ApiDoc;
use showcase::domain::{BackendRegistry, LoadOutcome, UsersPage};
use showcase::inbound::http::health::{HealthState, live, ready};
use showcase::inbound::http::page::{get_page, list_snippets, switch_backend, take_notifications};
use showcase::inbound::http::posts::{create_post, delete_post, update_post};
use showcase::inbound::http::state::HttpState;
use showcase::inbound::http::users::{create_user, delete_user, update_user};
use showcase::outbound::highlight::HtmlHighlighter;
use showcase::outbound::persistence::{
    DbPool, DieselUsersBackend, PoolError, SqlxUsersBackend, connect_sqlx,
};
use showcase::settings::SettingsError;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Failures that stop the process before it serves traffic.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to load settings: {0}")]
    Load(String),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Database(#[from] PoolError),
    #[error("HTTP server error: {0}")]
    Server(#[from] std::io::Error),
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let api = web::scope("/api/v1")
        .service(get_page)
        .service(switch_backend)
        .service(take_notifications)
        .service(list_snippets)
        .service(create_user)
        .service(update_user)
        .service(delete_user)
        .service(create_post)
        .service(update_post)
        .service(delete_post);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Open the shared SQLite file through both libraries and build the page.
///
/// Migrations run while the Diesel connection opens, so the sqlx pool is
/// created only after the schema exists.
async fn build_page(config: &ServerConfig) -> Result<UsersPage, StartupError> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let diesel_pool = DbPool::open(&config.database).await?;
    let sqlx_pool = connect_sqlx(&config.database).await?;
    let backends = BackendRegistry::new(
        Arc::new(SqlxUsersBackend::new(sqlx_pool, Arc::clone(&clock))),
        Arc::new(DieselUsersBackend::new(diesel_pool, Arc::clone(&clock))),
    );
    Ok(UsersPage::new(config.initial_backend, backends, clock))
}

/// Construct the HTTP server and load the initial list.
///
/// Readiness flips once the listener is bound. A failed initial load is
/// logged and surfaced as a notification; the server still starts.
///
/// # Errors
/// Returns [`StartupError`] when the database cannot be opened or migrated,
/// or the socket cannot be bound.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> Result<Server, StartupError> {
    let page = build_page(&config).await?;
    match page.reload().await {
        LoadOutcome::Loaded => {
            info!(backend = %page.active_backend(), "initial list loaded");
        }
        outcome => warn!(?outcome, "initial list load did not complete"),
    }

    let http_state = web::Data::new(HttpState::new(page, Arc::new(HtmlHighlighter)));
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .bind(config.bind_addr())?
    .run();

    health_state.mark_ready();
    info!(addr = %config.bind_addr(), "listening");
    Ok(server)
}

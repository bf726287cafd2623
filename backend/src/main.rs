//! Showcase entry-point: loads settings, opens the database and serves the
//! page API.

mod server;

use std::process::ExitCode;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};

use showcase::inbound::http::health::HealthState;
use showcase::settings::ShowcaseSettings;

use server::{ServerConfig, StartupError, create_server};

async fn run() -> Result<(), StartupError> {
    let settings =
        ShowcaseSettings::load().map_err(|err| StartupError::Load(err.to_string()))?;
    let config = ServerConfig::from_settings(&settings)?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).await?;
    let result = server.await;
    health_state.mark_unhealthy();
    result.map_err(StartupError::from)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "showcase failed");
            eprintln!("showcase: {err}");
            ExitCode::FAILURE
        }
    }
}

use clipvault_api::{routes, server, state::AppState, telemetry};
use clipvault_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    telemetry::init_telemetry();

    let state = AppState::from_config(config.clone()).await?;
    let router = routes::build_router(state)?;

    server::start_server(&config, router).await?;

    Ok(())
}

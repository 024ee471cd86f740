use webpify_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    webpify_api::telemetry::init_tracing();

    // Initialize the application (storage, services, routes)
    let (state, router) = webpify_api::setup::initialize_app(config.clone()).await?;

    // Start the periodic storage sweep (first pass runs immediately)
    let _sweeper = state.lifecycle.clone().start();

    // Start the server
    webpify_api::setup::server::start_server(&config, router).await?;

    Ok(())
}

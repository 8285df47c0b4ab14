use focusreader::configuration::get_configuration;
use focusreader::startup::Application;
use focusreader::telemetry::get_subscriber;
use focusreader::telemetry::init_subscriber;

/// Initialise telemetry, load config, and start the server
#[tokio::main] // requires tokio features: macros, rt-multi-thread
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("focusreader", "info", std::io::stdout);
    init_subscriber(subscriber);

    let cfg = get_configuration()?;

    Application::build(cfg).await?.run_until_stopped().await?;
    Ok(())
}

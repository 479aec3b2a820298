use maptrack::config::Config;
use maptrack::engine::Engine;
use maptrack::error::Error;
use maptrack::server::serve;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let engine = Engine::from_config(&config)?;

    serve(engine, config.listen_addr).await
}

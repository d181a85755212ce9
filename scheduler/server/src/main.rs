#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let config = scheduler_server::config::Config::from_env()?;
    scheduler_server::web::start_web_server(config).await
}

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use chat_relay::cli::{
    commands::{Cli, Commands},
    run_cli,
};
use chat_relay::config::AppConfig;
use chat_relay::llm::ChatService;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve);

    let config = AppConfig::load(&cli.config).context("Failed to load configuration")?;
    let service = ChatService::from_config(&config).context("Failed to initialize Claude client")?;

    if !matches!(command, Commands::Serve) {
        return run_cli(command, service).await;
    }

    info!(
        "Starting chat relay ({:?} mode, model {})",
        config.mode,
        service.settings().model
    );
    if let Some(url) = &config.server.public_url {
        info!("Public URL: {}", url);
    }

    let host = config.server.host.clone();
    let port = config.server.port;
    let service = web::Data::new(service);

    info!("Server listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .configure(chat_relay::api::routes::configure)
    })
    .bind((host, port))?
    .run()
    .await?;

    Ok(())
}

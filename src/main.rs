//! medrelay binary
//!
//! `serve` (the default) starts the Axum relay server; `image` runs a single
//! image query and prints the result; `config` emits a configuration template.

use clap::Parser;
use medrelay::{
    cli::{Cli, Command, generate_config_template},
    completion::CompletionClient,
    config::{Config, ConfigSource, LoadedConfig},
    handlers::{self, AppState},
    image_query::ImageQuery,
    telemetry,
};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = &cli.command {
        return write_config_template(output.as_deref());
    }

    // A missing .env file is fine; the variables may come from the environment
    let _ = dotenvy::dotenv();

    let LoadedConfig { config, source } = Config::load_or_default(&cli.config)?;
    telemetry::init(&config.observability.log_level);

    match &source {
        ConfigSource::File(path) => {
            tracing::info!(path = %path.display(), "Loaded configuration file")
        }
        ConfigSource::Defaults => tracing::info!(
            path = %cli.config,
            "Config file not found, using built-in defaults"
        ),
    }

    match cli.command {
        Some(Command::Image { path, query }) => run_image_query(config, &path, &query).await,
        _ => serve(config).await,
    }
}

async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let api_key = config.api_key()?;
    let addr = config.bind_addr()?;

    tracing::info!(
        upstream = %config.upstream.api_url,
        model = %config.upstream.model,
        "Starting medrelay server on {}",
        addr
    );

    let state = AppState::new(config, api_key)?;
    let app = handlers::router(state)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_image_query(
    config: Config,
    path: &Path,
    query: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let api_key = config.api_key()?;
    let client = CompletionClient::new(&config.upstream, api_key)?;
    let image_query = ImageQuery::new(client, &config.upstream);

    tracing::info!(
        model = image_query.model(),
        path = %path.display(),
        "Running image query"
    );

    let report = image_query.run(path, query).await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn write_config_template(output: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let template = generate_config_template();
    match output {
        Some(path) => {
            if Path::new(path).exists() {
                return Err(format!("Refusing to overwrite existing file {}", path).into());
            }
            std::fs::write(path, template)?;
            eprintln!("Wrote configuration template to {}", path);
        }
        None => print!("{}", template),
    }
    Ok(())
}

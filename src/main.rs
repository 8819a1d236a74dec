use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;

use line_intro_bot::application::errors::{BotError, ConfigError};
use line_intro_bot::application::messaging::EventDispatcher;
use line_intro_bot::application::services::EventService;
use line_intro_bot::infrastructure::adapters::line::webhook::{self, WebhookState};
use line_intro_bot::infrastructure::adapters::{console, ConsoleGateway, LineAdapter};
use line_intro_bot::infrastructure::config::Config;
use line_intro_bot::infrastructure::open_store;

#[derive(Parser)]
#[command(name = "line-intro-bot")]
#[command(about = "A LINE bot that introduces its owner in English or Chinese", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    Run {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable debug logging
        #[arg(short, long)]
        debug: bool,

        /// Listen on all interfaces instead of localhost
        #[arg(short, long)]
        allow_all: bool,
    },
    /// Chat with the bot from the terminal (dev mode)
    Console,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    let cli = Cli::parse();

    let debug = matches!(cli.command, Commands::Run { debug: true, .. });
    init_logging(debug);

    let result = match cli.command {
        Commands::Run { port, allow_all, .. } => run_async(run_server(cli.config, port, allow_all)),
        Commands::Console => run_async(run_console(cli.config)),
        Commands::Version => {
            println!("line-intro-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let level = if debug { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(level.into()),
        )
        .init();
}

fn run_async<F>(future: F) -> Result<(), BotError>
where
    F: std::future::Future<Output = Result<(), BotError>>,
{
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| BotError::Internal(format!("failed to start runtime: {}", e)))?;
    rt.block_on(future)
}

/// Config file if present, environment variables on top
fn load_config(config_path: &str) -> Config {
    if !std::path::Path::new(config_path).exists() {
        return Config::load_env();
    }

    match Config::load(config_path) {
        Ok(mut config) => {
            config.apply_env(|key| std::env::var(key).ok());
            config
        }
        Err(e) => {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        }
    }
}

async fn run_server(config_path: String, port: Option<u16>, allow_all: bool) -> Result<(), BotError> {
    let mut config = load_config(&config_path);
    if let Some(port) = port {
        config.server.port = port;
    }
    if allow_all {
        config.server.host = "0.0.0.0".to_string();
    }
    config.validate()?;

    tracing::info!("Starting {}", config.bot.name);

    let (Some(secret), Some(token)) = (
        config.line.channel_secret.clone(),
        config.line.channel_access_token.clone(),
    ) else {
        return Err(ConfigError::MissingField("line credentials".to_string()).into());
    };

    let store = open_store(&config.storage).await?;
    let gateway = Arc::new(LineAdapter::new(token, &config.line, config.rich_menu.clone()));
    let service = EventService::new(EventDispatcher::new(store, gateway));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| ConfigError::InvalidValue(format!("server address: {}", e)))?;

    let app = webhook::router(WebhookState::new(service, secret), &config.server.webhook_path);
    webhook::start_server(addr, app).await
}

async fn run_console(config_path: String) -> Result<(), BotError> {
    let config = load_config(&config_path);
    let store = open_store(&config.storage).await?;
    let service = EventService::new(EventDispatcher::new(store, Arc::new(ConsoleGateway::new())));
    console::run(service).await
}

fn init_config() -> Result<(), BotError> {
    let yaml = serde_yaml::to_string(&Config::default())
        .map_err(|e| ConfigError::Parse(e.to_string()))?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}

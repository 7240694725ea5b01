use clap::{Parser, Subcommand};
use slinky::admin::{self, AdminCommands};
use slinky::config::Config;
use slinky::error::AppResult;
use slinky::server;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// slinky - short links that expire
#[derive(Parser, Debug)]
#[command(name = "slinky")]
#[command(version)]
#[command(about = "A URL shortener with expiring slugs and click counting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web server
    Server {
        /// Host to bind to (overrides SERVER_HOST env var)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides SERVER_PORT env var)
        #[arg(long)]
        port: Option<u16>,

        /// Run migrations on startup
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        migrate: bool,
    },

    /// Administrative commands
    Admin {
        #[command(subcommand)]
        admin_command: AdminCommands,
    },
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    init_tracing();

    // Load configuration
    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Server {
            host,
            port,
            migrate,
        } => {
            let overridden = host.is_some() || port.is_some();
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            // Re-compute base_url after CLI overrides unless it was set explicitly
            if overridden && std::env::var("BASE_URL").is_err() {
                config.server.base_url =
                    format!("http://{}:{}", config.server.host, config.server.port);
            }

            server::run_server(config, migrate).await
        }
        Commands::Admin { admin_command } => admin::run(config, admin_command).await,
    }
}

/// Human-readable output by default, one JSON object per line with `LOG_FORMAT=json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

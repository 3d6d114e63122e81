//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use subjekt_core::Dispatcher;
use subjekt_shared::{
    AppConfig, Query, SearchStrategy, Sector, init_config, load_config, load_config_from,
};
use tracing::info;

use crate::geocode::GeocodeClient;
use crate::routes::{self, AppState};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Subjekt: search Czech business entities across registry and directory sources.
#[derive(Parser)]
#[command(
    name = "subjekt",
    version,
    about = "Search Czech business entities by keyword, registry identifier (IČO) or location.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.subjekt/subjekt.toml).
    #[arg(long, global = true, env = "SUBJEKT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Start the HTTP API.
    Serve {
        /// Socket address to listen on (overrides [server].bind).
        #[arg(long)]
        bind: Option<String>,

        /// Source strategy: routed, registry, directory or mock.
        #[arg(long)]
        strategy: Option<SearchStrategy>,
    },

    /// Run one search and print the JSON response.
    Search {
        /// Company name fragment or 8-digit IČO.
        #[arg(short, long)]
        keyword: Option<String>,

        /// City or locality.
        #[arg(short, long)]
        location: Option<String>,

        /// Sector filter: IT, Finance, Healthcare, Manufacturing, Retail, Other.
        #[arg(short, long)]
        sector: Option<Sector>,

        /// Employee band filter: 1-10, 11-50, 50+ or all.
        #[arg(short, long, value_parser = ["1-10", "11-50", "50+", "all"])]
        employee_count: Option<String>,

        /// Source strategy: routed, registry, directory or mock.
        #[arg(long)]
        strategy: Option<SearchStrategy>,

        /// Skip contact enrichment.
        #[arg(long)]
        no_enrich: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "subjekt=info,tower_http=info",
        1 => "subjekt=debug,tower_http=debug",
        _ => "subjekt=trace,tower_http=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { bind, strategy } => cmd_serve(config, bind, strategy).await,
        Command::Search {
            keyword,
            location,
            sector,
            employee_count,
            strategy,
            no_enrich,
        } => {
            let query = Query {
                keyword,
                location,
                sector,
                employee_count_band: employee_count,
            };
            cmd_search(config, query, strategy, no_enrich).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&config).await,
        },
    }
}

fn resolve_config(path: Option<&std::path::Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

async fn cmd_serve(
    mut config: AppConfig,
    bind: Option<String>,
    strategy: Option<SearchStrategy>,
) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(strategy) = strategy {
        config.search.strategy = strategy;
    }

    let state = AppState {
        dispatcher: Arc::new(Dispatcher::from_config(&config)?),
        geocoder: Arc::new(GeocodeClient::new(config.geocode.clone())?),
    };
    let app = routes::router(state, config.server.cors_allow_any);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .wrap_err_with(|| format!("failed to bind {}", config.server.bind))?;

    info!(
        bind = %config.server.bind,
        strategy = ?config.search.strategy,
        enrich = config.search.enrich_contacts,
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn cmd_search(
    mut config: AppConfig,
    query: Query,
    strategy: Option<SearchStrategy>,
    no_enrich: bool,
) -> Result<()> {
    if let Some(strategy) = strategy {
        config.search.strategy = strategy;
    }
    if no_enrich {
        config.search.enrich_contacts = false;
    }

    let dispatcher = Dispatcher::from_config(&config)?;
    let response = dispatcher.search(&query).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_flags() {
        let cli = Cli::try_parse_from([
            "subjekt", "search", "--location", "Praha", "--sector", "finance", "--strategy", "mock",
        ])
        .unwrap();

        match cli.command {
            Command::Search {
                location,
                sector,
                strategy,
                keyword,
                ..
            } => {
                assert_eq!(location.as_deref(), Some("Praha"));
                assert_eq!(sector, Some(Sector::Finance));
                assert_eq!(strategy, Some(SearchStrategy::Mock));
                assert!(keyword.is_none());
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn rejects_unknown_employee_band() {
        assert!(Cli::try_parse_from(["subjekt", "search", "-l", "Praha", "-e", "11-50"]).is_ok());
        assert!(Cli::try_parse_from(["subjekt", "search", "-l", "Praha", "-e", "200+"]).is_err());
    }

    #[test]
    fn rejects_unknown_strategy() {
        assert!(Cli::try_parse_from(["subjekt", "serve", "--strategy", "carrier-pigeon"]).is_err());
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["subjekt", "-vv", "config", "show"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Show
            }
        ));
    }
}

use std::{env, net::SocketAddr};

use ticketd_server::config::loader::{DEFAULT_CONFIG_FILE, load_config};
use ticketd_server::ServerBuilder;

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From TICKETD_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (ticketd.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (TICKETD_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Command line: `ticketd-server [--config <path>] [listen-addr]`.
struct CliArgs {
    config: Option<String>,
    listen: Option<String>,
}

fn parse_args() -> CliArgs {
    let mut cli = CliArgs {
        config: None,
        listen: None,
    };
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            cli.config = args.next();
        } else if cli.listen.is_none() {
            cli.listen = Some(arg);
        }
    }
    cli
}

#[tokio::main]
async fn main() {
    // .env is optional
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    ticketd_server::observability::init_tracing();

    let cli = parse_args();
    let (config_path, source) = resolve_config_path(cli.config);

    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path,
        source = %source,
        "Configuration loaded"
    );

    ticketd_server::observability::apply_logging_level(&cfg.logging.level);
    ticketd_server::metrics::init_metrics();

    let mut builder = ServerBuilder::new().with_config(cfg);
    if let Some(listen) = cli.listen {
        match parse_listen_addr(&listen) {
            Ok(addr) => builder = builder.with_addr(addr),
            Err(e) => {
                eprintln!("Invalid listen address {listen:?}: {e}");
                std::process::exit(2);
            }
        }
    }

    let server = match builder.build().await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Backend initialization failed: {e}");
            std::process::exit(2);
        }
    };

    if let Err(err) = server.run().await {
        tracing::error!(error = %err, "server error");
        std::process::exit(1);
    }
    tracing::info!("ticketd stopped");
}

fn resolve_config_path(cli: Option<String>) -> (String, ConfigSource) {
    if let Some(path) = cli {
        return (path, ConfigSource::CliArgument);
    }

    if let Ok(path) = env::var("TICKETD_CONFIG")
        && !path.is_empty()
    {
        return (path, ConfigSource::EnvironmentVariable);
    }

    (DEFAULT_CONFIG_FILE.to_string(), ConfigSource::Default)
}

/// Accepts `host:port` or a bare `:port`, which listens on all interfaces.
fn parse_listen_addr(s: &str) -> Result<SocketAddr, std::net::AddrParseError> {
    match s.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}").parse(),
        None => s.parse(),
    }
}

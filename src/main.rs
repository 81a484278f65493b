//! `ocm-backplane` entry point.
//!
//! Every subcommand except `version` first resolves the effective
//! configuration and aborts on any fatal configuration error.

use std::time::Duration;

use clap::{Parser, Subcommand};

use backplane_cli::config::{config_directory, config_file_path, EnvSnapshot};
use backplane_cli::info;
use backplane_cli::observability::logging;
use backplane_cli::proxy::ProbeStrategy;
use backplane_cli::{load_configuration, BuiltinRegistry, HttpProbe, LoadOptions};

#[derive(Parser)]
#[command(name = "ocm-backplane")]
#[command(about = "Proxied access to the backplane cluster-management API", long_about = None)]
struct Cli {
    /// OCM environment name, alias or API URL.
    #[arg(long, global = true, env = "OCM_URL", default_value = "production")]
    ocm_env: String,

    /// Give up on configuration resolution after this many seconds.
    #[arg(long, global = true)]
    resolve_timeout: Option<u64>,

    /// Probe all proxy candidates at once.
    #[arg(long, global = true)]
    concurrent_probes: bool,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration
    Config {
        /// Only print the config file location
        #[arg(long, conflicts_with = "dir")]
        path: bool,
        /// Only print the directory holding the config file
        #[arg(long)]
        dir: bool,
    },
    /// Check the backplane API is reachable through the selected proxy
    CheckConnection,
    /// Print the version
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let env = EnvSnapshot::from_process();

    let options = LoadOptions {
        probe_strategy: if cli.concurrent_probes {
            ProbeStrategy::Concurrent
        } else {
            ProbeStrategy::Sequential
        },
        deadline: cli.resolve_timeout.map(Duration::from_secs),
        ..LoadOptions::default()
    };
    let registry = BuiltinRegistry::new(cli.ocm_env.as_str());

    match cli.command {
        Commands::Version => {
            println!("{}", info::build_version());
        }
        Commands::Config { path: true, .. } => {
            println!("{}", config_file_path(&env)?.display());
        }
        Commands::Config { dir: true, .. } => {
            println!("{}", config_directory(&env)?.display());
        }
        Commands::Config { .. } => {
            let config = load_configuration(&env, &registry, HttpProbe::new(), &options).await?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::CheckConnection => {
            let config = load_configuration(&env, &registry, HttpProbe::new(), &options).await?;
            config.check_connectivity().await?;
            match config.proxy_url() {
                Some(proxy) => println!("Connected to {} via proxy {}", config.url(), proxy),
                None => println!("Connected to {} without proxy", config.url()),
            }
        }
    }

    Ok(())
}

// CLI interface
pub mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use nhncloud_rds::config::Config;
use nhncloud_rds::{MariaDbClient, MySqlClient, PostgresClient, RdsApi};

#[derive(Parser, Debug)]
#[command(name = "nhncloud-rds")]
#[command(about = "Inspect NHN Cloud RDS resources", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// RDS service to talk to
    #[arg(long, value_enum, global = true, default_value = "mysql", env = "NHN_RDS_SERVICE")]
    pub service: Service,

    /// Region (overrides config file and NHN_RDS_REGION)
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List DB instances
    Instances {
        /// Output in JSON format for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show one DB instance
    Instance {
        /// DB instance ID
        id: String,
    },

    /// List available DB engine versions
    Versions,

    /// List DB flavors (instance sizes)
    Flavors,

    /// List backups
    Backups {
        /// Only backups of this DB instance
        #[arg(long)]
        instance: Option<String>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completion scripts
    ///
    /// INSTALLATION:
    ///
    /// Bash:
    ///   eval "$(nhncloud-rds completions bash)"    # Add to ~/.bashrc
    ///
    /// Zsh:
    ///   eval "$(nhncloud-rds completions zsh)"     # Add to ~/.zshrc
    ///
    /// Fish:
    ///   nhncloud-rds completions fish > ~/.config/fish/completions/nhncloud-rds.fish
    Completions {
        /// Shell type to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a sample config file
    Init,
    /// Show the config file location and whether it is valid
    Path,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Service {
    Mysql,
    Mariadb,
    Postgres,
}

#[derive(Debug, Clone, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Build the resource client for `service` from config file, environment and flags.
fn connect(service: Service, region: Option<String>) -> anyhow::Result<Box<dyn RdsApi>> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(region) = region {
        config.credentials.region = Some(region);
    }

    let client_config = config
        .client_config()
        .context("Incomplete credentials; run `nhncloud-rds config path` to check")?;
    let transport = config.transport_config();

    let client: Box<dyn RdsApi> = match service {
        Service::Mysql => Box::new(MySqlClient::with_transport_config(&client_config, &transport)?),
        Service::Mariadb => Box::new(MariaDbClient::with_transport_config(
            &client_config,
            &transport,
        )?),
        Service::Postgres => Box::new(PostgresClient::with_transport_config(
            &client_config,
            &transport,
        )?),
    };
    Ok(client)
}

pub async fn execute(args: Cli) -> anyhow::Result<()> {
    match args.command {
        Commands::Instances { json } => {
            let client = connect(args.service, args.region)?;
            commands::instances::list(client.as_ref(), json).await
        }
        Commands::Instance { id } => {
            let client = connect(args.service, args.region)?;
            commands::instances::show(client.as_ref(), &id).await
        }
        Commands::Versions => {
            let client = connect(args.service, args.region)?;
            commands::catalog::versions(client.as_ref()).await
        }
        Commands::Flavors => {
            let client = connect(args.service, args.region)?;
            commands::catalog::flavors(client.as_ref()).await
        }
        Commands::Backups { instance } => {
            let client = connect(args.service, args.region)?;
            commands::backups::list(client.as_ref(), instance.as_deref()).await
        }
        Commands::Config { command } => commands::config::execute(command),
        Commands::Completions { shell } => {
            commands::completions::execute(shell);
            Ok(())
        }
    }
}

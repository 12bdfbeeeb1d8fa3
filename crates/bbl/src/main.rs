mod app;
mod commands;
mod config;
mod env_id;

use bbl_bosh::Deployment;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::destroy::DestroyArgs;
use commands::lbs::{CreateLbsArgs, DeleteLbsArgs};
use commands::query::Query;
use commands::up::UpArgs;
use config::GlobalArgs;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bbl")]
#[command(about = "Bootstrap a BOSH director and jumpbox on AWS, GCP or Azure", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploys BOSH director on an IAAS, creates the jumpbox and applies cloud-config
    Up(UpArgs),
    /// Tears down the BOSH director, jumpbox and infrastructure
    #[command(alias = "down")]
    Destroy(DestroyArgs),
    /// Rotates the SSH key of the jumpbox user
    Rotate,
    /// Attaches load balancers to the environment
    #[command(alias = "update-lbs")]
    CreateLbs(CreateLbsArgs),
    /// Deletes attached load balancers
    DeleteLbs(DeleteLbsArgs),
    /// Prints the attached load balancers
    Lbs,
    /// Prints the cloud-config for the environment
    CloudConfig,
    /// Prints BOSH environment variables for the director
    PrintEnv,
    /// Prints the deployment vars used for the jumpbox
    JumpboxDeploymentVars,
    /// Prints the deployment vars used for the director
    BoshDeploymentVars,
    /// Prints the BOSH director address
    DirectorAddress,
    /// Prints the BOSH director username
    DirectorUsername,
    /// Prints the BOSH director password
    DirectorPassword,
    /// Prints the BOSH director CA certificate
    DirectorCaCert,
    /// Prints the jumpbox address
    JumpboxAddress,
    /// Prints the environment ID
    EnvId,
    /// Prints the SSH private key of the jumpbox user
    SshKey,
    /// Prints the output of the last failed terraform run
    LatestError,
    /// Prints the version
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.global.debug { "debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let global = &cli.global;

    match cli.command {
        Commands::Up(args) => commands::up::handle(global, args).await,
        Commands::Destroy(args) => commands::destroy::handle(global, args).await,
        Commands::Rotate => commands::rotate::handle(global).await,
        Commands::CreateLbs(args) => commands::lbs::create(global, args).await,
        Commands::DeleteLbs(args) => commands::lbs::delete(global, args).await,
        Commands::Lbs => commands::lbs::show(global).await,
        Commands::CloudConfig => commands::cloud_config::handle(global).await,
        Commands::PrintEnv => commands::query::print_env(global).await,
        Commands::JumpboxDeploymentVars => {
            commands::deployment_vars::handle(global, Deployment::Jumpbox).await
        }
        Commands::BoshDeploymentVars => {
            commands::deployment_vars::handle(global, Deployment::Director).await
        }
        Commands::DirectorAddress => commands::query::handle(global, Query::DirectorAddress).await,
        Commands::DirectorUsername => {
            commands::query::handle(global, Query::DirectorUsername).await
        }
        Commands::DirectorPassword => {
            commands::query::handle(global, Query::DirectorPassword).await
        }
        Commands::DirectorCaCert => commands::query::handle(global, Query::DirectorCaCert).await,
        Commands::JumpboxAddress => commands::query::handle(global, Query::JumpboxAddress).await,
        Commands::EnvId => commands::query::handle(global, Query::EnvId).await,
        Commands::SshKey => commands::query::handle(global, Query::SshKey).await,
        Commands::LatestError => commands::query::handle(global, Query::LatestError).await,
        Commands::Version => commands::version::handle(),
    }
}

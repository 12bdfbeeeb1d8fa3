use crate::app::App;
use crate::commands::load_state;
use crate::config::{self, GlobalArgs};
use crate::env_id;
use anyhow::{Context, bail};
use bbl_core::State;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct UpArgs {
    /// Name to assign to your BOSH director (optional, will be randomly generated)
    #[arg(long)]
    pub name: Option<String>,

    /// Path to a BOSH ops file applied to the director deployment
    #[arg(long)]
    pub ops_file: Option<PathBuf>,

    /// Provision the infrastructure and jumpbox, but do not create a director
    #[arg(long)]
    pub no_director: bool,
}

pub async fn handle(global: &GlobalArgs, args: UpArgs) -> anyhow::Result<()> {
    let mut state = load_state(global).await?;
    let iaas = config::validate_iaas(&state)?;
    let app = App::new(iaas, &state, global);

    app.terraform.validate_version().await?;
    app.bosh.validate_version().await?;

    if args.no_director {
        if state.has_director() {
            bail!("Director already exists, you must re-create your environment to use \"--no-director\"");
        }
        state.no_director = true;
    }

    state.env_id = env_id::resolve(&state.env_id, args.name.as_deref())?;

    if let Some(path) = &args.ops_file {
        state.bosh.user_ops_file = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Reading ops file: {}", path.display()))?;
    }

    let state = run(&app, state).await?;

    println!();
    println!(
        "{}",
        format!("✓ Environment {} is up", state.env_id).green().bold()
    );
    Ok(())
}

/// Terraform, jumpbox, director, cloud-config; the state is saved after every stage
pub async fn run(app: &App, state: State) -> anyhow::Result<State> {
    let state = app.prepare_zones(state).await?;
    app.save(&state).await?;

    let state = app.apply_terraform(state).await?;
    app.save(&state).await?;

    let state = app.bosh.create_jumpbox(state).await?;
    app.save(&state).await?;

    let state = app.bosh.create_director(state).await?;
    app.save(&state).await?;

    if state.has_director() {
        app.cloud_config.update(&state).await?;
    }

    Ok(state)
}

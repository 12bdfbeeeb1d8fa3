use crate::app::App;
use crate::commands::load_state;
use crate::config::{self, GlobalArgs};
use anyhow::Context;
use bbl_bosh::Deployment;
use bbl_core::{STATE_FILE, State};
use clap::Args;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::Path;

#[derive(Args, Debug, Clone, Default)]
pub struct DestroyArgs {
    /// Do not ask for confirmation
    #[arg(short = 'n', long)]
    pub no_confirm: bool,

    /// Exit successfully when there is no state file
    #[arg(long)]
    pub skip_if_missing: bool,
}

const GENERATED_DIRS: &[&str] = &[".bbl", "vars", "terraform"];

pub async fn handle(global: &GlobalArgs, args: DestroyArgs) -> anyhow::Result<()> {
    if args.skip_if_missing && !global.state_dir.join(STATE_FILE).is_file() {
        println!("state file not found, and --skip-if-missing flag provided, exiting");
        return Ok(());
    }
    config::ensure_state_file(&global.state_dir)?;

    let state = load_state(global).await?;
    let iaas = config::validate_iaas(&state)?;

    if !args.no_confirm {
        print!(
            "Are you sure you want to delete infrastructure for {}? This operation cannot be undone! ",
            state.env_id.cyan()
        );
        io::stdout().flush()?;
        if !confirm(io::stdin().lock())? {
            println!("Exiting without deleting infrastructure.");
            return Ok(());
        }
    }

    let app = App::new(iaas, &state, global);
    app.terraform.validate_version().await?;
    app.bosh.validate_version().await?;

    let env_id = state.env_id.clone();

    let state = app.bosh.delete_director(state).await?;
    app.save(&state).await?;

    let state = app.bosh.delete_jumpbox(state).await?;
    app.save(&state).await?;

    app.destroy_terraform(state).await?;

    app.save(&State::default()).await?;
    remove_artifacts(&global.state_dir).await?;

    println!();
    println!(
        "{}",
        format!("✓ Environment {} destroyed", env_id).green().bold()
    );
    Ok(())
}

/// Read one answer; only "yes" or "y" (any case) proceeds
pub fn confirm(mut reader: impl BufRead) -> io::Result<bool> {
    let mut answer = String::new();
    reader.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "yes" | "y"))
}

/// Remove the generated directories and scripts left next to the state file
pub async fn remove_artifacts(state_dir: &Path) -> anyhow::Result<()> {
    let mut dirs: Vec<String> = GENERATED_DIRS.iter().map(|d| d.to_string()).collect();
    let mut files = Vec::new();
    for deployment in [Deployment::Jumpbox, Deployment::Director] {
        dirs.push(deployment.deployment_dir().to_string());
        files.push(deployment.create_script());
        files.push(deployment.delete_script());
    }

    for dir in dirs {
        let path = state_dir.join(dir);
        match tokio::fs::remove_dir_all(&path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                return Err(e).with_context(|| format!("Removing {}", path.display()));
            }
            _ => {}
        }
    }

    for file in files {
        let path = state_dir.join(file);
        match tokio::fs::remove_file(&path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                return Err(e).with_context(|| format!("Removing {}", path.display()));
            }
            _ => {}
        }
    }

    Ok(())
}

use crate::app::App;
use crate::commands::{load_state, up};
use crate::config::{self, GlobalArgs};
use bbl_bosh::vars;
use colored::Colorize;

/// Drop the jumpbox SSH key from the vars-store and re-run `up` so bosh
/// generates a fresh one
pub async fn handle(global: &GlobalArgs) -> anyhow::Result<()> {
    config::ensure_state_file(&global.state_dir)?;

    let mut state = load_state(global).await?;
    let iaas = config::validate_iaas(&state)?;
    let app = App::new(iaas, &state, global);

    app.terraform.validate_version().await?;
    app.bosh.validate_version().await?;

    app.logger.step("rotating jumpbox ssh key");
    state.jumpbox.variables = vars::without_jumpbox_ssh(&state.jumpbox.variables)?;
    app.save(&state).await?;

    up::run(&app, state).await?;

    println!();
    println!("{}", "✓ Jumpbox SSH key rotated".green().bold());
    Ok(())
}

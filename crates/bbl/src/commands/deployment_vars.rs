use crate::app::App;
use crate::commands::load_state;
use crate::config::{self, GlobalArgs};
use bbl_bosh::Deployment;

/// Print the `--vars-file` contents bbl passes to `bosh create-env`
pub async fn handle(global: &GlobalArgs, deployment: Deployment) -> anyhow::Result<()> {
    config::ensure_state_file(&global.state_dir)?;

    let state = load_state(global).await?;
    let iaas = config::require_iaas(&state)?;
    let app = App::new(iaas, &state, global);

    let vars = match deployment {
        Deployment::Jumpbox => app.bosh.jumpbox_deployment_vars(&state).await?,
        Deployment::Director => app.bosh.director_deployment_vars(&state).await?,
    };
    print!("{}", vars);
    Ok(())
}

use crate::app::App;
use crate::commands::load_state;
use crate::config::{self, GlobalArgs};

/// Print the interpolated cloud-config without applying it
pub async fn handle(global: &GlobalArgs) -> anyhow::Result<()> {
    config::ensure_state_file(&global.state_dir)?;

    let state = load_state(global).await?;
    let iaas = config::validate_iaas(&state)?;
    let app = App::new(iaas, &state, global);

    let state = app.prepare_zones(state).await?;
    let cloud_config = app.cloud_config.generate(&state).await?;
    print!("{}", cloud_config);
    Ok(())
}

pub mod cloud_config;
pub mod deployment_vars;
pub mod destroy;
pub mod lbs;
pub mod query;
pub mod rotate;
pub mod up;
pub mod version;

use crate::config::{self, GlobalArgs};
use anyhow::Context;
use bbl_core::{State, Store};

/// Load the state from `--state-dir` and overlay the global flags
pub async fn load_state(args: &GlobalArgs) -> anyhow::Result<State> {
    let state = Store::new(&args.state_dir)
        .get_state()
        .await
        .context("Load state")?;
    config::merge(state, args)
}

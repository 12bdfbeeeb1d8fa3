//! In-test collaborators

use async_trait::async_trait;
use bbl_core::State;
use bbl_terraform::{Outputs, OutputsProvider, TerraformError, ZoneRetriever};

pub struct FixedOutputs(pub Outputs);

#[async_trait]
impl OutputsProvider for FixedOutputs {
    async fn get_outputs(&self, _state: &State) -> bbl_terraform::Result<Outputs> {
        Ok(self.0.clone())
    }
}

pub struct FailingOutputs;

#[async_trait]
impl OutputsProvider for FailingOutputs {
    async fn get_outputs(&self, _state: &State) -> bbl_terraform::Result<Outputs> {
        Err(TerraformError::OutputParse("failed to get outputs".into()))
    }
}

pub struct FixedZones(pub Vec<String>);

#[async_trait]
impl ZoneRetriever for FixedZones {
    async fn zones(&self, _region: &str) -> bbl_terraform::Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

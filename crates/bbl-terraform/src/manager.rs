//! Terraform lifecycle for one environment

use crate::error::{Result, TerraformError};
use crate::executor::TerraformExecutor;
use crate::generator::{InputGenerator, TemplateGenerator};
use crate::outputs::{Outputs, OutputsProvider};
use async_trait::async_trait;
use bbl_core::{State, StepLogger};
use semver::Version;
use std::sync::Arc;
use thiserror::Error;

pub const MINIMUM_VERSION: &str = "0.12.0";

/// A failed apply or destroy. The carried state has `latest_tf_output`
/// populated and `tf_state` untouched, ready to be saved for post-mortem.
#[derive(Error, Debug)]
#[error("{source}")]
pub struct ManagerError {
    state: Box<State>,
    #[source]
    source: TerraformError,
}

impl ManagerError {
    pub fn new(state: State, source: TerraformError) -> Self {
        Self {
            state: Box::new(state),
            source,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn error(&self) -> &TerraformError {
        &self.source
    }

    pub fn into_parts(self) -> (State, TerraformError) {
        (*self.state, self.source)
    }
}

pub struct Manager {
    executor: Arc<dyn TerraformExecutor>,
    templates: Arc<dyn TemplateGenerator>,
    inputs: Arc<dyn InputGenerator>,
    logger: Arc<dyn StepLogger>,
}

impl Manager {
    pub fn new(
        executor: Arc<dyn TerraformExecutor>,
        templates: Arc<dyn TemplateGenerator>,
        inputs: Arc<dyn InputGenerator>,
        logger: Arc<dyn StepLogger>,
    ) -> Self {
        Self {
            executor,
            templates,
            inputs,
            logger,
        }
    }

    pub async fn apply(&self, mut state: State) -> std::result::Result<State, ManagerError> {
        self.logger.step("generating terraform template");
        let template = self.templates.generate(&state);

        self.logger.step("generating terraform variables");
        let inputs = match self.inputs.generate(&state).await {
            Ok(inputs) => inputs,
            Err(e) => return Err(ManagerError::new(state, e)),
        };

        self.logger.step("applying terraform template");
        match self.executor.apply(&inputs, &template, &state.tf_state).await {
            Ok(run) => {
                state.tf_state = run.tf_state;
                state.latest_tf_output = run.output;
                self.logger.step("terraform apply");
                Ok(state)
            }
            Err(e) => {
                state.latest_tf_output = e.output;
                Err(ManagerError::new(state, e.source))
            }
        }
    }

    pub async fn destroy(&self, mut state: State) -> std::result::Result<State, ManagerError> {
        if state.tf_state.is_empty() {
            tracing::debug!("No terraform state, nothing to destroy");
            return Ok(state);
        }

        self.logger.step("destroying infrastructure");
        let template = self.templates.generate(&state);
        let inputs = match self.inputs.generate(&state).await {
            Ok(inputs) => inputs,
            Err(e) => return Err(ManagerError::new(state, e)),
        };

        match self
            .executor
            .destroy(&inputs, &template, &state.tf_state)
            .await
        {
            Ok(run) => {
                state.tf_state = run.tf_state;
                state.latest_tf_output = run.output;
                self.logger.step("finished destroying infrastructure");
                Ok(state)
            }
            Err(e) => {
                state.latest_tf_output = e.output;
                Err(ManagerError::new(state, e.source))
            }
        }
    }

    pub async fn version(&self) -> Result<String> {
        self.executor.version().await
    }

    /// Fail unless the installed terraform is new enough for the templates
    pub async fn validate_version(&self) -> Result<()> {
        let found = self.version().await?;
        check_minimum(&found, MINIMUM_VERSION)
    }
}

#[async_trait]
impl OutputsProvider for Manager {
    async fn get_outputs(&self, state: &State) -> Result<Outputs> {
        if state.tf_state.is_empty() {
            return Ok(Outputs::default());
        }
        self.executor.outputs(&state.tf_state).await
    }
}

fn check_minimum(found: &str, minimum: &str) -> Result<()> {
    let parsed =
        Version::parse(found).map_err(|e| TerraformError::VersionParse(e.to_string()))?;
    let required =
        Version::parse(minimum).map_err(|e| TerraformError::VersionParse(e.to_string()))?;

    if parsed < required {
        return Err(TerraformError::VersionTooOld {
            found: found.to_string(),
            minimum: minimum.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{ExecutorError, RunOutput};
    use crate::generator::Inputs;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingLogger(Mutex<Vec<String>>);

    impl StepLogger for RecordingLogger {
        fn step(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }

        fn println(&self, _message: &str) {}
    }

    struct StaticTemplate;

    impl TemplateGenerator for StaticTemplate {
        fn generate(&self, state: &State) -> String {
            format!("template for {}", state.env_id)
        }
    }

    struct StaticInputs(bool);

    #[async_trait]
    impl InputGenerator for StaticInputs {
        async fn generate(&self, state: &State) -> Result<Inputs> {
            if !self.0 {
                return Err(TerraformError::EmptyZones);
            }
            Ok(Inputs::from([("env_id".to_string(), json!(state.env_id))]))
        }
    }

    #[derive(Default)]
    struct FakeExecutor {
        fail: bool,
        version: String,
        received: Mutex<Vec<(Inputs, String, String)>>,
    }

    impl FakeExecutor {
        fn record(
            &self,
            inputs: &Inputs,
            template: &str,
            tf_state: &str,
            result: &str,
        ) -> std::result::Result<RunOutput, ExecutorError> {
            self.received.lock().unwrap().push((
                inputs.clone(),
                template.to_string(),
                tf_state.to_string(),
            ));
            if self.fail {
                return Err(ExecutorError {
                    source: TerraformError::CommandFailed {
                        operation: "apply".into(),
                        status: "exit status 1".into(),
                    },
                    output: "some terraform error".into(),
                });
            }
            Ok(RunOutput {
                tf_state: result.to_string(),
                output: "some terraform output".into(),
            })
        }
    }

    #[async_trait]
    impl TerraformExecutor for FakeExecutor {
        async fn apply(
            &self,
            inputs: &Inputs,
            template: &str,
            tf_state: &str,
        ) -> std::result::Result<RunOutput, ExecutorError> {
            self.record(inputs, template, tf_state, "applied-tf-state")
        }

        async fn destroy(
            &self,
            inputs: &Inputs,
            template: &str,
            tf_state: &str,
        ) -> std::result::Result<RunOutput, ExecutorError> {
            self.record(inputs, template, tf_state, "")
        }

        async fn outputs(&self, tf_state: &str) -> Result<Outputs> {
            Ok(Outputs::new(
                [("tf_state".to_string(), json!(tf_state))].into(),
            ))
        }

        async fn version(&self) -> Result<String> {
            Ok(self.version.clone())
        }
    }

    fn build(executor: Arc<FakeExecutor>, inputs_ok: bool) -> (Manager, Arc<RecordingLogger>) {
        let logger = Arc::new(RecordingLogger::default());
        let manager = Manager::new(
            executor,
            Arc::new(StaticTemplate),
            Arc::new(StaticInputs(inputs_ok)),
            logger.clone(),
        );
        (manager, logger)
    }

    fn state() -> State {
        State {
            env_id: "some-env".into(),
            tf_state: "previous-tf-state".into(),
            ..State::default()
        }
    }

    #[tokio::test]
    async fn test_apply() {
        let executor = Arc::new(FakeExecutor::default());
        let (manager, logger) = build(executor.clone(), true);

        let state = manager.apply(state()).await.unwrap();

        assert_eq!(state.tf_state, "applied-tf-state");
        assert_eq!(state.latest_tf_output, "some terraform output");

        let received = executor.received.lock().unwrap();
        assert_eq!(received[0].1, "template for some-env");
        assert_eq!(received[0].2, "previous-tf-state");
        assert_eq!(
            *logger.0.lock().unwrap(),
            vec![
                "generating terraform template",
                "generating terraform variables",
                "applying terraform template",
                "terraform apply",
            ]
        );
    }

    #[tokio::test]
    async fn test_apply_failure_carries_state() {
        let executor = Arc::new(FakeExecutor {
            fail: true,
            ..FakeExecutor::default()
        });
        let (manager, _) = build(executor, true);

        let err = manager.apply(state()).await.unwrap_err();

        assert_eq!(err.to_string(), "Run terraform apply: exit status 1");
        assert_eq!(err.state().tf_state, "previous-tf-state");
        assert_eq!(err.state().latest_tf_output, "some terraform error");
    }

    #[tokio::test]
    async fn test_input_failure_skips_executor() {
        let executor = Arc::new(FakeExecutor::default());
        let (manager, _) = build(executor.clone(), false);

        let (state, source) = manager.apply(state()).await.unwrap_err().into_parts();

        assert!(matches!(source, TerraformError::EmptyZones));
        assert_eq!(state.tf_state, "previous-tf-state");
        assert!(executor.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_destroy_clears_tf_state() {
        let executor = Arc::new(FakeExecutor::default());
        let (manager, _) = build(executor, true);

        let state = manager.destroy(state()).await.unwrap();
        assert_eq!(state.tf_state, "");
    }

    #[tokio::test]
    async fn test_destroy_without_tf_state_is_noop() {
        let executor = Arc::new(FakeExecutor::default());
        let (manager, logger) = build(executor.clone(), true);

        let state = manager.destroy(State::default()).await.unwrap();

        assert!(state.is_empty());
        assert!(executor.received.lock().unwrap().is_empty());
        assert!(logger.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_outputs() {
        let (manager, _) = build(Arc::new(FakeExecutor::default()), true);

        let outputs = manager.get_outputs(&state()).await.unwrap();
        assert_eq!(outputs.get_string("tf_state"), "previous-tf-state");

        let empty = manager.get_outputs(&State::default()).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_validate_version() {
        let old = Arc::new(FakeExecutor {
            version: "0.11.14".into(),
            ..FakeExecutor::default()
        });
        let (manager, _) = build(old, true);
        let err = manager.validate_version().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Terraform version must be at least v0.12.0, found v0.11.14"
        );

        let current = Arc::new(FakeExecutor {
            version: "1.5.7".into(),
            ..FakeExecutor::default()
        });
        let (manager, _) = build(current, true);
        manager.validate_version().await.unwrap();
    }
}

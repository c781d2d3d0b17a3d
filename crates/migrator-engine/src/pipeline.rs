//! Sequential stage pipeline with cooperative cancellation.
//!
//! Stages run strictly in order against one [`ExecutionContext`]. A stage
//! may request cancellation through the shared [`AbortSignal`]; the signal
//! is only checked between stages, so every stage completes as a unit.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::Instrument;

use migrator_core::context::ExecutionContext;
use migrator_core::error::AppError;
use migrator_core::result::AppResult;
use migrator_core::traits::UserInteraction;

/// Message shown when a stage cancels the run.
pub const ABORTED_MESSAGE: &str = "Migration aborted";

/// One unit of pipeline work.
#[async_trait]
pub trait Stage: Send + Sync + fmt::Debug {
    /// Stage name used in logs.
    fn name(&self) -> &str;

    /// Shown while the stage runs.
    fn processing_message(&self) -> Option<&str> {
        None
    }

    /// Shown when the stage succeeds. Falls back to the processing message.
    fn success_message(&self) -> Option<&str> {
        None
    }

    /// Shown when the stage fails.
    fn failure_message(&self) -> Option<&str> {
        None
    }

    /// Execute the stage.
    async fn run(&self, ctx: &mut ExecutionContext, abort: &AbortSignal) -> AppResult<()>;
}

/// Shared, monotonic cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    aborted: Arc<AtomicBool>,
}

impl AbortSignal {
    /// Create an unset signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Cannot be undone.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

/// Lifecycle of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Not started.
    Idle,
    /// Executing stages.
    Running,
    /// Every stage succeeded.
    Completed,
    /// A stage requested cancellation.
    Aborted,
    /// A stage failed.
    Failed,
}

/// Non-error termination of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Every stage ran.
    Completed,
    /// A stage cancelled the run; later stages were skipped.
    Aborted,
}

/// Ordered list of stages reporting progress through a [`UserInteraction`].
#[derive(Debug)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    interaction: Arc<dyn UserInteraction>,
    abort: AbortSignal,
    state: PipelineState,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new(interaction: Arc<dyn UserInteraction>) -> Self {
        Self {
            stages: Vec::new(),
            interaction,
            abort: AbortSignal::new(),
            state: PipelineState::Idle,
        }
    }

    /// Append a stage.
    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Append a boxed stage.
    pub fn add_stage(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    /// Names of the stages in execution order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Signal shared with the stages; the CLI sets it on Ctrl+C or SIGTERM.
    pub fn abort_signal(&self) -> AbortSignal {
        self.abort.clone()
    }

    /// Run every stage in order.
    ///
    /// Returns `Aborted` when a stage cancelled the run and propagates the
    /// error of the first failing stage. A pipeline runs at most once.
    pub async fn run(&mut self, ctx: &mut ExecutionContext) -> AppResult<PipelineOutcome> {
        if self.state != PipelineState::Idle {
            return Err(AppError::internal("Pipeline has already been run."));
        }
        self.state = PipelineState::Running;

        for stage in &self.stages {
            if let Some(message) = stage.processing_message() {
                self.interaction.spinner(message);
            }

            let span = tracing::info_span!("stage", stage = stage.name());
            let result = async {
                tracing::debug!("Stage started");
                stage.run(ctx, &self.abort).await
            }
            .instrument(span)
            .await;

            match result {
                Ok(()) => {
                    if let Some(message) = stage.success_message().or(stage.processing_message()) {
                        self.interaction.succeed(message);
                    }
                    tracing::info!(stage = stage.name(), "Stage completed");
                }
                Err(e) => {
                    if let Some(message) = stage.failure_message() {
                        self.interaction.fail(message);
                    }
                    tracing::error!(stage = stage.name(), error = %e, "Stage failed");
                    self.state = PipelineState::Failed;
                    return Err(e);
                }
            }

            if self.abort.is_aborted() {
                self.interaction.warn(ABORTED_MESSAGE);
                tracing::warn!(stage = stage.name(), "Pipeline aborted");
                self.state = PipelineState::Aborted;
                return Ok(PipelineOutcome::Aborted);
            }
        }

        self.state = PipelineState::Completed;
        Ok(PipelineOutcome::Completed)
    }
}

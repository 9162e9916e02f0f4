use super::context::JobContext;
use std::time::Duration;

/// Errors that can occur during job execution.
#[derive(Debug)]
pub enum JobError {
    /// Shutdown was requested while the job was running.
    Cancelled,
    /// The job hit a problem it could not recover from; the tier carries on.
    ExecutionFailed(String),
    /// A store write failed and left work undone. The tier stops and its
    /// completion watermark is not advanced.
    Persistence(String),
}

impl std::fmt::Display for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobError::Cancelled => write!(f, "Job was cancelled"),
            JobError::ExecutionFailed(msg) => write!(f, "Execution failed: {}", msg),
            JobError::Persistence(msg) => write!(f, "Persistence failure: {}", msg),
        }
    }
}

impl std::error::Error for JobError {}

impl JobError {
    /// Whether a tier run that hit this error still counts as completed.
    pub fn allows_completion(&self) -> bool {
        matches!(self, JobError::ExecutionFailed(_))
    }
}

/// Trait for sync jobs.
///
/// Jobs are executed synchronously in a blocking context, one after the other
/// in the order their tier lists them.
pub trait BackgroundJob: Send + Sync {
    /// Unique identifier for this job.
    fn id(&self) -> &'static str;

    /// Human-readable name for this job.
    fn name(&self) -> &'static str;

    /// Description of what this job does.
    fn description(&self) -> &'static str;

    /// Wall-clock bound of one execution. Jobs whose work grows with the data
    /// return the bound per unit of work and say so. Tiers have no deadline of
    /// their own; their bound is the sum of these.
    fn time_bound(&self) -> Duration;

    /// Execute the job.
    ///
    /// Long-running implementations should check `ctx.is_cancelled()` between
    /// units of work and return `JobError::Cancelled` when it is set.
    fn execute(&self, ctx: &JobContext) -> Result<(), JobError>;
}

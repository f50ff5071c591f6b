use component_orchestrator::OrchestratorError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] OrchestratorError),
    #[error("Startup incomplete: {started} of {expected} components running")]
    Incomplete { started: usize, expected: usize },
}

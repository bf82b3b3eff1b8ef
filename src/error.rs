use thiserror::Error;

#[derive(Debug, Error)]
pub enum LineageError {
    #[error("invalid node `{id}`: {reason}")]
    InvalidNode { id: String, reason: String },
    #[error("invalid lineage document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("layout failed: {0}")]
    Solver(#[from] SolverError),
}

/// Failures reported by a layout solver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("solver rejected request: {0}")]
    Rejected(String),
    #[error("no position returned for node `{0}`")]
    MissingPosition(String),
    #[error("layout engine panicked: {0}")]
    Engine(String),
}

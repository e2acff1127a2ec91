#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Generic(String),
    #[error("Execution error: {0}")]
    ExecError(#[from] ferret_exec::Error),
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ferret_config::error::Error),
    #[error("Internal error: {0}")]
    Eyre(#[from] eyre::Report),
}

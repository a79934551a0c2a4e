use thiserror::Error;

pub type Result<T> = std::result::Result<T, VmSshError>;

#[derive(Debug, Error)]
pub enum VmSshError {
    /// The inventory subprocess could not be run or exited non-zero.
    #[error("inventory query failed: {0}")]
    InventoryQuery(String),

    /// The inventory subprocess produced output we could not decode.
    #[error("inventory payload invalid: {0}")]
    InventoryParse(#[from] serde_json::Error),

    #[error("`{0}` not found in PATH")]
    LauncherNotFound(String),

    #[error("failed to exec `{launcher}`: {source}")]
    LauncherExec {
        launcher: String,
        #[source]
        source: std::io::Error,
    },

    #[error("required dependency `{0}` is not installed")]
    StartupDependencyMissing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

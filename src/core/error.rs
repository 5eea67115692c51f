use thiserror::Error;

use crate::operation::ShortReadKind;

/// Errors raised by a database adapter while resolving or running operation
/// handlers. Adapters fold their own failure detail into the message.
#[derive(Error, Debug, Clone)]
pub enum DbError {
    #[error("handler retrieval failed: {0}")]
    HandlerRetrieval(String),

    #[error("operation execution failed: {0}")]
    Execution(String),
}

#[derive(Error, Debug)]
pub enum DriverError {
    /// The adapter could not produce an executable context for an operation.
    /// Never retried by the executor; retry policy belongs to the caller.
    #[error("error retrieving handler\noperation: {operation}\n{source}")]
    HandlerResolution {
        operation: String,
        source: DbError,
    },

    #[error("executor has already been shut down")]
    AlreadyShutdown,

    /// Shutdown timed out with undrained work. The two counts distinguish
    /// work that was cancelled on the queue from work caught mid-execution.
    #[error(
        "executor shut down before all handlers could complete\n\
         {never_started} handlers were queued for execution but not yet started\n\
         {mid_execution} handlers were mid-execution"
    )]
    ShutdownIncomplete {
        never_started: u64,
        mid_execution: u64,
    },

    /// An adapter failure encountered while harvesting validation results.
    /// Aborts the whole validation parameter generation.
    #[error(
        "error executing operation to retrieve validation result\n\
         db: {db}\noperation: {operation}\n{source}"
    )]
    Generation {
        db: String,
        operation: String,
        source: DbError,
    },

    /// A disabled short read kind was nonetheless dispatched. Indicates a
    /// configuration or wiring defect; always fatal.
    #[error("encountered disabled short read: {0} - it should not have been executed")]
    DisabledShortRead(ShortReadKind),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    #[error("lock error: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, DriverError>;

impl<T> From<std::sync::PoisonError<T>> for DriverError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}

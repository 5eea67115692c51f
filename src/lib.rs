// ============================================================================
// BenchDriver Library
// ============================================================================
//
// Execution core for database benchmark drivers: bounded-concurrency
// dispatch of abstract operations against a pluggable adapter, derivation of
// dependent short read operations from long read results, and mining of
// executed operations into a validation corpus.

pub mod config;
pub mod core;
pub mod db;
pub mod generator;
pub mod operation;
pub mod runtime;
pub mod validation;

// Re-export main types for convenience
pub use crate::core::{DbError, DriverError, Result};
pub use config::{ExecutorConfig, ShortReadConfig};
pub use db::{Db, RunnableContext};
pub use generator::{ChildOperationGenerator, IdBuffer};
pub use operation::{
    Chain, MessageId, Operation, OperationCatalogue, OperationClass, OperationResult, PersonId,
    ShortReadKind, TimeMilli,
};
pub use runtime::{BoundedQueue, ErrorReport, ErrorReporter, OperationExecutor};
pub use validation::{
    ValidationDecision, ValidationParam, ValidationParamsFilter, ValidationParamsGenerator,
};

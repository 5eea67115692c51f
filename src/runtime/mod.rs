pub mod executor;
pub mod queue;
pub mod reporter;

pub use executor::OperationExecutor;
pub use queue::BoundedQueue;
pub use reporter::{ErrorReport, ErrorReporter};

//! The narrow interface a database adapter implements for the driver core.

use crate::core::DbError;
use crate::operation::{Operation, OperationResult};

/// A database adapter. Resolves abstract operations into runnable handler
/// contexts. Used identically by the executor and the validation generator.
pub trait Db: Send + Sync {
    /// Adapter name used in diagnostics.
    fn name(&self) -> &str;

    /// Bind one operation to this adapter, producing the executable context
    /// that will run it. Consumes the operation; a finished context hands it
    /// back through [`RunnableContext::into_operation`].
    fn runnable_context(
        &self,
        operation: Box<dyn Operation>,
    ) -> Result<Box<dyn RunnableContext>, DbError>;
}

/// The executable binding of one operation to a database adapter.
///
/// Exclusively owned by the worker that runs it, for the context's lifetime.
/// `cleanup` is called exactly once after execution, success or failure,
/// before the context is discarded.
pub trait RunnableContext: Send {
    /// The bound operation.
    fn operation(&self) -> &dyn Operation;

    /// Run the bound operation against the adapter and capture its result.
    fn execute(&mut self) -> Result<Box<dyn OperationResult>, DbError>;

    /// Release per-operation resources.
    fn cleanup(&mut self);

    /// Reclaim the bound operation from a finished context.
    fn into_operation(self: Box<Self>) -> Box<dyn Operation>;
}

//! Mining executed operations into a validation corpus.
//!
//! A pull-based, single-pass filter: each operation from the input stream is
//! executed against the adapter and a pluggable policy decides whether the
//! (operation, result) pair is kept and whether generation should continue.

use std::sync::Arc;

use crate::core::{DriverError, Result};
use crate::db::Db;
use crate::operation::{Operation, OperationResult};

/// Decision returned by the validation policy for one (operation, result)
/// pair. Governs both acceptance and whether the generator keeps pulling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationDecision {
    RejectAndContinue,
    RejectAndFinish,
    AcceptAndContinue,
    AcceptAndFinish,
}

/// Policy deciding which executed operations become validation parameters.
pub trait ValidationParamsFilter {
    /// Cheap pre-execution filter; rejected operations are never executed.
    fn use_operation(&self, operation: &dyn Operation) -> bool;

    /// Post-execution decision for one captured pair.
    fn use_operation_and_result(
        &mut self,
        operation: &dyn Operation,
        result: &dyn OperationResult,
    ) -> ValidationDecision;
}

/// An immutable captured (operation, result) pair, set aside to later verify
/// a database adapter's correctness.
#[derive(Debug)]
pub struct ValidationParam {
    operation: Box<dyn Operation>,
    result: Box<dyn OperationResult>,
}

impl ValidationParam {
    pub fn operation(&self) -> &dyn Operation {
        self.operation.as_ref()
    }

    pub fn result(&self) -> &dyn OperationResult {
        self.result.as_ref()
    }

    pub fn into_parts(self) -> (Box<dyn Operation>, Box<dyn OperationResult>) {
        (self.operation, self.result)
    }
}

/// Pull-based producer of validation parameters over an input operation
/// stream.
///
/// Never buffers more than one pair ahead and never re-orders. Adapter
/// failures abort the generation with an error naming the adapter and the
/// operation; after an error or a *-finish decision the iterator is fused.
pub struct ValidationParamsGenerator<I> {
    db: Arc<dyn Db>,
    filter: Box<dyn ValidationParamsFilter>,
    operations: I,
    entries_written_so_far: usize,
    need_more: bool,
}

impl<I> ValidationParamsGenerator<I>
where
    I: Iterator<Item = Box<dyn Operation>>,
{
    pub fn new(db: Arc<dyn Db>, filter: Box<dyn ValidationParamsFilter>, operations: I) -> Self {
        Self {
            db,
            filter,
            operations,
            entries_written_so_far: 0,
            need_more: true,
        }
    }

    /// Number of pairs accepted so far; queryable at any time for progress
    /// reporting.
    pub fn entries_written_so_far(&self) -> usize {
        self.entries_written_so_far
    }

    fn next_param(&mut self) -> Result<Option<ValidationParam>> {
        while self.need_more {
            let Some(operation) = self.operations.next() else {
                return Ok(None);
            };

            if !self.filter.use_operation(operation.as_ref()) {
                continue;
            }

            let description = format!("{operation:?}");
            let mut context = self.db.runnable_context(operation).map_err(|source| {
                self.need_more = false;
                DriverError::Generation {
                    db: self.db.name().to_string(),
                    operation: description.clone(),
                    source,
                }
            })?;

            let outcome = context.execute();
            context.cleanup();
            let result = match outcome {
                Ok(result) => result,
                Err(source) => {
                    self.need_more = false;
                    return Err(DriverError::Generation {
                        db: self.db.name().to_string(),
                        operation: description,
                        source,
                    });
                }
            };
            let operation = context.into_operation();

            match self
                .filter
                .use_operation_and_result(operation.as_ref(), result.as_ref())
            {
                ValidationDecision::RejectAndContinue => continue,
                ValidationDecision::RejectAndFinish => {
                    self.need_more = false;
                }
                ValidationDecision::AcceptAndContinue => {
                    self.entries_written_so_far += 1;
                    return Ok(Some(ValidationParam { operation, result }));
                }
                ValidationDecision::AcceptAndFinish => {
                    self.entries_written_so_far += 1;
                    self.need_more = false;
                    return Ok(Some(ValidationParam { operation, result }));
                }
            }
        }
        // Ran out of operations, or the validation set is complete.
        Ok(None)
    }
}

impl<I> Iterator for ValidationParamsGenerator<I>
where
    I: Iterator<Item = Box<dyn Operation>>,
{
    type Item = Result<ValidationParam>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_param() {
            Ok(Some(param)) => Some(Ok(param)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

//! Shared fixtures for the integration suites: a configurable in-memory
//! adapter, stub operations, and stub results.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use benchdriver::{
    Db, DbError, Operation, OperationCatalogue, OperationClass, OperationResult, RunnableContext,
    ShortReadKind, TimeMilli,
};

#[derive(Debug)]
pub struct StubOperation {
    pub class: OperationClass,
    pub scheduled: Option<TimeMilli>,
    pub id: Option<u64>,
}

impl StubOperation {
    pub fn long_read(scheduled: TimeMilli) -> Box<dyn Operation> {
        Box::new(Self {
            class: OperationClass::LongRead,
            scheduled: Some(scheduled),
            id: None,
        })
    }

    pub fn short_read(kind: ShortReadKind, scheduled: TimeMilli) -> Box<dyn Operation> {
        Box::new(Self {
            class: OperationClass::ShortRead(kind),
            scheduled: Some(scheduled),
            id: None,
        })
    }

    pub fn update(scheduled: TimeMilli) -> Box<dyn Operation> {
        Box::new(Self {
            class: OperationClass::Update,
            scheduled: Some(scheduled),
            id: None,
        })
    }
}

impl Operation for StubOperation {
    fn class(&self) -> OperationClass {
        self.class
    }

    fn scheduled_start_time(&self) -> Option<TimeMilli> {
        self.scheduled
    }

    fn set_scheduled_start_time(&mut self, start_time: TimeMilli) {
        self.scheduled = Some(start_time);
    }
}

#[derive(Debug, Default)]
pub struct StubResult {
    pub person_ids: Vec<u64>,
    pub message_ids: Vec<u64>,
}

impl StubResult {
    pub fn with_ids(person_ids: Vec<u64>, message_ids: Vec<u64>) -> Self {
        Self {
            person_ids,
            message_ids,
        }
    }
}

impl OperationResult for StubResult {
    fn person_ids(&self) -> Vec<u64> {
        self.person_ids.clone()
    }

    fn message_ids(&self) -> Vec<u64> {
        self.message_ids.clone()
    }
}

/// Catalogue producing stub short reads that remember their kind and id.
pub struct StubCatalogue;

impl OperationCatalogue for StubCatalogue {
    fn create_short_read(&self, kind: ShortReadKind, id: u64) -> Box<dyn Operation> {
        Box::new(StubOperation {
            class: OperationClass::ShortRead(kind),
            scheduled: None,
            id: Some(id),
        })
    }
}

/// In-memory adapter with configurable latency and failure behavior.
///
/// Records the scheduled start time of every executed operation, counts
/// cleanups, and can be told to fail handler resolution or execution for
/// operations scheduled at a given time.
pub struct StubDb {
    pub execution_delay: Duration,
    pub fail_resolve_at: Option<TimeMilli>,
    pub fail_execute_at: Option<TimeMilli>,
    pub executed: Arc<Mutex<Vec<TimeMilli>>>,
    pub cleanups: Arc<AtomicUsize>,
}

impl StubDb {
    pub fn new() -> Self {
        Self {
            execution_delay: Duration::ZERO,
            fail_resolve_at: None,
            fail_execute_at: None,
            executed: Arc::new(Mutex::new(Vec::new())),
            cleanups: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.execution_delay = delay;
        self
    }

    pub fn failing_resolve_at(mut self, scheduled: TimeMilli) -> Self {
        self.fail_resolve_at = Some(scheduled);
        self
    }

    pub fn failing_execute_at(mut self, scheduled: TimeMilli) -> Self {
        self.fail_execute_at = Some(scheduled);
        self
    }

    pub fn executed_times(&self) -> Vec<TimeMilli> {
        self.executed.lock().unwrap().clone()
    }

    pub fn cleanup_count(&self) -> usize {
        self.cleanups.load(Ordering::SeqCst)
    }
}

impl Db for StubDb {
    fn name(&self) -> &str {
        "StubDb"
    }

    fn runnable_context(
        &self,
        operation: Box<dyn Operation>,
    ) -> Result<Box<dyn RunnableContext>, DbError> {
        let scheduled = operation.scheduled_start_time().unwrap_or(0);
        if self.fail_resolve_at == Some(scheduled) {
            return Err(DbError::HandlerRetrieval(format!(
                "no handler for operation scheduled at {scheduled}"
            )));
        }
        Ok(Box::new(StubContext {
            operation: Some(operation),
            delay: self.execution_delay,
            fail: self.fail_execute_at == Some(scheduled),
            executed: Arc::clone(&self.executed),
            cleanups: Arc::clone(&self.cleanups),
        }))
    }
}

pub struct StubContext {
    operation: Option<Box<dyn Operation>>,
    delay: Duration,
    fail: bool,
    executed: Arc<Mutex<Vec<TimeMilli>>>,
    cleanups: Arc<AtomicUsize>,
}

impl RunnableContext for StubContext {
    fn operation(&self) -> &dyn Operation {
        self.operation
            .as_deref()
            .expect("operation already reclaimed")
    }

    fn execute(&mut self) -> Result<Box<dyn OperationResult>, DbError> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        let scheduled = self.operation().scheduled_start_time().unwrap_or(0);
        if self.fail {
            return Err(DbError::Execution(format!(
                "operation scheduled at {scheduled} failed"
            )));
        }
        self.executed.lock().unwrap().push(scheduled);
        Ok(Box::new(StubResult::default()))
    }

    fn cleanup(&mut self) {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
    }

    fn into_operation(mut self: Box<Self>) -> Box<dyn Operation> {
        self.operation.take().expect("operation already reclaimed")
    }
}

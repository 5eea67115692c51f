use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, warn};

use super::queue::BoundedQueue;
use super::reporter::ErrorReporter;
use crate::config::ExecutorConfig;
use crate::core::{DriverError, Result};
use crate::db::{Db, RunnableContext};
use crate::operation::Operation;

const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(10);

enum Work {
    Run(Box<dyn RunnableContext>),
    Stop,
}

/// Fixed-size pool of long-lived worker threads executing operation handler
/// contexts.
///
/// `execute` resolves an operation to its handler context through the
/// injected [`Db`] and hands it to the pool through a [`BoundedQueue`],
/// blocking when the queue is full. Each worker loops take, execute,
/// cleanup, decrement. No work-stealing, no dynamic resizing.
pub struct OperationExecutor {
    db: Arc<dyn Db>,
    queue: Arc<BoundedQueue<Work>>,
    uncompleted: Arc<AtomicU64>,
    shutdown: AtomicBool,
    workers: Vec<JoinHandle<()>>,
}

impl OperationExecutor {
    pub fn new(
        config: ExecutorConfig,
        db: Arc<dyn Db>,
        reporter: Arc<ErrorReporter>,
    ) -> Result<Self> {
        config.validate().map_err(DriverError::Config)?;

        let queue = Arc::new(BoundedQueue::new(config.queue_capacity));
        let uncompleted = Arc::new(AtomicU64::new(0));

        let mut workers = Vec::with_capacity(config.worker_threads);
        for worker_id in 0..config.worker_threads {
            let queue = Arc::clone(&queue);
            let uncompleted = Arc::clone(&uncompleted);
            let reporter = Arc::clone(&reporter);
            let handle = thread::Builder::new()
                .name(format!("operation-executor-{worker_id}"))
                .spawn(move || worker_loop(&queue, &uncompleted, &reporter))?;
            workers.push(handle);
        }

        debug!(
            worker_threads = config.worker_threads,
            queue_capacity = config.queue_capacity,
            "operation executor started"
        );

        Ok(Self {
            db,
            queue,
            uncompleted,
            shutdown: AtomicBool::new(false),
            workers,
        })
    }

    /// Resolve the operation's handler context and submit it to the pool,
    /// blocking while the work queue is full.
    ///
    /// A resolution failure is returned immediately and never retried here;
    /// retry policy, if any, belongs to the caller.
    pub fn execute(&self, operation: Box<dyn Operation>) -> Result<()> {
        if self.shutdown.load(Ordering::SeqCst) {
            return Err(DriverError::AlreadyShutdown);
        }

        let description = format!("{operation:?}");
        let context = self
            .db
            .runnable_context(operation)
            .map_err(|source| DriverError::HandlerResolution {
                operation: description,
                source,
            })?;

        self.uncompleted.fetch_add(1, Ordering::SeqCst);
        self.queue.put(Work::Run(context))
    }

    /// Point-in-time snapshot of queued plus in-flight work.
    pub fn uncompleted_count(&self) -> u64 {
        self.uncompleted.load(Ordering::SeqCst)
    }

    /// Stop accepting work and wait up to `timeout` for queued and in-flight
    /// work to drain.
    ///
    /// If work remains after the timeout, queued-but-not-started contexts are
    /// cancelled and the error reports how many operations were never started
    /// versus caught mid-execution. In-flight work is never interrupted; it
    /// runs to completion in the background. Calling `shutdown` twice fails
    /// with [`DriverError::AlreadyShutdown`].
    pub fn shutdown(&mut self, timeout: Duration) -> Result<()> {
        if self.shutdown.swap(true, Ordering::SeqCst) {
            return Err(DriverError::AlreadyShutdown);
        }

        let deadline = Instant::now() + timeout;
        while self.uncompleted.load(Ordering::SeqCst) > 0 {
            if Instant::now() >= deadline {
                return self.force_shutdown();
            }
            thread::sleep(SHUTDOWN_POLL_INTERVAL);
        }

        self.stop_workers()?;
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        debug!("operation executor shut down cleanly");
        Ok(())
    }

    fn force_shutdown(&mut self) -> Result<()> {
        let cancelled = self.queue.drain()?;
        let never_started = cancelled
            .iter()
            .filter(|work| matches!(work, Work::Run(_)))
            .count() as u64;
        self.uncompleted.fetch_sub(never_started, Ordering::SeqCst);
        let mid_execution = self.uncompleted.load(Ordering::SeqCst);

        // Workers finish their current context, then exit. Not joined: the
        // remaining work is reported as mid-execution, not interrupted.
        self.stop_workers()?;

        warn!(
            never_started,
            mid_execution, "executor shut down before all handlers could complete"
        );
        Err(DriverError::ShutdownIncomplete {
            never_started,
            mid_execution,
        })
    }

    fn stop_workers(&self) -> Result<()> {
        for _ in 0..self.workers.len() {
            self.queue.put(Work::Stop)?;
        }
        Ok(())
    }
}

fn worker_loop(
    queue: &BoundedQueue<Work>,
    uncompleted: &AtomicU64,
    reporter: &ErrorReporter,
) {
    loop {
        let work = match queue.take() {
            Ok(work) => work,
            Err(e) => {
                reporter.report_error(
                    "OperationExecutor",
                    format!("worker failed to take from work queue: {e}"),
                );
                return;
            }
        };

        match work {
            Work::Stop => return,
            Work::Run(mut context) => {
                if let Err(e) = context.execute() {
                    error!(operation = ?context.operation(), error = %e, "operation handler failed");
                    reporter.report_error(
                        "OperationExecutor",
                        format!(
                            "operation handler failed\noperation: {:?}\n{e}",
                            context.operation()
                        ),
                    );
                }
                // Cleanup runs exactly once, success or failure, before the
                // in-flight count is released.
                context.cleanup();
                uncompleted.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }
}

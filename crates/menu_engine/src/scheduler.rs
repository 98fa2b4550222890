//! Scheduler abstraction and the tick-driven implementation hosts embed.
//!
//! Menu state is only ever touched from the synchronous context, which is the host's
//! main tick loop. Long-latency work runs on the async pool and hops back to the
//! synchronous context through [`Scheduler::run_sync`].

use crossbeam::channel::{unbounded, Receiver, Sender};
use dashmap::DashMap;
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// Work executed on the synchronous context.
pub type SyncTask = Box<dyn FnOnce() + Send + 'static>;

/// Work executed on the async pool.
pub type AsyncTask = BoxFuture<'static, ()>;

/// Opaque handle used to cancel a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

pub trait Scheduler: Send + Sync {
    fn run_sync(&self, task: SyncTask, delay: Duration) -> TaskHandle;
    fn run_async(&self, task: AsyncTask, delay: Duration) -> TaskHandle;
    /// Cancelling a task that already ran is a no-op.
    fn cancel_sync(&self, handle: TaskHandle);
    fn cancel_async(&self, handle: TaskHandle);
}

struct QueuedTask {
    handle: TaskHandle,
    due: Instant,
    task: SyncTask,
}

/// Scheduler whose synchronous tasks run when the host calls [`run_due`](Self::run_due)
/// from its tick loop. Async tasks are spawned on a tokio runtime.
pub struct TickScheduler {
    next_id: AtomicU64,
    sender: Sender<QueuedTask>,
    receiver: Receiver<QueuedTask>,
    waiting: Mutex<Vec<QueuedTask>>,
    async_tasks: DashMap<TaskHandle, JoinHandle<()>>,
    runtime: Handle,
}

impl TickScheduler {
    pub fn new(runtime: Handle) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            next_id: AtomicU64::new(1),
            sender,
            receiver,
            waiting: Mutex::new(Vec::new()),
            async_tasks: DashMap::new(),
            runtime,
        }
    }

    fn next_handle(&self) -> TaskHandle {
        TaskHandle(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Moves newly submitted tasks into the waiting list.
    fn drain_incoming(&self, waiting: &mut Vec<QueuedTask>) {
        waiting.extend(self.receiver.try_iter());
    }

    /// Runs every synchronous task due at `now`, in due order. Returns how many ran.
    ///
    /// Tasks scheduled while this batch runs wait for the next call.
    pub fn run_due(&self, now: Instant) -> usize {
        let batch = {
            let mut waiting = self.waiting.lock().unwrap_or_else(PoisonError::into_inner);
            self.drain_incoming(&mut waiting);
            let (mut due, rest): (Vec<_>, Vec<_>) = waiting.drain(..).partition(|task| task.due <= now);
            *waiting = rest;
            due.sort_by_key(|task| (task.due, task.handle.0));
            due
        };

        let count = batch.len();
        for queued in batch {
            (queued.task)();
        }
        count
    }

    /// Runs everything due right now.
    pub fn run_pending(&self) -> usize {
        self.run_due(Instant::now())
    }

    /// Synchronous tasks not yet executed.
    pub fn pending_sync(&self) -> usize {
        let mut waiting = self.waiting.lock().unwrap_or_else(PoisonError::into_inner);
        self.drain_incoming(&mut waiting);
        waiting.len()
    }

    /// Async tasks still running.
    pub fn pending_async(&self) -> usize {
        self.async_tasks.retain(|_, task| !task.is_finished());
        self.async_tasks.len()
    }
}

impl Scheduler for TickScheduler {
    fn run_sync(&self, task: SyncTask, delay: Duration) -> TaskHandle {
        let handle = self.next_handle();
        let queued = QueuedTask {
            handle,
            due: Instant::now() + delay,
            task,
        };
        if self.sender.send(queued).is_err() {
            debug!("Sync queue closed, dropping task {:?}", handle);
        }
        handle
    }

    fn run_async(&self, task: AsyncTask, delay: Duration) -> TaskHandle {
        let handle = self.next_handle();
        let join = self.runtime.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            task.await;
        });
        self.async_tasks.retain(|_, task| !task.is_finished());
        self.async_tasks.insert(handle, join);
        handle
    }

    fn cancel_sync(&self, handle: TaskHandle) {
        let mut waiting = self.waiting.lock().unwrap_or_else(PoisonError::into_inner);
        self.drain_incoming(&mut waiting);
        waiting.retain(|task| task.handle != handle);
    }

    fn cancel_async(&self, handle: TaskHandle) {
        if let Some((_, join)) = self.async_tasks.remove(&handle) {
            join.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> SyncTask) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let make = move |value: u32| -> SyncTask {
            let sink = sink.clone();
            Box::new(move || sink.lock().unwrap().push(value))
        };
        (log, make)
    }

    #[tokio::test]
    async fn test_sync_tasks_wait_for_their_due_time() {
        let scheduler = TickScheduler::new(Handle::current());
        let (log, task) = recorder();

        scheduler.run_sync(task(2), Duration::from_secs(10));
        scheduler.run_sync(task(1), Duration::ZERO);

        assert_eq!(scheduler.run_pending(), 1);
        assert_eq!(*log.lock().unwrap(), vec![1]);
        assert_eq!(scheduler.pending_sync(), 1);

        assert_eq!(scheduler.run_due(Instant::now() + Duration::from_secs(11)), 1);
        assert_eq!(*log.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_cancel_sync() {
        let scheduler = TickScheduler::new(Handle::current());
        let (log, task) = recorder();

        let handle = scheduler.run_sync(task(1), Duration::ZERO);
        scheduler.run_sync(task(2), Duration::ZERO);
        scheduler.cancel_sync(handle);

        scheduler.run_pending();
        assert_eq!(*log.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_async_task_hops_back_to_sync() {
        let scheduler = Arc::new(TickScheduler::new(Handle::current()));
        let (log, task) = recorder();

        let sync_side = scheduler.clone();
        scheduler.run_async(
            Box::pin(async move {
                sync_side.run_sync(task(7), Duration::ZERO);
            }),
            Duration::ZERO,
        );

        for _ in 0..100 {
            if scheduler.run_pending() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(*log.lock().unwrap(), vec![7]);
    }

    #[tokio::test]
    async fn test_cancel_async() {
        let scheduler = TickScheduler::new(Handle::current());
        let (log, task) = recorder();
        let sink = Arc::new(Mutex::new(Some(task(1))));

        let handle = scheduler.run_async(
            Box::pin(async move {
                if let Some(task) = sink.lock().unwrap().take() {
                    task();
                }
            }),
            Duration::from_secs(60),
        );
        scheduler.cancel_async(handle);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(scheduler.pending_async(), 0);
    }
}

use futures::future::{AbortHandle, Abortable, Aborted};
use std::future::Future;
use tokio::task::JoinHandle;

/// Background loop which runs until it is cancelled.
#[derive(Debug)]
pub struct Task {
    name: &'static str,
    shutdown: AbortHandle,
    handle: JoinHandle<Result<(), Aborted>>,
}

impl Task {
    /// Creates a new task and immediatly runs it in a `tokio::task`.
    pub fn spawn<F>(name: &'static str, task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (shutdown, abort_registration) = AbortHandle::new_pair();
        let future = Abortable::new(task, abort_registration);
        let handle = tokio::task::spawn(async move {
            let result = future.await;
            if result.is_ok() {
                log::warn!("Background task '{}' stopped on its own.", name);
            }
            result
        });
        log::debug!("Spawned background task '{}'", name);

        Self {
            name,
            shutdown,
            handle,
        }
    }

    /// Cancels the task and joins it.
    pub async fn cancel(self) {
        self.shutdown.abort();
        let _ = self.handle.await;
        log::debug!("Cancelled background task '{}'", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use std::time::Duration;

    #[tokio::test]
    async fn cancel_stops_the_loop() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let task = Task::spawn("ticker", async move {
            loop {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        task.cancel().await;
        let after_cancel = ticks.load(Ordering::SeqCst);
        assert!(after_cancel > 0);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), after_cancel);
    }
}

//! Debounced background reparsing.
//!
//! One thread per document. Each edit sends a notice; the thread waits for
//! the first one, then keeps waiting until a full quiet period passes with
//! no further notice, and only then runs the job once. Notices that arrive
//! while the job runs start the next cycle.

use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

use crate::error::EngineError;

/// Parsing recurses once per nesting level, so the worker gets more room
/// than the platform default for spawned threads.
const STACK_SIZE: usize = 8 * 1024 * 1024;

enum Notice {
    Edited,
    Shutdown,
}

pub struct ReparseWorker {
    sender: Sender<Notice>,
    handle: Option<JoinHandle<()>>,
}

impl ReparseWorker {
    pub fn spawn<F>(debounce: Duration, job: F) -> Result<Self, EngineError>
    where
        F: Fn() + Send + 'static,
    {
        let (sender, receiver) = unbounded();
        let handle = std::thread::Builder::new()
            .name("shaderscope-reparse".to_string())
            .stack_size(STACK_SIZE)
            .spawn(move || worker_loop(&receiver, debounce, job))
            .map_err(EngineError::WorkerSpawn)?;
        Ok(Self {
            sender,
            handle: Some(handle),
        })
    }

    /// Restarts the quiet period.
    pub fn notify(&self) {
        // Only fails once the thread is gone, and then there is nobody to tell.
        let _ = self.sender.send(Notice::Edited);
    }
}

impl Drop for ReparseWorker {
    fn drop(&mut self) {
        let _ = self.sender.send(Notice::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("reparse worker panicked");
            }
        }
    }
}

fn worker_loop<F: Fn()>(receiver: &Receiver<Notice>, debounce: Duration, job: F) {
    loop {
        match receiver.recv() {
            Ok(Notice::Edited) => {}
            Ok(Notice::Shutdown) | Err(_) => return,
        }
        loop {
            match receiver.recv_timeout(debounce) {
                Ok(Notice::Edited) => log::trace!("edit during quiet period, waiting again"),
                Ok(Notice::Shutdown) | Err(RecvTimeoutError::Disconnected) => return,
                Err(RecvTimeoutError::Timeout) => break,
            }
        }
        job();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    const DEBOUNCE: Duration = Duration::from_millis(150);

    fn counting_worker() -> (ReparseWorker, Arc<AtomicUsize>, Receiver<()>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let (done, finished) = bounded(16);
        let counter = Arc::clone(&runs);
        let worker = ReparseWorker::spawn(DEBOUNCE, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = done.send(());
        })
        .unwrap();
        (worker, runs, finished)
    }

    #[test]
    fn burst_of_notices_runs_the_job_once() {
        let (worker, runs, finished) = counting_worker();
        for _ in 0..25 {
            worker.notify();
        }
        finished.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(finished.recv_timeout(DEBOUNCE * 3).is_err());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn job_waits_for_the_quiet_period() {
        let (worker, _runs, finished) = counting_worker();
        let started = Instant::now();
        worker.notify();
        finished.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(started.elapsed() >= DEBOUNCE);
    }

    #[test]
    fn later_notices_start_another_cycle() {
        let (worker, runs, finished) = counting_worker();
        worker.notify();
        finished.recv_timeout(Duration::from_secs(5)).unwrap();
        worker.notify();
        finished.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn idle_worker_never_runs() {
        let (worker, runs, _finished) = counting_worker();
        drop(worker);
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn deeply_nested_source_parses_on_the_worker() {
        let source = format!("float x = {}1.0{};", "(".repeat(10_000), ")".repeat(10_000));
        let (done, finished) = bounded(1);
        let worker = ReparseWorker::spawn(DEBOUNCE, move || {
            let tree = shaderscope_syntax::parse(&source);
            let _ = done.send(tree.errors().len());
        })
        .unwrap();
        worker.notify();
        assert_eq!(finished.recv_timeout(Duration::from_secs(10)).unwrap(), 1);
    }
}

//! Classification loop: the classifier runs on its own thread, one request
//! in flight at a time, and each answer is applied before the next request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::classify::{Classifier, Ranking};
use crate::error::{InstrumentError, Result};

use super::context::InstrumentContext;

const STOP_POLL: Duration = Duration::from_millis(100);

/// Why the loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEnd {
    /// The classifier had nothing more to give.
    Exhausted,
    /// The stop flag was raised.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    /// Classifier answers handed to the context, failures included.
    pub cycles: u64,
    pub end: LoopEnd,
}

/// Handle to the classifier worker thread.
pub struct ClassificationLoop {
    requests: Option<Sender<()>>,
    replies: Receiver<Option<Result<Ranking>>>,
    worker: Option<JoinHandle<()>>,
}

impl ClassificationLoop {
    /// Move `classifier` onto a worker thread and wait for requests.
    pub fn spawn<C>(mut classifier: C) -> Result<Self>
    where
        C: Classifier + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<()>();
        let (reply_tx, reply_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("classifier".into())
            .spawn(move || {
                for () in request_rx {
                    let reply = classifier.classify();
                    let done = reply.is_none();
                    if reply_tx.send(reply).is_err() || done {
                        break;
                    }
                }
                debug!("classifier worker exiting");
            })?;

        Ok(Self {
            requests: Some(request_tx),
            replies: reply_rx,
            worker: Some(worker),
        })
    }

    /// Drive `ctx` until the classifier is exhausted or `stop` is raised.
    pub fn run(&mut self, ctx: &mut InstrumentContext, stop: &AtomicBool) -> LoopSummary {
        let mut cycles = 0;
        let end = loop {
            if stop.load(Ordering::Relaxed) {
                break LoopEnd::Stopped;
            }
            match self.next(stop) {
                Some(Some(outcome)) => {
                    ctx.process(outcome);
                    cycles += 1;
                }
                Some(None) => break LoopEnd::Exhausted,
                None => break LoopEnd::Stopped,
            }
        };
        debug!(cycles, ?end, "classification loop finished");
        LoopSummary { cycles, end }
    }

    /// One request/reply round trip. The outer `None` means the wait was
    /// cut short by `stop`; a vanished worker counts as exhausted.
    fn next(&mut self, stop: &AtomicBool) -> Option<Option<Result<Ranking>>> {
        let Some(requests) = self.requests.as_ref() else {
            return Some(None);
        };
        if requests.send(()).is_err() {
            self.requests = None;
            return Some(None);
        }
        loop {
            match self.replies.recv_timeout(STOP_POLL) {
                Ok(reply) => {
                    if reply.is_none() {
                        self.requests = None;
                    }
                    return Some(reply);
                }
                Err(RecvTimeoutError::Timeout) => {
                    if stop.load(Ordering::Relaxed) {
                        return None;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("{}", InstrumentError::ClassifierUnavailable("worker stopped".into()));
                    self.requests = None;
                    return Some(None);
                }
            }
        }
    }
}

impl Drop for ClassificationLoop {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            // A worker blocked on a read it cannot abandon is left detached.
            if worker.is_finished() {
                let _ = worker.join();
            }
        }
    }
}

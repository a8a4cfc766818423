//! Bounded background analysis queue.
//!
//! Request handlers enqueue a transcript snapshot and return immediately. A
//! single worker task drains the channel and runs the analyzer. When the
//! channel is full the job is dropped with a warning; submission never
//! blocks the caller.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::session::{ConversationContext, Message};

use super::analyzer::{analyze, AnalysisResult};

/// One transcript snapshot awaiting analysis.
#[derive(Debug, Clone)]
pub struct AnalysisJob {
    pub messages: Vec<Message>,
    pub context: ConversationContext,
    /// Correlates the job with the chat response that produced it.
    pub request_id: Option<String>,
}

/// Producer handle. Clones share the same channel.
#[derive(Debug, Clone)]
pub struct AnalysisQueue {
    tx: mpsc::Sender<AnalysisJob>,
}

impl AnalysisQueue {
    /// Spawn the worker with the default handler, which logs each result.
    pub fn spawn(capacity: usize) -> (Self, JoinHandle<()>) {
        Self::spawn_with(capacity, log_result)
    }

    /// Spawn the worker with a custom result handler.
    pub fn spawn_with<F>(capacity: usize, handler: F) -> (Self, JoinHandle<()>)
    where
        F: FnMut(&AnalysisJob, AnalysisResult) + Send + 'static,
    {
        let (queue, rx) = Self::channel(capacity);
        let worker = tokio::spawn(run_worker(rx, handler));
        (queue, worker)
    }

    /// Queue handle plus the receiving end, without a worker.
    pub(crate) fn channel(capacity: usize) -> (Self, mpsc::Receiver<AnalysisJob>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Enqueue a job. Returns `false` if it was dropped.
    pub fn submit(&self, job: AnalysisJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(job)) => {
                warn!(
                    request_id = job.request_id.as_deref().unwrap_or("-"),
                    "Analysis queue full, dropping job"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("Analysis worker stopped, dropping job");
                false
            }
        }
    }
}

async fn run_worker<F>(mut rx: mpsc::Receiver<AnalysisJob>, mut handler: F)
where
    F: FnMut(&AnalysisJob, AnalysisResult) + Send + 'static,
{
    debug!("Analysis worker started");
    while let Some(job) = rx.recv().await {
        let result = analyze(&job.messages, &job.context);
        handler(&job, result);
    }
    debug!("Analysis worker stopped");
}

fn log_result(job: &AnalysisJob, result: AnalysisResult) {
    info!(
        request_id = job.request_id.as_deref().unwrap_or("-"),
        domain = %result.domain,
        messages = result.message_count,
        topics = ?result.topics,
        "Conversation analyzed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Domain;

    fn job(content: &str, request_id: &str) -> AnalysisJob {
        AnalysisJob {
            messages: vec![Message::user(content)],
            context: ConversationContext::new(Domain::Aws),
            request_id: Some(request_id.into()),
        }
    }

    #[tokio::test]
    async fn test_worker_processes_jobs_in_order() {
        let (results_tx, mut results_rx) = mpsc::unbounded_channel();
        let (queue, _worker) = AnalysisQueue::spawn_with(8, move |job, result| {
            let _ = results_tx.send((job.request_id.clone(), result));
        });

        assert!(queue.submit(job("study aws", "r1")));
        assert!(queue.submit(job("deploy lambda", "r2")));

        let (id1, first) = results_rx.recv().await.unwrap();
        let (id2, second) = results_rx.recv().await.unwrap();
        assert_eq!(id1.as_deref(), Some("r1"));
        assert_eq!(first.topics, vec!["AWS", "Learning"]);
        assert_eq!(id2.as_deref(), Some("r2"));
        assert_eq!(second.topics, vec!["AWS Services"]);
    }

    #[tokio::test]
    async fn test_submit_drops_when_full() {
        let (queue, mut rx) = AnalysisQueue::channel(1);
        assert!(queue.submit(job("a", "r1")));
        assert!(!queue.submit(job("b", "r2")), "second job dropped");

        let queued = rx.recv().await.unwrap();
        assert_eq!(queued.request_id.as_deref(), Some("r1"));
        assert!(queue.submit(job("c", "r3")), "space freed after recv");
    }

    #[tokio::test]
    async fn test_submit_after_worker_gone() {
        let (queue, rx) = AnalysisQueue::channel(4);
        drop(rx);
        assert!(!queue.submit(job("a", "r1")));
    }

    #[tokio::test]
    async fn test_worker_exits_when_queue_dropped() {
        let (queue, worker) = AnalysisQueue::spawn(4);
        drop(queue);
        worker.await.unwrap();
    }
}

// THEORY:
// The batch pipeline runs many independent comparisons at once, e.g. every page
// of a site at every viewport width. The core pipeline is synchronous and holds no
// mutable state, so the parallelism lives entirely here: one job per image pair,
// no shared mutable state between jobs.
//
// Layout:
// 1.  **Dispatcher**: a single task receives jobs and hands them to workers
//     round-robin.
// 2.  **Workers**: each worker owns a queue and runs its jobs on the blocking
//     thread pool, since a comparison is CPU-bound pixel work.
// 3.  **Replies**: every job carries a `oneshot` sender; a failed pair only fails
//     its own reply.
// 4.  **Shutdown**: dropping the comparator closes the job queue, which drains the
//     dispatcher and then every worker.

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use image::DynamicImage;
use tokio::sync::{mpsc, oneshot};

use crate::error::{MismatchError, Result};
use crate::pipeline::{ComparisonPipeline, ComparisonReport};

/// Where a worker gets its two images from.
#[derive(Debug, Clone)]
pub enum PairSource {
    Images {
        reference: DynamicImage,
        candidate: DynamicImage,
    },
    Files {
        reference: PathBuf,
        candidate: PathBuf,
    },
}

impl PairSource {
    fn run(self, pipeline: &ComparisonPipeline) -> Result<ComparisonReport> {
        match self {
            PairSource::Images { reference, candidate } => pipeline.compare(&reference, &candidate),
            PairSource::Files { reference, candidate } => pipeline.compare_files(reference, candidate),
        }
    }
}

pub struct ComparisonJob {
    pub job_id: u64,
    pub source: PairSource,
    pub result_sender: oneshot::Sender<Result<ComparisonReport>>,
}

/// Pool of worker tasks sharing one read-only pipeline.
pub struct WorkerPool {
    task_sender: mpsc::UnboundedSender<ComparisonJob>,
    workers: Vec<tokio::task::JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns the dispatcher and `size` workers. Must be called inside a tokio runtime.
    pub fn new(pipeline: ComparisonPipeline, size: usize) -> Self {
        let size = size.max(1);
        let pipeline = Arc::new(pipeline);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<ComparisonJob>();
        let mut workers = Vec::with_capacity(size + 1);

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..size)
            .map(|_| mpsc::unbounded_channel::<ComparisonJob>())
            .unzip();

        workers.push(tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(job) = task_receiver.recv().await {
                if let Err(mpsc::error::SendError(job)) = worker_senders[worker_idx].send(job) {
                    let _ = job
                        .result_sender
                        .send(Err(MismatchError::WorkerUnavailable("worker queue closed")));
                }
                worker_idx = (worker_idx + 1) % size;
            }
        }));

        for (worker_id, mut worker_receiver) in worker_receivers.into_iter().enumerate() {
            let pipeline = Arc::clone(&pipeline);
            workers.push(tokio::spawn(async move {
                while let Some(job) = worker_receiver.recv().await {
                    tracing::debug!(worker_id, job_id = job.job_id, "comparison job started");
                    let pipeline = Arc::clone(&pipeline);
                    let source = job.source;
                    let result = tokio::task::spawn_blocking(move || source.run(&pipeline))
                        .await
                        .unwrap_or_else(|_| Err(MismatchError::WorkerUnavailable("comparison task panicked")));
                    let _ = job.result_sender.send(result);
                }
            }));
        }

        Self { task_sender, workers }
    }

    pub fn size(&self) -> usize {
        self.workers.len() - 1
    }

    fn submit(&self, job: ComparisonJob) -> Result<()> {
        self.task_sender
            .send(job)
            .map_err(|_| MismatchError::WorkerUnavailable("failed to send job to worker pool"))
    }
}

/// Runs independent comparisons concurrently.
pub struct BatchComparator {
    worker_pool: WorkerPool,
    next_job_id: std::sync::atomic::AtomicU64,
}

impl BatchComparator {
    /// One worker per CPU.
    pub fn new(pipeline: ComparisonPipeline) -> Self {
        Self::with_workers(pipeline, num_cpus::get())
    }

    pub fn with_workers(pipeline: ComparisonPipeline, workers: usize) -> Self {
        Self {
            worker_pool: WorkerPool::new(pipeline, workers),
            next_job_id: std::sync::atomic::AtomicU64::new(0),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_pool.size()
    }

    /// Compares one pair on the pool.
    pub async fn compare(&self, source: PairSource) -> Result<ComparisonReport> {
        let job_id = self
            .next_job_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let (result_sender, result_receiver) = oneshot::channel();
        self.worker_pool.submit(ComparisonJob {
            job_id,
            source,
            result_sender,
        })?;

        result_receiver
            .await
            .map_err(|_| MismatchError::WorkerUnavailable("failed to receive result from worker"))?
    }

    /// Compares every pair concurrently. Results come back in input order, one per pair.
    pub async fn compare_all(&self, sources: Vec<PairSource>) -> Vec<Result<ComparisonReport>> {
        join_all(sources.into_iter().map(|source| self.compare(source))).await
    }

    /// Closes the job queue and waits for every worker to finish.
    pub async fn shutdown(self) {
        let WorkerPool { task_sender, workers } = self.worker_pool;
        drop(task_sender);
        for worker in workers {
            let _ = worker.await;
        }
    }
}

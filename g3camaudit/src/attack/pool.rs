/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::future::Future;
use std::sync::Arc;

use concurrent_queue::ConcurrentQueue;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Run `f` on every target with one worker per available cpu.
///
/// See [`run_parallel_with_workers`].
pub async fn run_parallel<T, E, F, Fut>(
    targets: Vec<T>,
    shutdown: &CancellationToken,
    f: F,
) -> (Vec<T>, Result<(), E>)
where
    T: Clone + Send + 'static,
    E: Send + 'static,
    F: Fn(CancellationToken, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    run_parallel_with_workers(targets, workers, shutdown, f).await
}

/// Run `f` on every target with at most `workers` concurrent tasks.
///
/// The returned list has the same order as the input. The first error
/// cancels the token passed to `f` and stops the dispatch of pending
/// targets, which are then returned unchanged. Later errors are dropped.
pub async fn run_parallel_with_workers<T, E, F, Fut>(
    targets: Vec<T>,
    workers: usize,
    shutdown: &CancellationToken,
    f: F,
) -> (Vec<T>, Result<(), E>)
where
    T: Clone + Send + 'static,
    E: Send + 'static,
    F: Fn(CancellationToken, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    if targets.is_empty() {
        return (targets, Ok(()));
    }
    let workers = workers.clamp(1, targets.len());

    let queue = Arc::new(ConcurrentQueue::bounded(targets.len()));
    for job in targets.iter().cloned().enumerate() {
        // the queue is large enough to hold all jobs
        let _ = queue.push(job);
    }

    let cancel = shutdown.child_token();
    let (err_sender, mut err_receiver) = mpsc::channel::<E>(1);
    let f = Arc::new(f);

    let mut tasks = Vec::with_capacity(workers);
    for _ in 0..workers {
        let queue = queue.clone();
        let cancel = cancel.clone();
        let err_sender = err_sender.clone();
        let f = f.clone();
        tasks.push(tokio::spawn(async move {
            let mut finished = Vec::new();
            while !cancel.is_cancelled() {
                let Ok((index, target)) = queue.pop() else {
                    break;
                };
                match f(cancel.clone(), target).await {
                    Ok(target) => finished.push((index, target)),
                    Err(e) => {
                        let _ = err_sender.try_send(e);
                        cancel.cancel();
                        break;
                    }
                }
            }
            finished
        }));
    }
    drop(err_sender);

    let mut results = targets;
    for r in futures_util::future::join_all(tasks).await {
        match r {
            Ok(finished) => {
                for (index, target) in finished {
                    results[index] = target;
                }
            }
            Err(e) => {
                if e.is_panic() {
                    std::panic::resume_unwind(e.into_panic());
                }
            }
        }
    }

    match err_receiver.try_recv() {
        Ok(e) => (results, Err(e)),
        Err(_) => (results, Ok(())),
    }
}

// Partition scheduling.
//
// Partition work is CPU-bound and synchronous, so each partition runs on the
// blocking thread pool. The stream combinator caps how many run at once and
// keeps results in input order.

use std::sync::Arc;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use super::ExecutionMode;

/// Run `work` over every partition and collect the results in input order.
///
/// The first partition error fails the whole run; results from partitions
/// that succeeded are discarded with it.
pub async fn run_partitions<I, T, F>(
    label: &str,
    partitions: Vec<I>,
    mode: ExecutionMode,
    work: F,
) -> Result<Vec<T>>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Result<T> + Send + Sync + 'static,
{
    let work = Arc::new(work);
    let concurrency = mode.concurrency();
    debug!(label, partitions = partitions.len(), concurrency, "Running partitions");

    let pb = ProgressBar::new(partitions.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!("  {label} [{{bar:30}}] {{pos}}/{{len}} ({{eta}})"))
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let results: Vec<Result<T>> = stream::iter(partitions.into_iter().map(|partition| {
        let work = Arc::clone(&work);
        async move {
            match tokio::task::spawn_blocking(move || work(partition)).await {
                Ok(result) => result,
                Err(e) => Err(anyhow::anyhow!("Partition worker failed: {e}")),
            }
        }
    }))
    .buffered(concurrency)
    .inspect(|_| pb.inc(1))
    .collect()
    .await;

    pb.finish_and_clear();

    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let out = run_partitions("test", vec![3u64, 1, 2], ExecutionMode::Parallel(3), |n| {
            std::thread::sleep(std::time::Duration::from_millis(n * 5));
            Ok(n * 10)
        })
        .await
        .unwrap();
        assert_eq!(out, vec![30, 10, 20]);
    }

    #[tokio::test]
    async fn test_error_fails_run() {
        let out = run_partitions("test", vec![1, 2], ExecutionMode::Local, |n: i32| {
            if n == 2 {
                anyhow::bail!("partition {n} broke");
            }
            Ok(n)
        })
        .await;
        assert!(out.is_err());
    }
}

//! Fixed-size worker pool for independent, side-effect-free jobs.

use crossbeam_channel::{bounded, unbounded};
use std::thread;

/// Runs `work` over every job on `workers` threads and hands each result to
/// `on_result` as soon as it is ready. Results arrive in completion order.
pub fn run_unordered<J, R, W, F>(jobs: Vec<J>, workers: usize, work: W, mut on_result: F)
where
    J: Send,
    R: Send,
    W: Fn(J) -> R + Sync,
    F: FnMut(R),
{
    let workers = workers.max(1);
    let (job_tx, job_rx) = bounded::<J>(workers * 2);
    let (result_tx, result_rx) = unbounded::<R>();

    thread::scope(|scope| {
        for idx in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let work = &work;
            thread::Builder::new()
                .name(format!("parser-{idx}"))
                .spawn_scoped(scope, move || {
                    while let Ok(job) = job_rx.recv() {
                        if result_tx.send(work(job)).is_err() {
                            break;
                        }
                    }
                })
                .expect("failed to spawn parser worker");
        }
        // Only the workers hold senders from here on, so the result loop ends with them.
        drop(job_rx);
        drop(result_tx);

        scope.spawn(move || {
            for job in jobs {
                if job_tx.send(job).is_err() {
                    break;
                }
            }
        });

        for result in result_rx.iter() {
            on_result(result);
        }
    });
}

pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_job_yields_one_result() {
        let mut results = Vec::new();
        run_unordered((0..100).collect(), 4, |n: u32| n * 2, |r| results.push(r));
        results.sort();
        assert_eq!(results, (0..100).map(|n| n * 2).collect::<Vec<_>>());
    }

    #[test]
    fn zero_workers_still_runs() {
        let mut count = 0;
        run_unordered(vec!["a", "b"], 0, |s: &str| s.len(), |_| count += 1);
        assert_eq!(count, 2);
    }

    #[test]
    fn empty_job_list_returns_immediately() {
        let mut count = 0;
        run_unordered(Vec::<u8>::new(), 3, |b| b, |_| count += 1);
        assert_eq!(count, 0);
    }
}

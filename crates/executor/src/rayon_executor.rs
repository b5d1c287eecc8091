//! Rayon-based parallel executor.
//!
//! Each executor may own a private thread pool so that the worker count of a
//! render job is honoured without touching rayon's global pool.

use log::warn;
use ofdrender_traits::Executor;
use rayon::prelude::*;
use std::sync::Arc;

/// A parallel executor using rayon's work-stealing thread pool.
#[derive(Debug, Clone)]
pub struct RayonExecutor {
    pool: Option<Arc<rayon::ThreadPool>>,
    num_threads: usize,
}

impl RayonExecutor {
    /// Uses rayon's global pool.
    pub fn new() -> Self {
        Self {
            pool: None,
            num_threads: rayon::current_num_threads(),
        }
    }

    /// Uses a dedicated pool of `num_threads` workers. Falls back to the
    /// global pool if the dedicated one cannot be built.
    pub fn with_threads(num_threads: usize) -> Self {
        let num_threads = num_threads.max(1);
        match rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("ofdrender-chunk-{i}"))
            .build()
        {
            Ok(pool) => Self {
                pool: Some(Arc::new(pool)),
                num_threads,
            },
            Err(e) => {
                warn!("[RAYON] Failed to build a {}-thread pool ({}); using the global pool", num_threads, e);
                Self::new()
            }
        }
    }

    fn run<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        match &self.pool {
            Some(pool) => pool.install(|| items.into_par_iter().map(f).collect()),
            None => items.into_par_iter().map(f).collect(),
        }
    }
}

impl Default for RayonExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for RayonExecutor {
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static,
    {
        self.run(items, f)
    }

    fn execute_all_fallible<T, R, E, F>(&self, items: Vec<T>, f: F) -> Vec<Result<R, E>>
    where
        T: Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
        F: Fn(T) -> Result<R, E> + Send + Sync + Clone + 'static,
    {
        self.run(items, f)
    }

    fn parallelism(&self) -> usize {
        self.num_threads
    }

    fn name(&self) -> &'static str {
        "RayonExecutor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_rayon_executor_processes_items() {
        let executor = RayonExecutor::with_threads(2);
        let mut results = executor.execute_all(vec![1, 2, 3, 4, 5], |x| x * 2);
        results.sort();
        assert_eq!(results, vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_rayon_executor_handles_fallible_operations() {
        let executor = RayonExecutor::with_threads(3);
        let results: Vec<Result<i32, &str>> = executor.execute_all_fallible(vec![1, 2, 0, 4], |x| {
            if x == 0 { Err("division by zero") } else { Ok(10 / x) }
        });
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
    }

    #[test]
    fn test_dedicated_pool_reports_its_size() {
        assert_eq!(RayonExecutor::with_threads(3).parallelism(), 3);
        assert_eq!(RayonExecutor::with_threads(0).parallelism(), 1);
    }

    #[test]
    fn test_dedicated_pool_runs_every_item() {
        let executor = RayonExecutor::with_threads(4);
        let counter = Arc::new(AtomicUsize::new(0));
        let _ = executor.execute_all((0..64).collect::<Vec<usize>>(), {
            let counter = counter.clone();
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        assert_eq!(counter.load(Ordering::SeqCst), 64);
    }
}

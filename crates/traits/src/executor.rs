//! Executor trait for abstracting parallel chunk execution.
//!
//! The scheduler fans chunks out through this trait so that the threading
//! strategy (rayon, sequential, test doubles) stays swappable.

use std::fmt::Debug;

/// A trait for executing work items, potentially in parallel.
///
/// Implementations may finish items in any order and are not required to
/// return results in input order. Callers that care about ordering must tag
/// their items and sort the results themselves.
pub trait Executor: Send + Sync + Debug {
    /// Execute a batch of work items, potentially in parallel.
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static;

    /// Execute a batch of work items that may fail.
    fn execute_all_fallible<T, R, E, F>(&self, items: Vec<T>, f: F) -> Vec<Result<R, E>>
    where
        T: Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
        F: Fn(T) -> Result<R, E> + Send + Sync + Clone + 'static;

    /// Number of items this executor can work on at once (1 for sequential).
    fn parallelism(&self) -> usize;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

/// Processes items one after another on the calling thread.
#[derive(Debug, Clone, Default)]
pub struct SyncExecutor;

impl SyncExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Executor for SyncExecutor {
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static,
    {
        items.into_iter().map(f).collect()
    }

    fn execute_all_fallible<T, R, E, F>(&self, items: Vec<T>, f: F) -> Vec<Result<R, E>>
    where
        T: Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
        F: Fn(T) -> Result<R, E> + Send + Sync + Clone + 'static,
    {
        items.into_iter().map(f).collect()
    }

    fn parallelism(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str {
        "SyncExecutor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_executor_processes_items_in_order() {
        let executor = SyncExecutor::new();
        let results = executor.execute_all(vec![1, 2, 3, 4, 5], |x| x * 2);
        assert_eq!(results, vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_sync_executor_keeps_failures_in_place() {
        let executor = SyncExecutor::new();
        let results: Vec<Result<i32, String>> =
            executor.execute_all_fallible(vec![1, 2, 0, 4], |x| {
                if x == 0 { Err(format!("chunk {x} failed")) } else { Ok(10 / x) }
            });
        assert_eq!(results.len(), 4);
        assert!(results[2].is_err());
        assert_eq!(results[3], Ok(2));
    }

    #[test]
    fn test_sync_executor_parallelism_is_one() {
        assert_eq!(SyncExecutor::new().parallelism(), 1);
    }
}

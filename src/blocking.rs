use std::future::Future;
use std::panic;
use std::thread;

use tokio::runtime::{Builder, Handle};

use crate::error::{DbAccessError, Result};

/// Drive `future` to completion on a private current-thread runtime.
///
/// A runtime cannot be entered from a thread that already has one (a worker
/// or a `spawn_blocking` thread), so in that case the private runtime runs on
/// a scoped helper thread and the caller waits for it.
pub(crate) fn block_on<F>(future: F) -> Result<F::Output>
where
    F: Future + Send,
    F::Output: Send,
{
    if Handle::try_current().is_err() {
        return run(future);
    }

    thread::scope(|scope| {
        scope
            .spawn(|| run(future))
            .join()
            .unwrap_or_else(|payload| panic::resume_unwind(payload))
    })
}

fn run<F: Future>(future: F) -> Result<F::Output> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(DbAccessError::Runtime)?;

    Ok(runtime.block_on(future))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_on_outside_runtime() {
        assert_eq!(block_on(async { 1 + 1 }).unwrap(), 2);
    }

    #[test]
    fn test_block_on_runs_spawned_tasks() {
        let value = block_on(async { tokio::spawn(async { 5 }).await.unwrap() }).unwrap();
        assert_eq!(value, 5);
    }

    #[tokio::test]
    async fn test_block_on_inside_runtime() {
        let name = String::from("Ada");
        let len = block_on(async { name.len() }).unwrap();
        assert_eq!(len, 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_block_on_from_spawn_blocking() {
        let value = tokio::task::spawn_blocking(|| {
            block_on(async { tokio::spawn(async { 9 }).await.unwrap() }).unwrap()
        })
        .await
        .unwrap();
        assert_eq!(value, 9);
    }
}

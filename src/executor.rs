use std::panic::catch_unwind;
use std::thread;

use async_executor::Executor;
use async_lock::OnceCell;
use futures_lite::future;

/// The environment variable holding the number of threads that run the global executor.
pub const THREADS_ENV: &str = "ORDERED_STREAM_THREADS";

/// Returns the global executor, spawning its threads on first use.
pub(crate) fn global() -> &'static Executor<'static> {
    static GLOBAL: OnceCell<Executor<'_>> = OnceCell::new();
    GLOBAL.get_or_init_blocking(|| {
        let num_threads = num_threads(std::env::var(THREADS_ENV).ok().as_deref());

        for n in 1..=num_threads {
            thread::Builder::new()
                .name(format!("ordered-stream-{}", n))
                .spawn(|| loop {
                    catch_unwind(|| async_io::block_on(global().run(future::pending::<()>()))).ok();
                })
                .expect("cannot spawn executor thread");
        }

        Executor::new()
    })
}

/// Parses the configured thread count, defaulting to 1.
fn num_threads(var: Option<&str>) -> usize {
    let var = match var {
        Some(var) => var,
        None => return 1,
    };

    match var.trim().parse() {
        Ok(n) if n > 0 => n,
        _ => {
            tracing::warn!(value = var, "invalid {}, running a single thread", THREADS_ENV);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threads_default() {
        assert_eq!(num_threads(None), 1);
    }

    #[test]
    fn threads_parsed() {
        assert_eq!(num_threads(Some("4")), 4);
        assert_eq!(num_threads(Some(" 2\n")), 2);
    }

    #[test]
    fn threads_invalid() {
        assert_eq!(num_threads(Some("0")), 1);
        assert_eq!(num_threads(Some("many")), 1);
        assert_eq!(num_threads(Some("")), 1);
    }

    #[test]
    fn global_runs_tasks() {
        let executor = global();
        assert!(std::ptr::eq(executor, global()));
        assert_eq!(async_io::block_on(executor.spawn(async { 1 + 2 })), 3);
    }
}

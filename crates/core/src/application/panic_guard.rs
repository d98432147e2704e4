// Panic isolation for component hooks and exit callbacks
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Result of a panic-guarded execution
#[derive(Debug)]
pub enum PanicGuardResult<T> {
    /// Execution completed
    Success(T),
    /// Execution panicked
    Panicked(String),
}

impl<T> PanicGuardResult<T> {
    /// Fold a panic into the closure's own error type
    pub fn into_result<E>(self, on_panic: impl FnOnce(String) -> E) -> Result<T, E> {
        match self {
            PanicGuardResult::Success(value) => Ok(value),
            PanicGuardResult::Panicked(msg) => Err(on_panic(msg)),
        }
    }
}

/// Execute a closure with panic isolation
///
/// If the closure panics, the panic is caught and returned as
/// `PanicGuardResult::Panicked` instead of unwinding into the caller.
pub fn execute_guarded<F, T>(f: F) -> PanicGuardResult<T>
where
    F: FnOnce() -> T,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => PanicGuardResult::Success(result),
        Err(panic_info) => PanicGuardResult::Panicked(panic_message(panic_info)),
    }
}

/// Await a future with panic isolation
pub async fn execute_guarded_async<F, T>(future: F) -> PanicGuardResult<T>
where
    F: Future<Output = T>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => PanicGuardResult::Success(result),
        Err(panic_info) => PanicGuardResult::Panicked(panic_message(panic_info)),
    }
}

fn panic_message(panic_info: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_panic_is_caught() {
        let result = execute_guarded(|| -> i32 { panic!("boom") });
        assert!(matches!(result, PanicGuardResult::Panicked(msg) if msg == "boom"));
    }

    #[tokio::test]
    async fn test_async_panic_is_caught() {
        let result = execute_guarded_async(async {
            tokio::task::yield_now().await;
            panic!("async {}", "boom");
        })
        .await;

        let folded: Result<(), String> = result.into_result(|msg| msg);
        assert_eq!(folded, Err("async boom".to_string()));
    }

    #[tokio::test]
    async fn test_async_success_passes_value_through() {
        let result = execute_guarded_async(async { 7 }).await;
        assert!(matches!(result, PanicGuardResult::Success(7)));
    }
}

//! Bounded polling for conditions driven by external rendering.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{ExportError, ExportResult};

/// Poll `probe` every `step` until it yields `Some`, or fail with
/// [`ExportError::Timeout`] once more than `timeout` has elapsed.
///
/// The probe is always evaluated at least once. Probe errors propagate
/// immediately; only "not yet" is retried.
pub async fn wait_until<T, F, Fut>(
    what: &str,
    timeout: Duration,
    step: Duration,
    mut probe: F,
) -> ExportResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ExportResult<Option<T>>>,
{
    let started = Instant::now();
    loop {
        if let Some(value) = probe().await? {
            return Ok(value);
        }
        if started.elapsed() > timeout {
            return Err(ExportError::Timeout {
                what: what.to_string(),
                waited_ms: timeout.as_millis() as u64,
            });
        }
        tokio::time::sleep(step).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test(start_paused = true)]
    async fn test_returns_first_truthy() {
        let calls = Cell::new(0);
        let value = wait_until("third call", Duration::from_secs(1), Duration::from_millis(60), || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { Ok((n >= 3).then_some(n)) }
        })
        .await
        .unwrap();
        assert_eq!(value, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out() {
        let started = Instant::now();
        let err = wait_until::<(), _, _>(
            "never",
            Duration::from_millis(500),
            Duration::from_millis(60),
            || async { Ok(None) },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExportError::Timeout { waited_ms: 500, .. }));
        // Deadline is checked after each probe, so at most one extra step.
        assert!(started.elapsed() >= Duration::from_millis(500));
        assert!(started.elapsed() <= Duration::from_millis(560));
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_error_is_not_retried() {
        let calls = Cell::new(0);
        let err = wait_until::<(), _, _>("broken", Duration::from_secs(5), Duration::from_millis(60), || {
            calls.set(calls.get() + 1);
            async { Err(ExportError::view("detached frame")) }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ExportError::View(_)));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_still_probes_once() {
        let value = wait_until("ready", Duration::ZERO, Duration::from_millis(60), || async {
            Ok(Some("ready"))
        })
        .await
        .unwrap();
        assert_eq!(value, "ready");
    }
}

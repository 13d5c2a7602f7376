//! Tracing setup and operation-timing helpers

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global tracing subscriber.
///
/// The filter defaults to `info` and can be overridden through the
/// `RELEASE_ENGINE_LOG` environment variable. Safe to call once per process;
/// later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("RELEASE_ENGINE_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}

/// Macro for creating spans with operation timing
#[macro_export]
macro_rules! timed_operation {
    ($name:expr, $body:expr) => {{
        let span = tracing::info_span!("operation", name = $name);
        let _enter = span.enter();
        let start = std::time::Instant::now();

        let result = $body;

        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            operation = $name,
            "operation completed"
        );

        result
    }};
}

/// Macro for creating async spans with operation timing
#[macro_export]
macro_rules! timed_async_operation {
    ($name:expr, $body:expr) => {{
        async move {
            let span = tracing::info_span!("async_operation", name = $name);
            let start = std::time::Instant::now();

            let result = tracing::Instrument::instrument($body, span).await;

            tracing::info!(
                duration_ms = start.elapsed().as_millis() as u64,
                operation = $name,
                "async operation completed"
            );

            result
        }
    }};
}
